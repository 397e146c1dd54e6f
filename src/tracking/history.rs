/// Push/pop snapshot stack over a value.
///
/// A caller brackets an edit with [`History::push`] and then either keeps the edit,
/// rolls it back with [`History::pop`], or calls [`History::check_for_history`] to
/// discard the snapshot again when the edit turned out to be a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    current: T,
    snapshots: Vec<T>,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            snapshots: Vec::new(),
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn push(&mut self) {
        self.snapshots.push(self.current.clone());
    }

    /// Restores the most recent snapshot. Does nothing when the stack is empty.
    pub fn pop(&mut self) {
        if let Some(previous) = self.snapshots.pop() {
            self.current = previous;
        }
    }

    /// Returns true if the value differs from the latest snapshot. An unchanged
    /// snapshot is dropped so that no-op edits leave no history behind.
    pub fn check_for_history(&mut self) -> bool {
        match self.snapshots.last() {
            Some(previous) if *previous == self.current => {
                self.snapshots.pop();
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn has_history(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

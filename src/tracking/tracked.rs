use crate::domain::common::{Deletable, EntityId, Identifiable};
use crate::errors::ValidationErrors;
use crate::tracking::extension::{AttributeClass, ExtensionSet};
use crate::tracking::record::Record;
use crate::tracking::state::{ChangeTracked, EditState, EntityState};

/// An entity made of a base record plus an attached extension set, observed as one.
///
/// History operations fan out to both halves. The composed state is the base
/// state unless the base is exactly clean, in which case the extension state is
/// reported instead.
#[derive(Debug, Clone)]
pub struct Tracked<B, E> {
    base: B,
    extension: E,
}

impl<B, E> Tracked<B, E> {
    pub fn from_parts(base: B, extension: E) -> Self {
        Self { base, extension }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut B {
        &mut self.base
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    pub fn extension_mut(&mut self) -> &mut E {
        &mut self.extension
    }
}

impl<B: ChangeTracked, E: ChangeTracked> ChangeTracked for Tracked<B, E> {
    fn push_history(&mut self) {
        self.base.push_history();
        self.extension.push_history();
    }

    fn pop_history(&mut self) {
        self.base.pop_history();
        self.extension.pop_history();
    }

    /// The two halves keep or drop their snapshots together, so one pop always
    /// undoes one logical edit.
    fn check_for_history(&mut self) -> bool {
        let base = self.base.check_for_history();
        let extension = self.extension.check_for_history();
        match (base, extension) {
            (true, false) => self.extension.push_history(),
            (false, true) => self.base.push_history(),
            _ => {}
        }
        base || extension
    }

    fn state(&self) -> EntityState {
        match self.base.state() {
            EntityState::Clean => self.extension.state(),
            state => state,
        }
    }

    fn edit_state(&self) -> EditState {
        match self.base.edit_state() {
            EditState::Clean => self.extension.edit_state(),
            state => state,
        }
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.extension.set_deleted(deleted);
        self.base.set_deleted(deleted);
    }
}

impl<V, C> Tracked<Record<V>, ExtensionSet<C>>
where
    V: Clone + PartialEq,
    C: AttributeClass,
{
    pub fn new(id: EntityId, values: V) -> Self {
        Self::from_parts(Record::new(id, values), ExtensionSet::new())
    }

    pub fn values(&self) -> &V {
        self.base.values()
    }

    pub fn values_mut(&mut self) -> &mut V {
        self.base.values_mut()
    }

    pub fn info(&self) -> &ExtensionSet<C> {
        &self.extension
    }

    pub fn info_mut(&mut self) -> &mut ExtensionSet<C> {
        &mut self.extension
    }

    /// Errors from both halves, base first.
    pub fn errors(&self) -> ValidationErrors {
        let mut errors = self.base.errors().clone();
        errors.extend(self.extension.errors().clone());
        errors
    }

    pub fn clear_errors(&mut self) {
        self.base.errors_mut().clear();
        self.extension.errors_mut().clear();
    }

    pub fn commit(&mut self) {
        self.extension.commit();
        self.base.commit();
    }
}

impl<B: Identifiable, E> Identifiable for Tracked<B, E> {
    fn id(&self) -> EntityId {
        self.base.id()
    }
}

impl<B: Deletable, E> Deletable for Tracked<B, E> {
    fn is_deleted(&self) -> bool {
        self.base.is_deleted()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Minimal change-tracked half with directly settable states.
    #[derive(Debug, Default)]
    struct Half {
        state: Option<EntityState>,
        edit: Option<EditState>,
        pushes: usize,
        changed: bool,
        deleted_at: Option<usize>,
        clock: Rc<Cell<usize>>,
    }

    impl ChangeTracked for Half {
        fn push_history(&mut self) {
            self.pushes += 1;
        }

        fn pop_history(&mut self) {
            self.pushes -= 1;
        }

        fn check_for_history(&mut self) -> bool {
            if !self.changed && self.pushes > 0 {
                self.pushes -= 1;
            }
            self.changed
        }

        fn state(&self) -> EntityState {
            self.state.unwrap_or(EntityState::Clean)
        }

        fn edit_state(&self) -> EditState {
            self.edit.unwrap_or(EditState::Clean)
        }

        fn set_deleted(&mut self, _deleted: bool) {
            let tick = self.clock.get() + 1;
            self.clock.set(tick);
            self.deleted_at = Some(tick);
        }
    }

    #[test]
    fn clean_base_defers_to_extension() {
        let tracked = Tracked::from_parts(
            Half::default(),
            Half {
                state: Some(EntityState::Changed),
                edit: Some(EditState::Error),
                ..Half::default()
            },
        );
        assert_eq!(tracked.state(), EntityState::Changed);
        assert_eq!(tracked.edit_state(), EditState::Error);
    }

    #[test]
    fn dirty_base_wins() {
        let tracked = Tracked::from_parts(
            Half {
                state: Some(EntityState::New),
                edit: Some(EditState::Valid),
                ..Half::default()
            },
            Half {
                state: Some(EntityState::Changed),
                edit: Some(EditState::Error),
                ..Half::default()
            },
        );
        assert_eq!(tracked.state(), EntityState::New);
        assert_eq!(tracked.edit_state(), EditState::Valid);
    }

    #[test]
    fn history_fans_out_to_both_halves() {
        let mut tracked = Tracked::from_parts(
            Half::default(),
            Half {
                changed: true,
                ..Half::default()
            },
        );
        tracked.push_history();
        assert_eq!(tracked.base().pushes, 1);
        assert_eq!(tracked.extension().pushes, 1);
        assert!(tracked.check_for_history());
        tracked.pop_history();
        assert_eq!(tracked.base().pushes, 0);
        assert_eq!(tracked.extension().pushes, 0);
    }

    #[test]
    fn history_depths_stay_in_step() {
        let mut tracked = Tracked::from_parts(
            Half {
                changed: true,
                ..Half::default()
            },
            Half::default(),
        );
        tracked.push_history();
        assert!(tracked.check_for_history());
        assert_eq!(tracked.base().pushes, 1);
        assert_eq!(tracked.extension().pushes, 1);

        tracked.base_mut().changed = false;
        tracked.push_history();
        assert!(!tracked.check_for_history());
        assert_eq!(tracked.base().pushes, 1);
        assert_eq!(tracked.extension().pushes, 1);
    }

    #[test]
    fn delete_reaches_extension_first() {
        let clock = Rc::new(Cell::new(0));
        let mut tracked = Tracked::from_parts(
            Half {
                clock: clock.clone(),
                ..Half::default()
            },
            Half {
                clock,
                ..Half::default()
            },
        );
        tracked.set_deleted(true);
        let base = tracked.base().deleted_at.unwrap();
        let extension = tracked.extension().deleted_at.unwrap();
        assert!(extension < base);
    }
}

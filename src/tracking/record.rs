use crate::domain::common::{Deletable, EntityId, Identifiable};
use crate::errors::ValidationErrors;
use crate::tracking::history::History;
use crate::tracking::state::{edit_state_for, ChangeTracked, EditState, EntityState};

/// Base half of an entity: identity, core values, soft-delete flag and errors.
#[derive(Debug, Clone)]
pub struct Record<V> {
    id: EntityId,
    values: History<V>,
    origin: Option<V>,
    deleted: bool,
    errors: ValidationErrors,
}

impl<V: Clone + PartialEq> Record<V> {
    /// A record created inside the current edit session.
    pub fn new(id: EntityId, values: V) -> Self {
        Self {
            id,
            values: History::new(values),
            origin: None,
            deleted: false,
            errors: ValidationErrors::new(),
        }
    }

    /// A record as it exists in the canonical snapshot.
    pub fn committed(id: EntityId, values: V) -> Self {
        Self {
            id,
            origin: Some(values.clone()),
            values: History::new(values),
            deleted: false,
            errors: ValidationErrors::new(),
        }
    }

    pub fn values(&self) -> &V {
        self.values.current()
    }

    /// Direct access to the staged values. Bracket with push/check to keep history.
    pub fn values_mut(&mut self) -> &mut V {
        self.values.current_mut()
    }

    pub fn origin(&self) -> Option<&V> {
        self.origin.as_ref()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }

    /// Folds the staged values into the committed origin.
    pub fn commit(&mut self) {
        self.origin = Some(self.values.current().clone());
        self.values.clear();
        self.errors.clear();
    }
}

impl<V> Identifiable for Record<V> {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl<V> Deletable for Record<V> {
    fn is_deleted(&self) -> bool {
        self.deleted
    }
}

impl<V: Clone + PartialEq> ChangeTracked for Record<V> {
    fn push_history(&mut self) {
        self.values.push();
    }

    fn pop_history(&mut self) {
        self.values.pop();
    }

    fn check_for_history(&mut self) -> bool {
        self.values.check_for_history()
    }

    fn state(&self) -> EntityState {
        if self.deleted {
            return EntityState::Deleted;
        }
        match &self.origin {
            None => EntityState::New,
            Some(origin) if origin != self.values.current() => EntityState::Changed,
            Some(_) => EntityState::Clean,
        }
    }

    fn edit_state(&self) -> EditState {
        edit_state_for(self.state(), !self.errors.is_empty())
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_record_starts_clean() {
        let mut record = Record::committed(EntityId(1), 10);
        assert_eq!(record.state(), EntityState::Clean);
        record.push_history();
        *record.values_mut() = 11;
        assert!(record.check_for_history());
        assert_eq!(record.state(), EntityState::Changed);
        assert_eq!(record.edit_state(), EditState::Valid);
        record.pop_history();
        assert_eq!(record.state(), EntityState::Clean);
    }

    #[test]
    fn new_record_commits_to_clean() {
        let mut record = Record::new(EntityId(2), "x".to_string());
        assert_eq!(record.state(), EntityState::New);
        record.commit();
        assert_eq!(record.state(), EntityState::Clean);
        assert_eq!(record.edit_state(), EditState::Clean);
    }

    #[test]
    fn deleted_wins_over_other_states() {
        let mut record = Record::new(EntityId(3), 0);
        record.set_deleted(true);
        assert_eq!(record.state(), EntityState::Deleted);
    }
}

use serde::{Deserialize, Serialize};

/// Externally observable change state of an entity relative to the canonical snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    Clean,
    New,
    Changed,
    Deleted,
}

/// Validation status of an entity inside an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditState {
    Clean,
    Valid,
    Error,
}

/// Operations shared by every change-tracked half of an entity.
pub trait ChangeTracked {
    fn push_history(&mut self);
    fn pop_history(&mut self);
    /// True if the tracked value differs from its latest pushed snapshot.
    fn check_for_history(&mut self) -> bool;
    fn state(&self) -> EntityState;
    fn edit_state(&self) -> EditState;
    fn set_deleted(&mut self, deleted: bool);
}

pub(crate) fn edit_state_for(state: EntityState, has_errors: bool) -> EditState {
    if has_errors {
        EditState::Error
    } else if state == EntityState::Clean {
        EditState::Clean
    } else {
        EditState::Valid
    }
}

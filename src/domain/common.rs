use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable integer identity shared by every entity in a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> EntityId;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Entities that can be soft-deleted inside an edit session.
pub trait Deletable {
    fn is_deleted(&self) -> bool;
}

/// A cross-reference as supplied by a caller, resolved by id or by name on admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ref {
    Id(EntityId),
    Name(String),
}

impl From<EntityId> for Ref {
    fn from(id: EntityId) -> Self {
        Ref::Id(id)
    }
}

impl From<&str> for Ref {
    fn from(name: &str) -> Self {
        Ref::Name(name.to_string())
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::Id(id) => write!(f, "{id}"),
            Ref::Name(name) => write!(f, "`{name}`"),
        }
    }
}

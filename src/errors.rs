use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::common::EntityId;
use crate::tracking::DataType;

/// Hard failures that abort a single operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity}: cannot resolve {field} reference {reference}")]
    UnresolvedReference {
        entity: String,
        field: &'static str,
        reference: String,
    },
    #[error("{entity}: name `{name}` is already in use")]
    DuplicateName { entity: String, name: String },
    #[error("{field}: attribute value must be of type {expected:?}")]
    AttributeType {
        field: &'static str,
        expected: DataType,
    },
    #[error("Entity not found: {0}")]
    NotFound(EntityId),
    #[error("Commit refused: {} entities carry validation errors", .errors.len())]
    ValidationFailed {
        errors: Vec<(EntityId, ValidationErrors)>,
    },
    #[error("Commit refused: the ledger changed after this session started")]
    StaleSession,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Broad family of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required field or attribute missing, duplicate identity, text too long.
    Structural,
    /// A cross-reference cannot be resolved.
    Referential,
    /// Illegal pairing, out-of-range value, attribute presence violation.
    Semantic,
    /// Operation not permitted by the entity's lifecycle flags.
    State,
}

/// A single field-tagged validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub const ERROR_MISSING: &str = "missing";
pub const ERROR_EXISTS: &str = "must not exist";

/// Accumulated validation failures for one entity (or one half of one).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, kind: ErrorKind, message: impl Into<String>) {
        self.0.push(ValidationError {
            field,
            kind,
            message: message.into(),
        });
    }

    pub fn missing(&mut self, field: &'static str) {
        self.add(field, ErrorKind::Structural, ERROR_MISSING);
    }

    pub fn must_not_exist(&mut self, field: &'static str) {
        self.add(field, ErrorKind::Semantic, ERROR_EXISTS);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.0.iter().filter(move |error| error.field == field)
    }

    pub fn has_error(&self, field: &str, message: &str) -> bool {
        self.0
            .iter()
            .any(|error| error.field == field && error.message == message)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

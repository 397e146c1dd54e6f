use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::EntityId;
use crate::domain::values::{Dilution, Money, Rate, Units};
use crate::errors::{LedgerError, ValidationErrors};
use crate::tracking::history::History;
use crate::tracking::state::{edit_state_for, ChangeTracked, EditState, EntityState};

/// Value domain of an extension attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Link,
    String,
    Date,
    Money,
    Units,
    Dilution,
    Rate,
    ShortText,
}

/// Reference to another entity. `name` is filled in once the link is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: EntityId,
    pub name: Option<String>,
}

impl Link {
    pub fn to(id: EntityId) -> Self {
        Self { id, name: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    Integer(i64),
    Link(Link),
    String(String),
    Date(NaiveDate),
    Money(Money),
    Units(Units),
    Dilution(Dilution),
    Rate(Rate),
    ShortText(String),
}

impl AttributeValue {
    pub fn data_type(&self) -> DataType {
        match self {
            AttributeValue::Integer(_) => DataType::Integer,
            AttributeValue::Link(_) => DataType::Link,
            AttributeValue::String(_) => DataType::String,
            AttributeValue::Date(_) => DataType::Date,
            AttributeValue::Money(_) => DataType::Money,
            AttributeValue::Units(_) => DataType::Units,
            AttributeValue::Dilution(_) => DataType::Dilution,
            AttributeValue::Rate(_) => DataType::Rate,
            AttributeValue::ShortText(_) => DataType::ShortText,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::String(text) | AttributeValue::ShortText(text) => Some(text),
            _ => None,
        }
    }
}

/// A closed set of attribute kinds an entity type may carry.
pub trait AttributeClass: Copy + Eq + Ord + Hash + fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Field tag used in validation errors.
    fn field(self) -> &'static str;

    fn data_type(self) -> DataType;
}

/// Typed optional attributes attached to one owner entity.
#[derive(Debug, Clone)]
pub struct ExtensionSet<C: AttributeClass> {
    values: History<BTreeMap<C, AttributeValue>>,
    origin: BTreeMap<C, AttributeValue>,
    deleted: bool,
    errors: ValidationErrors,
}

impl<C: AttributeClass> Default for ExtensionSet<C> {
    fn default() -> Self {
        Self {
            values: History::new(BTreeMap::new()),
            origin: BTreeMap::new(),
            deleted: false,
            errors: ValidationErrors::new(),
        }
    }
}

impl<C: AttributeClass> ExtensionSet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An extension set as it exists in the canonical snapshot.
    pub fn committed(values: BTreeMap<C, AttributeValue>) -> Self {
        Self {
            origin: values.clone(),
            values: History::new(values),
            deleted: false,
            errors: ValidationErrors::new(),
        }
    }

    pub fn get(&self, class: C) -> Option<&AttributeValue> {
        self.values.current().get(&class)
    }

    pub fn contains(&self, class: C) -> bool {
        self.values.current().contains_key(&class)
    }

    /// Sets or clears an attribute. The value must match the class's data type.
    pub fn set(&mut self, class: C, value: Option<AttributeValue>) -> Result<(), LedgerError> {
        match value {
            Some(value) => {
                if value.data_type() != class.data_type() {
                    return Err(LedgerError::AttributeType {
                        field: class.field(),
                        expected: class.data_type(),
                    });
                }
                self.values.current_mut().insert(class, value);
            }
            None => {
                self.values.current_mut().remove(&class);
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (C, &AttributeValue)> {
        self.values.current().iter().map(|(class, value)| (*class, value))
    }

    pub fn money(&self, class: C) -> Option<Money> {
        match self.get(class) {
            Some(AttributeValue::Money(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn units(&self, class: C) -> Option<Units> {
        match self.get(class) {
            Some(AttributeValue::Units(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn rate(&self, class: C) -> Option<Rate> {
        match self.get(class) {
            Some(AttributeValue::Rate(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn dilution(&self, class: C) -> Option<Dilution> {
        match self.get(class) {
            Some(AttributeValue::Dilution(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn date(&self, class: C) -> Option<NaiveDate> {
        match self.get(class) {
            Some(AttributeValue::Date(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn integer(&self, class: C) -> Option<i64> {
        match self.get(class) {
            Some(AttributeValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn link(&self, class: C) -> Option<&Link> {
        match self.get(class) {
            Some(AttributeValue::Link(link)) => Some(link),
            _ => None,
        }
    }

    pub fn link_id(&self, class: C) -> Option<EntityId> {
        self.link(class).map(|link| link.id)
    }

    pub fn text(&self, class: C) -> Option<&str> {
        self.get(class).and_then(AttributeValue::as_text)
    }

    /// Change state of a single attribute against the canonical snapshot.
    pub fn attribute_state(&self, class: C) -> EntityState {
        match (self.origin.get(&class), self.get(class)) {
            (None, None) => EntityState::Clean,
            (None, Some(_)) => EntityState::New,
            (Some(_), None) => EntityState::Deleted,
            (Some(before), Some(after)) if before != after => EntityState::Changed,
            (Some(_), Some(_)) => EntityState::Clean,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }

    pub fn commit(&mut self) {
        self.origin = self.values.current().clone();
        self.values.clear();
        self.errors.clear();
    }
}

impl<C: AttributeClass> ChangeTracked for ExtensionSet<C> {
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
        if *self.values.current() != self.origin {
            EntityState::Changed
        } else {
            EntityState::Clean
        }
    }

    fn edit_state(&self) -> EditState {
        edit_state_for(self.state(), !self.errors.is_empty())
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

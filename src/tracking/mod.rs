//! Change tracking for entities split into a base record and an extension set.

pub mod extension;
pub mod history;
pub mod record;
pub mod state;
pub mod tracked;

pub use extension::{AttributeClass, AttributeValue, DataType, ExtensionSet, Link};
pub use history::History;
pub use record::Record;
pub use state::{ChangeTracked, EditState, EntityState};
pub use tracked::Tracked;

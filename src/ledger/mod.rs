//! Canonical snapshot, edit sessions, lifecycle pass and pattern expansion.

pub mod dataset;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod lifecycle;
pub mod recurring;
pub mod session;

pub use dataset::{Committable, DataSet, EntityList};
pub use ledger::{CommitSummary, Ledger};
pub use lifecycle::{recompute, LifecycleFlags, LifecycleMap, TouchEvent};
pub use recurring::{tax_credit_for, Expansion, ExpansionState, PatternExpander};
pub use session::EditSession;

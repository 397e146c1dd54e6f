//! Decision tables and validators for transactions, accounts and patterns.

pub mod compatibility;
pub mod requirements;
pub mod validation;

pub use compatibility::{is_valid_event, rule_for, CategoryShape, EventRule, PairShape};
pub use requirements::{account_requirement, transaction_requirement, Requirement, TransactionContext};
pub use validation::{check_requirements, EntityErrors, Validator};

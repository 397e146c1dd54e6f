//! Entities, categories and value types of the personal ledger.

pub mod account;
pub mod category;
pub mod common;
pub mod dates;
pub mod market;
pub mod pattern;
pub mod tax_year;
pub mod transaction;
pub mod values;

pub use account::{Account, AccountDraft, AccountInfoClass, AccountValues, AccountView};
pub use category::{AccountCategory, AccountClass, TransactionCategory, TransactionClass};
pub use common::{Deletable, EntityId, Identifiable, NamedEntity, Ref};
pub use market::{AccountPrice, AccountRate, PriceValues, RateValues};
pub use pattern::{Frequency, Pattern, PatternDraft, PatternValues};
pub use tax_year::{TaxRegime, TaxYear, TaxYearInfoClass, TaxYearRange, TaxYearValues};
pub use transaction::{Transaction, TransactionDraft, TransactionInfoClass, TransactionValues};
pub use values::{Dilution, Money, Rate, Units};

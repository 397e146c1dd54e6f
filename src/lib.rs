#![doc(test(attr(deny(warnings))))]

//! Ledger Core holds the integrity rules of a personal ledger: which transactions
//! are legal between which accounts, which optional attributes they carry, how
//! recurring patterns expand into a tax year, and which accounts are still in use.

pub mod config;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod rules;
pub mod tracking;
pub mod utils;

use std::sync::Once;

pub use config::{ConfigError, ConfigManager, LedgerConfig};
pub use errors::{ErrorKind, LedgerError, ValidationError, ValidationErrors};
pub use ledger::{EditSession, Ledger};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}

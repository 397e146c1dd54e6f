use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{EntityId, Ref};
use crate::domain::values::Money;
use crate::tracking::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
    EndOfMonth,
    Quarterly,
    HalfYearly,
    /// Monthly, but at most ten occurrences per year.
    TenMonths,
    Annually,
    /// Once, on the debit account's maturity date.
    Maturity,
}

impl Frequency {
    pub fn days_step(self) -> Option<i64> {
        match self {
            Frequency::Weekly => Some(7),
            Frequency::Fortnightly => Some(14),
            _ => None,
        }
    }

    pub fn months_step(self) -> Option<i32> {
        match self {
            Frequency::Monthly | Frequency::TenMonths => Some(1),
            Frequency::Quarterly => Some(3),
            Frequency::HalfYearly => Some(6),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Fortnightly => "Fortnightly",
            Frequency::Monthly => "Monthly",
            Frequency::EndOfMonth => "End of month",
            Frequency::Quarterly => "Quarterly",
            Frequency::HalfYearly => "Half yearly",
            Frequency::TenMonths => "Ten months",
            Frequency::Annually => "Annually",
            Frequency::Maturity => "On maturity",
        }
    }
}

/// Template for a recurring transaction. The debit account owns the pattern and
/// the credit account is its partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternValues {
    /// Anchor inside the canonical reference window.
    pub date: NaiveDate,
    pub frequency: Frequency,
    pub debit: EntityId,
    pub credit: EntityId,
    pub category: EntityId,
    pub amount: Money,
}

pub type Pattern = Record<PatternValues>;

#[derive(Debug, Clone)]
pub struct PatternDraft {
    pub date: NaiveDate,
    pub frequency: Frequency,
    pub debit: Ref,
    pub credit: Ref,
    pub category: Ref,
    pub amount: Money,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::category::TransactionClass;
use crate::domain::dates::{add_days, shift_years};
use crate::domain::values::Rate;
use crate::tracking::{AttributeClass, DataType, ExtensionSet, Record, Tracked};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxRegime {
    Archive,
    Standard,
    LowSalaryBand,
    AdditionalBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearValues {
    pub regime: TaxRegime,
    /// Last day of the tax year.
    pub year_end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxYearInfoClass {
    PersonalAllowance,
    RentalAllowance,
    CapitalAllowance,
    BasicTaxRate,
    HigherTaxRate,
    InterestTaxRate,
    DividendTaxRate,
}

impl AttributeClass for TaxYearInfoClass {
    const ALL: &'static [Self] = &[
        TaxYearInfoClass::PersonalAllowance,
        TaxYearInfoClass::RentalAllowance,
        TaxYearInfoClass::CapitalAllowance,
        TaxYearInfoClass::BasicTaxRate,
        TaxYearInfoClass::HigherTaxRate,
        TaxYearInfoClass::InterestTaxRate,
        TaxYearInfoClass::DividendTaxRate,
    ];

    fn field(self) -> &'static str {
        match self {
            TaxYearInfoClass::PersonalAllowance => "PersonalAllowance",
            TaxYearInfoClass::RentalAllowance => "RentalAllowance",
            TaxYearInfoClass::CapitalAllowance => "CapitalAllowance",
            TaxYearInfoClass::BasicTaxRate => "BasicTaxRate",
            TaxYearInfoClass::HigherTaxRate => "HigherTaxRate",
            TaxYearInfoClass::InterestTaxRate => "InterestTaxRate",
            TaxYearInfoClass::DividendTaxRate => "DividendTaxRate",
        }
    }

    fn data_type(self) -> DataType {
        match self {
            TaxYearInfoClass::PersonalAllowance
            | TaxYearInfoClass::RentalAllowance
            | TaxYearInfoClass::CapitalAllowance => DataType::Money,
            _ => DataType::Rate,
        }
    }
}

/// Inclusive date bounds of one tax year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxYearRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TaxYearRange {
    pub fn ending(end: NaiveDate) -> Self {
        Self {
            start: add_days(shift_years(end, -1), 1),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

pub type TaxYear = Tracked<Record<TaxYearValues>, ExtensionSet<TaxYearInfoClass>>;

impl Tracked<Record<TaxYearValues>, ExtensionSet<TaxYearInfoClass>> {
    pub fn range(&self) -> TaxYearRange {
        TaxYearRange::ending(self.values().year_end)
    }

    /// Rate used to seed the tax credit of net-of-tax income.
    pub fn credit_rate(&self, class: TransactionClass) -> Option<Rate> {
        let info_class = match class {
            TransactionClass::TaxedIncome | TransactionClass::BenefitIncome => {
                TaxYearInfoClass::BasicTaxRate
            }
            TransactionClass::Interest => TaxYearInfoClass::InterestTaxRate,
            TransactionClass::Dividend => TaxYearInfoClass::DividendTaxRate,
            _ => return None,
        };
        self.info().rate(info_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_spans_one_year() {
        let range = TaxYearRange::ending(NaiveDate::from_ymd_opt(2025, 4, 5).unwrap());
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 4, 6).unwrap());
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 4, 6).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 4, 6).unwrap()));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::tax_year::TaxYearRange;

/// Tunable limits and calendar anchors used by validation and pattern expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "LedgerConfig::default_tax_year_end_month")]
    pub tax_year_end_month: u32,
    #[serde(default = "LedgerConfig::default_tax_year_end_day")]
    pub tax_year_end_day: u32,
    /// Year in which the canonical pattern window ends.
    #[serde(default = "LedgerConfig::default_reference_year")]
    pub reference_year: i32,
    #[serde(default = "LedgerConfig::default_reference_max_len")]
    pub reference_max_len: usize,
    #[serde(default = "LedgerConfig::default_comments_max_len")]
    pub comments_max_len: usize,
    #[serde(default = "LedgerConfig::default_name_max_len")]
    pub name_max_len: usize,
    #[serde(default = "LedgerConfig::default_notes_max_len")]
    pub notes_max_len: usize,
    #[serde(default = "LedgerConfig::default_short_text_max_len")]
    pub short_text_max_len: usize,
    /// No transaction may be dated before this.
    #[serde(default = "LedgerConfig::default_earliest_date")]
    pub earliest_date: NaiveDate,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tax_year_end_month: Self::default_tax_year_end_month(),
            tax_year_end_day: Self::default_tax_year_end_day(),
            reference_year: Self::default_reference_year(),
            reference_max_len: Self::default_reference_max_len(),
            comments_max_len: Self::default_comments_max_len(),
            name_max_len: Self::default_name_max_len(),
            notes_max_len: Self::default_notes_max_len(),
            short_text_max_len: Self::default_short_text_max_len(),
            earliest_date: Self::default_earliest_date(),
        }
    }
}

impl LedgerConfig {
    pub fn default_tax_year_end_month() -> u32 {
        4
    }

    pub fn default_tax_year_end_day() -> u32 {
        5
    }

    pub fn default_reference_year() -> i32 {
        2000
    }

    pub fn default_reference_max_len() -> usize {
        20
    }

    pub fn default_comments_max_len() -> usize {
        50
    }

    pub fn default_name_max_len() -> usize {
        30
    }

    pub fn default_notes_max_len() -> usize {
        100
    }

    pub fn default_short_text_max_len() -> usize {
        50
    }

    pub fn default_earliest_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the tax year that ends in `year`.
    pub fn tax_year_end(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.tax_year_end_month, self.tax_year_end_day)
    }

    /// Whether `date` falls on the configured tax year boundary.
    pub fn is_tax_year_end(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        date.month() == self.tax_year_end_month && date.day() == self.tax_year_end_day
    }

    pub fn tax_year_ending(&self, year: i32) -> Result<TaxYearRange, ConfigError> {
        self.tax_year_end(year)
            .map(TaxYearRange::ending)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "tax year end {}/{} does not exist in {}",
                    self.tax_year_end_day, self.tax_year_end_month, year
                ))
            })
    }

    /// The canonical window every pattern date lives in.
    pub fn reference_window(&self) -> Result<TaxYearRange, ConfigError> {
        self.tax_year_ending(self.reference_year)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reference_window()?;
        if self.name_max_len == 0 {
            return Err(ConfigError::Invalid("name_max_len must be positive".into()));
        }
        Ok(())
    }
}

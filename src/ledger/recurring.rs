//! Expansion of recurring patterns into the transactions of one tax year.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::common::{EntityId, Identifiable, Ref};
use crate::domain::dates::{add_days, end_of_month, shift_months, shift_years, year_delta};
use crate::domain::pattern::{Frequency, Pattern, PatternValues};
use crate::domain::tax_year::TaxYearRange;
use crate::domain::transaction::TransactionDraft;
use crate::domain::values::{Money, Rate};

/// Upper bound on yields for a single target year; weekly is the densest frequency.
const MAX_OCCURRENCES: u32 = 64;

/// Number of monthly steps a ten-month pattern takes after its first occurrence.
const TEN_MONTH_STEPS: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    FirstOccurrence,
    Repeating,
    Exhausted,
}

/// Generates dated transaction drafts for one pattern, one target tax year at a time.
#[derive(Debug, Clone)]
pub struct PatternExpander {
    pattern: EntityId,
    values: PatternValues,
    window: TaxYearRange,
    maturity: Option<NaiveDate>,
    state: ExpansionState,
    target: Option<TaxYearRange>,
    anchor: NaiveDate,
    cursor: NaiveDate,
    occurrences: u32,
}

impl PatternExpander {
    /// `window` is the canonical reference year the pattern date lives in;
    /// `maturity` is the owning account's maturity date, if any.
    pub fn new(pattern: &Pattern, window: TaxYearRange, maturity: Option<NaiveDate>) -> Self {
        let values = pattern.values().clone();
        Self {
            pattern: pattern.id(),
            anchor: values.date,
            cursor: values.date,
            values,
            window,
            maturity,
            state: ExpansionState::FirstOccurrence,
            target: None,
            occurrences: 0,
        }
    }

    pub fn state(&self) -> ExpansionState {
        self.state
    }

    /// Next transaction inside `year`, or `None` once the year is exhausted.
    /// Asking for a different year restarts the expansion.
    pub fn next_for(&mut self, year: TaxYearRange) -> Option<TransactionDraft> {
        if self.target != Some(year) {
            self.restart(year);
        }
        match self.state {
            ExpansionState::Exhausted => None,
            ExpansionState::FirstOccurrence => self.first(year),
            ExpansionState::Repeating => self.step(year),
        }
    }

    /// Iterator over every remaining occurrence in `year`.
    pub fn expand(self, year: TaxYearRange) -> Expansion {
        Expansion {
            expander: self,
            year,
        }
    }

    fn restart(&mut self, year: TaxYearRange) {
        self.target = Some(year);
        self.state = ExpansionState::FirstOccurrence;
        self.anchor = self.values.date;
        self.cursor = self.values.date;
        self.occurrences = 0;
    }

    fn first(&mut self, year: TaxYearRange) -> Option<TransactionDraft> {
        let date = match self.values.frequency {
            Frequency::Maturity => match self.maturity {
                Some(maturity) if year.contains(maturity) => maturity,
                _ => return self.exhaust(),
            },
            _ => shift_years(self.values.date, year_delta(self.window.end, year.end)),
        };
        if !year.contains(date) {
            return self.exhaust();
        }
        self.anchor = date;
        self.state = match self.values.frequency {
            Frequency::Annually | Frequency::Maturity => ExpansionState::Exhausted,
            _ => ExpansionState::Repeating,
        };
        Some(self.emit(date))
    }

    fn step(&mut self, year: TaxYearRange) -> Option<TransactionDraft> {
        if self.occurrences >= MAX_OCCURRENCES {
            return self.exhaust();
        }
        let frequency = self.values.frequency;
        let offset = self.occurrences as i32;
        let next = match frequency {
            Frequency::Weekly | Frequency::Fortnightly => {
                add_days(self.cursor, frequency.days_step().unwrap_or(7))
            }
            Frequency::EndOfMonth => end_of_month(shift_months(self.anchor, offset)),
            Frequency::Monthly
            | Frequency::Quarterly
            | Frequency::HalfYearly
            | Frequency::TenMonths => {
                shift_months(self.anchor, frequency.months_step().unwrap_or(1) * offset)
            }
            Frequency::Annually | Frequency::Maturity => return self.exhaust(),
        };
        if next > year.end {
            return self.exhaust();
        }
        if frequency == Frequency::TenMonths && next > shift_months(self.anchor, TEN_MONTH_STEPS)
        {
            return self.exhaust();
        }
        Some(self.emit(next))
    }

    fn emit(&mut self, date: NaiveDate) -> TransactionDraft {
        self.cursor = date;
        self.occurrences += 1;
        let mut draft = TransactionDraft::new(
            date,
            Ref::Id(self.values.debit),
            Ref::Id(self.values.credit),
            Ref::Id(self.values.category),
            self.values.amount,
        );
        draft.template = Some(self.pattern);
        draft
    }

    fn exhaust(&mut self) -> Option<TransactionDraft> {
        if self.state != ExpansionState::Exhausted {
            debug!(
                pattern = %self.pattern,
                occurrences = self.occurrences,
                "pattern expansion exhausted"
            );
        }
        self.state = ExpansionState::Exhausted;
        None
    }
}

/// Iterator adaptor over [`PatternExpander::next_for`] for a fixed year.
#[derive(Debug, Clone)]
pub struct Expansion {
    expander: PatternExpander,
    year: TaxYearRange,
}

impl Iterator for Expansion {
    type Item = TransactionDraft;

    fn next(&mut self) -> Option<Self::Item> {
        self.expander.next_for(self.year)
    }
}

/// Gross-up of a net amount: the tax already deducted at `rate`.
pub fn tax_credit_for(net: Money, rate: Rate) -> Option<Money> {
    let rate = rate.value();
    if rate <= Decimal::ZERO || rate >= Decimal::ONE {
        return None;
    }
    let credit = Money::new(net.value() * rate / (Decimal::ONE - rate)).rounded();
    credit.is_positive().then_some(credit)
}

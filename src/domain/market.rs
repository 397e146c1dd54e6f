//! Interest rates and unit prices recorded against accounts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::EntityId;
use crate::domain::values::{Money, Rate};
use crate::tracking::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateValues {
    pub account: EntityId,
    pub rate: Rate,
    pub bonus: Option<Rate>,
    /// Last day the rate applies; open-ended when absent.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceValues {
    pub account: EntityId,
    pub date: NaiveDate,
    pub price: Money,
}

pub type AccountRate = Record<RateValues>;
pub type AccountPrice = Record<PriceValues>;

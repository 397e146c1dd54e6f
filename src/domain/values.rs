//! Fixed-point value types used by amounts and extension attributes.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

macro_rules! decimal_value {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Decimal);

        impl $name {
            pub const ZERO: $name = $name(Decimal::ZERO);

            pub fn new(value: Decimal) -> Self {
                Self(value)
            }

            pub fn value(&self) -> Decimal {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            pub fn is_non_zero(&self) -> bool {
                !self.0.is_zero()
            }

            /// Strictly greater than zero.
            pub fn is_positive(&self) -> bool {
                self.0 > Decimal::ZERO
            }
        }

        impl From<Decimal> for $name {
            fn from(value: Decimal) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

decimal_value!(
    /// Monetary amount with two decimal places of meaning.
    Money
);
decimal_value!(
    /// Quantity of units held in a unit-bearing account.
    Units
);
decimal_value!(
    /// Percentage rate, stored as a fraction (0.20 == 20%).
    Rate
);
decimal_value!(
    /// Factor applied to unit holdings by splits, rights issues and demergers.
    Dilution
);

impl Money {
    /// Rounds to whole pence using banker's rounding.
    pub fn rounded(&self) -> Money {
        Money(self.0.round_dp(2))
    }
}

impl Dilution {
    /// A dilution factor must lie within (0, 1].
    pub fn is_in_range(&self) -> bool {
        self.0 > Decimal::ZERO && self.0 <= Decimal::ONE
    }
}

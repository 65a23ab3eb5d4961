//! Monetary price value object.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Number of fractional digits a price carries.
pub const PRICE_SCALE: u32 = 2;

/// Total significant digits a price may carry (`NUMERIC(12, 2)`).
pub const PRICE_PRECISION: u32 = 12;

/// Non-negative unit price, held as an exact decimal with two fractional digits.
///
/// Binary floats never enter this type: callers parse from a string (or a JSON
/// number rendered as text) so totals cannot drift through rounding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Validate and normalise a decimal amount.
    ///
    /// Accepts `1.5` and `1.50` alike; rejects negative values and anything with
    /// more than two significant fractional digits (`1.505`), and anything at
    /// or above `10^10`.
    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("price must not be negative"));
        }
        if amount >= Self::limit() {
            return Err(DomainError::validation(format!(
                "price must be below {}",
                Self::limit()
            )));
        }
        let normalized = amount.normalize();
        if normalized.scale() > PRICE_SCALE {
            return Err(DomainError::validation(format!(
                "price must have at most {PRICE_SCALE} decimal places"
            )));
        }
        let mut value = normalized;
        value.rescale(PRICE_SCALE);
        Ok(Self(value))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Smallest amount that no longer fits the integer part.
    fn limit() -> Decimal {
        Decimal::from(10i64.pow(PRICE_PRECISION - PRICE_SCALE))
    }
}

impl ValueObject for Price {}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("price is not a decimal: {e}")))?;
        Self::new(amount)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_two_decimal_places() {
        let p: Price = "19.99".parse().unwrap();
        assert_eq!(p.to_string(), "19.99");
    }

    #[test]
    fn pads_to_two_decimal_places() {
        assert_eq!("5".parse::<Price>().unwrap().to_string(), "5.00");
        assert_eq!("1.5".parse::<Price>().unwrap().to_string(), "1.50");
        assert_eq!("2.500".parse::<Price>().unwrap().to_string(), "2.50");
    }

    #[test]
    fn zero_is_a_valid_price() {
        assert_eq!("0".parse::<Price>().unwrap().amount(), Decimal::ZERO);
    }

    #[test]
    fn rejects_negative() {
        assert!(matches!("-0.01".parse::<Price>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        assert!(matches!("1.005".parse::<Price>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn largest_storable_price_is_the_upper_bound() {
        let max: Price = "9999999999.99".parse().unwrap();
        assert_eq!(max.to_string(), "9999999999.99");
        assert!(matches!("10000000000".parse::<Price>(), Err(DomainError::Validation(_))));
        assert!(matches!("1234567890123456.78".parse::<Price>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!("twelve".parse::<Price>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn serializes_as_string_and_validates_on_deserialize() {
        let p: Price = "10.1".parse().unwrap();
        assert_eq!(serde_json::to_value(p).unwrap(), serde_json::json!("10.10"));

        let back: Price = serde_json::from_value(serde_json::json!("10.10")).unwrap();
        assert_eq!(back, p);

        assert!(serde_json::from_value::<Price>(serde_json::json!("-1.00")).is_err());
    }

    #[test]
    fn cent_sums_are_exact() {
        let dime: Price = "0.10".parse().unwrap();
        let total: Decimal = (0..10).map(|_| dime.amount()).sum();
        assert_eq!(total, Decimal::ONE);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every whole-cent amount is accepted and keeps its value.
            #[test]
            fn whole_cents_roundtrip(cents in 0i64..100_000_000) {
                let amount = Decimal::new(cents, 2);
                let price = Price::new(amount).unwrap();
                prop_assert_eq!(price.amount(), amount);
                prop_assert_eq!(price.amount().scale(), PRICE_SCALE);
            }

            /// Property: a non-zero third fractional digit is always rejected.
            #[test]
            fn mills_are_rejected(units in 0i64..1_000_000, mill in 1i64..10) {
                let amount = Decimal::new(units * 10 + mill, 3);
                prop_assert!(Price::new(amount).is_err());
            }
        }
    }
}

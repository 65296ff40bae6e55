//! Value objects: equality by value, not identity.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects (immutable, compared by value).
pub trait ValueObject: Clone + PartialEq + fmt::Debug {}

/// Non-negative monetary amount stored with two decimal places.
///
/// Prices, amounts paid and invoice totals all use this type. Amounts with more
/// than two fractional digits are rounded half-up on construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const SCALE: u32 = 2;

    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation(format!(
                "amount must be non-negative (got {amount})"
            )));
        }
        let mut rounded =
            amount.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(Self::SCALE);
        Ok(Self(rounded))
    }

    pub fn zero() -> Self {
        Self(Decimal::new(0, Self::SCALE))
    }

    /// Amount in the smallest currency unit, e.g. `Money::from_cents(1050)` is 10.50.
    pub fn from_cents(cents: u64) -> Self {
        // Any u64 fits the 96-bit mantissa.
        Self(Decimal::from_i128_with_scale(i128::from(cents), Self::SCALE))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl ValueObject for Money {}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        let err = Money::new(Decimal::new(-1, 0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rounds_to_two_places() {
        let m = Money::new(Decimal::new(10_005, 3)).unwrap();
        assert_eq!(m.to_string(), "10.01");
        assert_eq!(Money::from_cents(2000).to_string(), "20.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn equal_amounts_compare_equal_regardless_of_input_scale() {
        let a = Money::new(Decimal::new(30, 0)).unwrap();
        let b = Money::from_cents(3000);
        assert_eq!(a, b);
    }

    #[test]
    fn from_cents_covers_the_full_u64_range() {
        let max = Money::from_cents(u64::MAX);
        assert!(max.amount().is_sign_positive());
        assert_eq!(max.amount() * Decimal::ONE_HUNDRED, Decimal::from(u64::MAX));
        assert_eq!(max.to_string(), "184467440737095516.15");
    }

    #[test]
    fn deserialization_validates() {
        let ok: Money = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(ok, Money::from_cents(1250));
        assert!(serde_json::from_str::<Money>("\"-3\"").is_err());
    }
}

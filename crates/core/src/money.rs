//! Monetary amounts.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Non-negative monetary amount in the smallest currency unit (e.g., cents).
///
/// A single implicit currency is assumed. `checked_*` arithmetic reports
/// amounts that cannot be represented; the rest saturates instead of wrapping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Amount expressed in minor units (`from_cents(150)` is 1.50).
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Amount expressed in whole currency units (`from_units(2)` is 2.00).
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(100))
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply by a quantity. Non-positive quantities yield zero.
    pub fn times(self, quantity: i64) -> Self {
        let quantity = u64::try_from(quantity).unwrap_or(0);
        Self(self.0.saturating_mul(quantity))
    }

    /// Multiply by a quantity, `None` for a negative quantity or on overflow.
    pub fn checked_times(self, quantity: i64) -> Option<Self> {
        let quantity = u64::try_from(quantity).ok()?;
        self.0.checked_mul(quantity).map(Self)
    }

    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl ValueObject for Money {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Money::from_units(2600).to_string(), "2600.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(12_345).to_string(), "123.45");
    }

    #[test]
    fn times_multiplies_and_ignores_non_positive() {
        let price = Money::from_units(50);
        assert_eq!(price.times(2), Money::from_units(100));
        assert_eq!(price.times(0), Money::ZERO);
        assert_eq!(price.times(-3), Money::ZERO);
    }

    #[test]
    fn sum_of_empty_is_zero() {
        let total: Money = Vec::<Money>::new().into_iter().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn arithmetic_saturates() {
        let max = Money::from_cents(u64::MAX);
        assert_eq!(max.saturating_add(Money::from_cents(1)), max);
        assert_eq!(max.times(2), max);
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let half = Money::from_cents(u64::MAX / 2 + 1);
        assert_eq!(half.checked_times(1), Some(half));
        assert_eq!(half.checked_times(2), None);
        assert_eq!(half.checked_add(half), None);
        assert_eq!(Money::from_units(50).checked_times(-1), None);
        assert_eq!(Money::from_units(50).checked_times(0), Some(Money::ZERO));
        assert_eq!(
            Money::from_units(1).checked_add(Money::from_cents(5)),
            Some(Money::from_cents(105))
        );
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: ordering of money follows ordering of minor units.
            #[test]
            fn ordering_follows_cents(a in 0u64..1_000_000, b in 0u64..1_000_000) {
                prop_assert_eq!(Money::from_cents(a) < Money::from_cents(b), a < b);
            }

            /// Property: checked multiplication agrees with u64 arithmetic.
            #[test]
            fn checked_times_matches_u64(cents in any::<u64>(), quantity in 0i64..=i64::MAX) {
                let expected = cents.checked_mul(quantity as u64).map(Money::from_cents);
                prop_assert_eq!(Money::from_cents(cents).checked_times(quantity), expected);
            }
        }
    }
}

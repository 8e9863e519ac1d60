//! Type-safe price representation using decimal arithmetic.
//!
//! The Aurora backend stores prices as plain JSON numbers in USD. `Price`
//! wraps `rust_decimal::Decimal` so cart subtotals and quote totals never go
//! through floating point.

use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency (USD).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as a whole number of cents, rounded half-up.
    ///
    /// Payment gateways take integer cents; catalog prices always carry at
    /// most two decimal places so this is normally exact.
    #[must_use]
    pub fn cents(&self) -> i64 {
        use rust_decimal::prelude::ToPrimitive;
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let p = Price::from_cents(1999);
        assert_eq!(p.display(), "$19.99");
    }

    #[test]
    fn test_line_arithmetic() {
        let unit = Price::from_cents(2550);
        let line = unit * 3;
        assert_eq!(line, Price::from_cents(7650));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(100), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn test_cents() {
        assert_eq!(Price::from_cents(1999).cents(), 1999);
        let p: Price = serde_json::from_str("120.5").unwrap();
        assert_eq!(p.cents(), 12050);
    }

    #[test]
    fn test_serde_plain_number() {
        // The backend sends prices as bare JSON numbers
        let p: Price = serde_json::from_str("120.5").unwrap();
        assert_eq!(p, Price::new(Decimal::new(1205, 1)));
    }
}

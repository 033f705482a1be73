//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A sale total summed over hundreds of lines drifts by fractions of a   │
//! │  cent and no longer matches the sum of its items.                       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    5.00 × 3 = 500 × 3 = 1500 cents, exactly, every time                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! ```text
//! JSON in:   5, 5.1, "5.10"   ──► Decimal ──► 510 cents
//! JSON in:   5.125            ──► rejected (more than 2 decimal places)
//! JSON out:  510 cents        ──► "5.10"
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(500); // 5.00
//! let total = price.multiply_quantity(3);
//! assert_eq!(total.to_string(), "15.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of fractional digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Profit can be negative when a product sells below cost
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Decimal only at the edges**: Parsing and printing go through
///   `rust_decimal`, arithmetic never does
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──┬──► SaleItem.price_at_sale ──► Sale.total_amount      │
/// │                  │                                                      │
/// │  Product.cost  ──┴──► SaleItem.cost_at_sale  ──► Sale.total_profit      │
/// │                                                                         │
/// │  Sale.total_amount ──► Dashboard totals and daily trend                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an exact decimal amount into Money.
    ///
    /// Trailing zeros are ignored, so `5.100` is accepted as `5.10`, but any
    /// significant digit past the second decimal place is rejected rather
    /// than rounded.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_decimal(Decimal::new(510, 2)).unwrap();
    /// assert_eq!(price.cents(), 510);
    ///
    /// assert!(Money::from_decimal(Decimal::new(5125, 3)).is_err());
    /// ```
    pub fn from_decimal(amount: Decimal) -> Result<Self, ValidationError> {
        let normalized = amount.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("at most {MONEY_SCALE} decimal places are allowed"),
            });
        }

        normalized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: "amount is out of range".to_string(),
            })
    }

    /// Returns the amount as a decimal with exactly two fractional digits.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // 2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }
}

// =============================================================================
// Parsing & Serde
// =============================================================================

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{s}' is not a decimal number"),
        })?;
        Money::from_decimal(amount)
    }
}

/// Serializes as a decimal string with two fractional digits (`"15.00"`).
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts JSON numbers (`5`, `5.1`) and decimal strings (`"5.10"`).
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most two fractional digits")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    // f64 Display is the shortest string that round-trips, so 5.1 parses as
    // exactly 5.1 instead of its binary expansion.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        Money::from_str(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::from_str(v).map_err(E::custom)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the plain decimal amount, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_always_two_decimals() {
        assert_eq!(Money::from_cents(1500).to_string(), "15.00");
        assert_eq!(Money::from_cents(510).to_string(), "5.10");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("5".parse::<Money>().unwrap().cents(), 500);
        assert_eq!("5.1".parse::<Money>().unwrap().cents(), 510);
        assert_eq!(" 5.10 ".parse::<Money>().unwrap().cents(), 510);
        assert_eq!("5.100".parse::<Money>().unwrap().cents(), 510);

        assert!("5.125".parse::<Money>().is_err());
        assert!("five".parse::<Money>().is_err());
    }

    #[test]
    fn test_deserialize_numbers_and_strings() {
        let from_float: Money = serde_json::from_str("5.1").unwrap();
        assert_eq!(from_float.cents(), 510);

        let from_int: Money = serde_json::from_str("12").unwrap();
        assert_eq!(from_int.cents(), 1200);

        let from_string: Money = serde_json::from_str("\"0.30\"").unwrap();
        assert_eq!(from_string.cents(), 30);

        assert!(serde_json::from_str::<Money>("0.001").is_err());
        assert!(serde_json::from_str::<Money>("true").is_err());
    }

    #[test]
    fn test_serialize_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(900)).unwrap();
        assert_eq!(json, "\"9.00\"");
    }

    #[test]
    fn test_float_drift_does_not_happen() {
        let dime: Money = serde_json::from_str("0.1").unwrap();
        let twenty: Money = serde_json::from_str("0.2").unwrap();
        assert_eq!((dime + twenty).to_string(), "0.30");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(b.multiply_quantity(3).cents(), 1500);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge: Money = "92233720368547758.07".parse().unwrap();
        assert_eq!(huge.cents(), i64::MAX);

        assert_eq!(huge.checked_multiply_quantity(1), Some(huge));
        assert_eq!(huge.checked_multiply_quantity(2), None);
        assert_eq!(huge.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);

        let price = Money::from_cents(299);
        assert_eq!(price.checked_multiply_quantity(3), Some(Money::from_cents(897)));
        assert_eq!(
            price.checked_add(Money::from_cents(1)),
            Some(Money::from_cents(300))
        );
    }

    #[test]
    fn test_negative_profit_is_representable() {
        let price = Money::from_cents(150);
        let cost = Money::from_cents(200);
        let profit = (price - cost).multiply_quantity(2);
        assert!(profit.is_negative());
        assert_eq!(profit.to_string(), "-1.00");
    }
}

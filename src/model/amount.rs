//! Amount type for monetary magnitudes delivered by the Spendbook API.
//!
//! This module provides the `Amount` type which wraps `Decimal` and tolerates
//! the payload shapes the backend has been observed to produce: a JSON number,
//! a numeric string, or null. Anything non-finite or unparseable normalizes to
//! zero at this boundary so the aggregation code never sees it.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A monetary magnitude. The sign of a transaction is carried by its kind
/// (income or expense), so an `Amount` is expected to be non-negative, though
/// a derived balance may go below zero.
///
/// # Examples
///
/// Deserializing from a JSON number:
/// ```
/// # use spendbook_core::model::Amount;
/// let amount: Amount = serde_json::from_str("12.5").unwrap();
/// assert_eq!(amount.to_string(), "12.50");
/// ```
///
/// Null normalizes to zero rather than failing:
/// ```
/// # use spendbook_core::model::Amount;
/// let amount: Amount = serde_json::from_str("null").unwrap();
/// assert!(amount.is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates an Amount from an `f64`, mapping NaN and infinities to zero.
    pub fn from_f64(value: f64) -> Self {
        Self(Decimal::from_f64(value).unwrap_or_default())
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::default(), Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The API expects a plain JSON number.
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

/// The payload shapes the backend emits for an amount.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = Option::<AmountRepr>::deserialize(deserializer)?;
        Ok(match repr {
            Some(AmountRepr::Number(n)) => Amount::from_f64(n),
            Some(AmountRepr::Text(s)) => Decimal::from_str(s.trim())
                .map(Amount::new)
                .unwrap_or_default(),
            None => Amount::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number() {
        let amount: Amount = serde_json::from_str("50.25").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("50.25").unwrap());
    }

    #[test]
    fn test_deserialize_integer() {
        let amount: Amount = serde_json::from_str("100").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("100").unwrap());
    }

    #[test]
    fn test_deserialize_numeric_string() {
        let amount: Amount = serde_json::from_str("\" 42.10 \"").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("42.10").unwrap());
    }

    #[test]
    fn test_deserialize_null_is_zero() {
        let amount: Amount = serde_json::from_str("null").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_deserialize_garbage_string_is_zero() {
        let amount: Amount = serde_json::from_str("\"not a number\"").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_from_f64_nan_is_zero() {
        assert!(Amount::from_f64(f64::NAN).is_zero());
        assert!(Amount::from_f64(f64::INFINITY).is_zero());
        assert!(Amount::from_f64(f64::NEG_INFINITY).is_zero());
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::from_f64(12.5);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "12.5");
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::from_f64(30.0);
        let b = Amount::from_f64(50.0);
        assert_eq!((a + b).value(), Decimal::from_str("80").unwrap());
        assert!((a - b).is_negative());
    }

    #[test]
    fn test_sum() {
        let total: Amount = [10.0, 20.0, 5.5].iter().map(|n| Amount::from_f64(*n)).sum();
        assert_eq!(total.value(), Decimal::from_str("35.5").unwrap());
    }

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(Amount::from_f64(7.0).to_string(), "7.00");
        assert_eq!(Amount::from_f64(7.25).to_string(), "7.25");
    }

    #[test]
    fn test_ordering() {
        assert!(Amount::from_f64(30.0) < Amount::from_f64(50.0));
    }
}

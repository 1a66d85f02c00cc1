//! Monetary amount type used throughout the engine.
//!
//! Wraps `rust_decimal` without forcing a scale, so splitting an amount into
//! repeating fractions keeps full precision and the residue stays far below
//! the engine tolerance.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A signed decimal amount of money.
///
/// Rendering always uses two decimal places; arithmetic keeps every digit.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use settle_engine::Amount;
///
/// let amount = Amount::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.50");
/// assert_eq!(amount.split(3).to_string(), "3.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Number of decimal places used when rendering.
    pub const DISPLAY_SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Wraps a raw `Decimal`.
    pub const fn new(value: Decimal) -> Self {
        Amount(value)
    }

    /// Builds `mantissa * 10^-scale`, e.g. `Amount::with_scale(1, 9)` is `1e-9`.
    pub fn with_scale(mantissa: i64, scale: u32) -> Self {
        Amount(Decimal::new(mantissa, scale))
    }

    /// Returns the underlying decimal.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Amount(self.0.abs())
    }

    /// Returns `true` if the magnitude is at most `epsilon`.
    pub fn is_negligible(&self, epsilon: Amount) -> bool {
        self.abs() <= epsilon
    }

    /// Divides the amount into `parts` equal shares.
    ///
    /// `parts` must be non-zero; callers check the payee count first.
    pub fn split(&self, parts: usize) -> Self {
        Amount(self.0 / Decimal::from(parts as u64))
    }

    /// Returns `self * (part / whole)`, or `None` on overflow or a zero
    /// `whole`. The ratio is taken first so `part <= whole` never overflows.
    pub fn checked_share(&self, part: Amount, whole: Amount) -> Option<Self> {
        let ratio = part.0.checked_div(whole.0)?;
        self.0.checked_mul(ratio).map(Amount)
    }

    pub fn checked_add(&self, rhs: Amount) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Sums `amounts`, returning `None` if the total overflows.
    pub fn checked_sum<'a, I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(*a))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed))?;
        Ok(Amount(decimal))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rounded = self.0.round_dp(Self::DISPLAY_SCALE);
        if rounded.is_zero() {
            rounded = Decimal::ZERO;
        }
        write!(f, "{:.2}", rounded)
    }
}

impl Add for Amount {
    type Output = Self;

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
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + *a)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_display_rounds_to_two_places() {
        assert_eq!(amt("1").to_string(), "1.00");
        assert_eq!(amt("1.005").to_string(), "1.00");
        assert_eq!(amt("2.675").to_string(), "2.68");
        assert_eq!(amt("  33.3333  ").to_string(), "33.33");
        assert_eq!(amt("-0.001").to_string(), "0.00");
    }

    #[test]
    fn test_parses_scientific_notation() {
        assert_eq!(amt("1e-9"), Amount::with_scale(1, 9));
    }

    #[test]
    fn test_split_keeps_precision() {
        let share = amt("100").split(3);
        let total = share + share + share;
        assert!((total - amt("100")).is_negligible(Amount::with_scale(1, 9)));
        assert_ne!(total, amt("99.99"));
    }

    #[test]
    fn test_checked_share() {
        let share = amt("90").checked_share(amt("1"), amt("3")).unwrap();
        assert!((share - amt("30")).is_negligible(Amount::with_scale(1, 9)));
        assert!(amt("90").checked_share(amt("1"), Amount::ZERO).is_none());
    }

    #[test]
    fn test_checked_share_large_weights() {
        let share = amt("1e15").checked_share(amt("1e14"), amt("2e14")).unwrap();
        assert_eq!(share, amt("500000000000000"));
    }

    #[test]
    fn test_checked_sum_overflow() {
        let big = amt("50000000000000000000000000000");
        assert_eq!(Amount::checked_sum(&[big]), Some(big));
        assert!(Amount::checked_sum(&[big, big]).is_none());
        assert!(big.checked_add(big).is_none());
    }

    #[test]
    fn test_sign_helpers() {
        assert!(amt("-0.5").is_negative());
        assert!(!Amount::ZERO.is_negative());
        assert_eq!(amt("-0.5").abs(), amt("0.5"));
        assert_eq!(-amt("2"), amt("-2"));
    }

    #[test]
    fn test_sum() {
        let values = vec![amt("1.5"), amt("2.5"), amt("-1")];
        let total: Amount = values.iter().sum();
        assert_eq!(total, amt("3"));
    }
}

//! Money type for prices and commissions
//!
//! Amounts are stored as whole cents in an `i64`, so sums over a portfolio
//! never drift the way floating-point totals do. Arithmetic saturates at the
//! `i64` bounds; `checked_add` reports the overflow instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A monetary amount in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use dealtrack::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// assert_eq!(amount.to_string(), "$10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole dollars
    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole dollars portion (truncated toward zero)
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Apply a fractional rate (e.g. `0.06` for a 6% commission), rounded to the cent
    pub fn apply_rate(&self, rate: f64) -> Self {
        Self((self.0 as f64 * rate).round() as i64)
    }

    /// Split into two shares that add back up exactly; the odd cent goes to the first share
    pub fn split_even(&self) -> (Self, Self) {
        let second = self.0 / 2;
        (Self(self.0 - second), Self(second))
    }

    /// Sum that reports overflow instead of clamping
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// As a floating-point number of dollars (for CSV export)
    pub fn as_dollars_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a money amount from a string
    ///
    /// Accepts "450000", "450000.00", "$450,000" and "-12.5".
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let raw = s.trim();

        let (negative, rest) = match raw.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let cleaned: String = rest.chars().filter(|c| *c != ',' && *c != '_').collect();

        let invalid = || MoneyParseError::InvalidFormat(raw.to_string());

        // One leading '-' at most; digits and a single '.' after it
        if cleaned.is_empty()
            || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.')
            || cleaned.matches('.').count() > 1
        {
            return Err(invalid());
        }

        let cents = match cleaned.split_once('.') {
            Some((whole, frac)) => {
                let dollars: i64 = if whole.is_empty() {
                    0
                } else {
                    whole.parse().map_err(|_| invalid())?
                };
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let frac_cents: i64 = match frac.len() {
                    0 => 0,
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    _ => frac[..2].parse().map_err(|_| invalid())?,
                };
                dollars
                    .checked_mul(100)
                    .and_then(|d| d.checked_add(frac_cents))
                    .ok_or_else(invalid)?
            }
            None => cleaned
                .parse::<i64>()
                .map_err(|_| invalid())?
                .checked_mul(100)
                .ok_or_else(invalid)?,
        };

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with a currency symbol and thousands separators
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            group_thousands(self.dollars().unsigned_abs()),
            self.cents_part()
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "$10.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(-1050)), "-$10.50");
        assert_eq!(format!("{}", Money::from_cents(5)), "$0.05");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("450000").unwrap(), Money::from_dollars(450_000));
        assert_eq!(Money::parse("$450,000").unwrap(), Money::from_dollars(450_000));
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-12.34").unwrap().cents(), -1234);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2x").is_err());
    }

    #[test]
    fn test_parse_rejects_extra_signs() {
        assert!(Money::parse("--450000").is_err());
        assert!(Money::parse("-+450000").is_err());
        assert!(Money::parse("+450000").is_err());
        assert!(Money::parse("$-450000").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert_eq!(Money::parse("-$450,000").unwrap(), Money::from_dollars(-450_000));
    }

    #[test]
    fn test_addition_near_bounds() {
        let huge = Money::from_cents(i64::MAX - 10);
        assert_eq!(huge + Money::from_cents(100), Money::from_cents(i64::MAX));
        assert_eq!(huge.checked_add(Money::from_cents(100)), None);
        assert_eq!(
            huge.checked_add(Money::from_cents(10)),
            Some(Money::from_cents(i64::MAX))
        );

        let total: Money = [huge, huge].into_iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(
            Money::from_dollars(1_250_000).format_with_symbol("$"),
            "$1,250,000.00"
        );
        assert_eq!(Money::from_cents(-99).format_with_symbol("€"), "-€0.99");
        assert_eq!(Money::from_dollars(999).format_with_symbol("$"), "$999.00");
    }

    #[test]
    fn test_apply_rate() {
        let price = Money::from_dollars(450_000);
        assert_eq!(price.apply_rate(0.03), Money::from_dollars(13_500));
        assert_eq!(Money::from_cents(333).apply_rate(0.5), Money::from_cents(167));
    }

    #[test]
    fn test_split_even() {
        let (a, b) = Money::from_cents(1001).split_even();
        assert_eq!(a.cents(), 501);
        assert_eq!(b.cents(), 500);
        assert_eq!(a + b, Money::from_cents(1001));
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}

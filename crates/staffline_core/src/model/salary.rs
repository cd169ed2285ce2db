//! Exact salary amounts.
//!
//! Salaries are kept as integer cents so that comparisons in storage and
//! in memory never suffer float rounding.

use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const CENTS_PER_UNIT: i64 = 100;

/// Non-negative salary with two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Salary {
    cents: i64,
}

/// Error returned when text cannot be read as a salary amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryParseError {
    input: String,
    expected: &'static str,
}

impl Display for SalaryParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid salary `{}`: expected {}", self.input, self.expected)
    }
}

impl Error for SalaryParseError {}

impl Salary {
    /// Builds a salary from whole currency units.
    ///
    /// Returns `None` for negative or overflowing values.
    pub fn from_units(units: i64) -> Option<Self> {
        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(Self::from_cents)
    }

    /// Builds a salary from cents. Returns `None` for negative values.
    pub fn from_cents(cents: i64) -> Option<Self> {
        (cents >= 0).then_some(Self { cents })
    }

    pub fn cents(self) -> i64 {
        self.cents
    }

    /// Amount in currency units, for presentation only.
    pub fn as_f64(self) -> f64 {
        self.cents as f64 / CENTS_PER_UNIT as f64
    }

    /// Reads any decimal number as the smallest salary at or above it.
    ///
    /// Extra fraction digits round up to the next cent and negative
    /// amounts become zero, so `cents >= floor` selects exactly the
    /// salaries `>= value`.
    pub fn floor_from_decimal(value: &str) -> Result<Self, SalaryParseError> {
        let err = || SalaryParseError {
            input: value.to_string(),
            expected: "a decimal number",
        };
        let trimmed = value.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (units_text, fraction_text) = digits.split_once('.').unwrap_or((digits, ""));
        let is_plain_decimal = !(units_text.is_empty() && fraction_text.is_empty())
            && units_text.bytes().all(|b| b.is_ascii_digit())
            && fraction_text.bytes().all(|b| b.is_ascii_digit());

        if !is_plain_decimal {
            // Exponent forms such as `6e4`.
            let amount: f64 = trimmed.parse().map_err(|_| err())?;
            if !amount.is_finite() {
                return Err(err());
            }
            let cents = (amount * CENTS_PER_UNIT as f64).ceil().max(0.0);
            return Self::from_cents(cents.min(i64::MAX as f64) as i64).ok_or_else(err);
        }

        let is_zero = units_text.bytes().chain(fraction_text.bytes()).all(|b| b == b'0');
        if negative || is_zero {
            return Ok(Self { cents: 0 });
        }

        let units: i64 = if units_text.is_empty() {
            0
        } else {
            units_text.parse().map_err(|_| err())?
        };
        let (cent_digits, rest) = fraction_text.split_at(fraction_text.len().min(2));
        let mut fraction: i64 = format!("{cent_digits:0<2}").parse().map_err(|_| err())?;
        if rest.bytes().any(|b| b != b'0') {
            fraction += 1;
        }

        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|cents| cents.checked_add(fraction))
            .and_then(Self::from_cents)
            .ok_or_else(err)
    }
}

impl FromStr for Salary {
    type Err = SalaryParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let err = || SalaryParseError {
            input: value.to_string(),
            expected: "a non-negative amount with at most two decimals",
        };
        let trimmed = value.trim();
        let (units_text, fraction_text) = match trimmed.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (trimmed, ""),
        };

        if units_text.is_empty() || !units_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if fraction_text.len() > 2 || !fraction_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if trimmed.ends_with('.') {
            return Err(err());
        }

        let units: i64 = units_text.parse().map_err(|_| err())?;
        let fraction: i64 = match fraction_text.len() {
            0 => 0,
            1 => fraction_text.parse::<i64>().map_err(|_| err())? * 10,
            _ => fraction_text.parse().map_err(|_| err())?,
        };

        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|cents| cents.checked_add(fraction))
            .and_then(Self::from_cents)
            .ok_or_else(err)
    }
}

impl Display for Salary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.cents / CENTS_PER_UNIT,
            self.cents % CENTS_PER_UNIT
        )
    }
}

impl Serialize for Salary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

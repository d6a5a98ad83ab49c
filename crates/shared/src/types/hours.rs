//! Duration type for reported working time.
//!
//! CRITICAL: Never use floating-point for hour accounting.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced when parsing or constructing an `Hours` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoursError {
    /// Input did not match the `HH:MM` shape.
    #[error("invalid duration {0:?}, expected HH:MM")]
    InvalidFormat(String),

    /// Minutes component was 60 or greater.
    #[error("minutes component {0} out of range")]
    MinutesOutOfRange(u32),

    /// A negative amount of hours is meaningless here.
    #[error("duration cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative amount of working time, measured in hours.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
/// Serializes as the `HH:MM` string employees report in ("01:30" = 1.5 hours).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(Decimal);

impl Hours {
    /// Zero hours.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parses an `HH:MM` duration string.
    ///
    /// The hour group may be one to three digits; the minute group must be
    /// exactly two digits and below 60.
    ///
    /// # Errors
    ///
    /// Returns `HoursError` if the input does not match the expected shape.
    pub fn parse(input: &str) -> Result<Self, HoursError> {
        let (hh, mm) = input
            .split_once(':')
            .ok_or_else(|| HoursError::InvalidFormat(input.to_string()))?;

        if hh.is_empty() || hh.len() > 3 || !hh.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HoursError::InvalidFormat(input.to_string()));
        }
        if mm.len() != 2 || !mm.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HoursError::InvalidFormat(input.to_string()));
        }

        let hours: u32 = hh
            .parse()
            .map_err(|_| HoursError::InvalidFormat(input.to_string()))?;
        let minutes: u32 = mm
            .parse()
            .map_err(|_| HoursError::InvalidFormat(input.to_string()))?;

        if minutes >= 60 {
            return Err(HoursError::MinutesOutOfRange(minutes));
        }

        Ok(Self(
            Decimal::from(hours) + Decimal::from(minutes) / Decimal::from(60),
        ))
    }

    /// Wraps a decimal number of hours.
    ///
    /// # Errors
    ///
    /// Returns `HoursError::Negative` if the value is below zero.
    pub fn from_decimal(value: Decimal) -> Result<Self, HoursError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(HoursError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Returns the decimal number of hours (e.g. 1.5 for "01:30").
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if this is zero hours.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtraction clamped at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Returns the smaller of the two durations.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// Total whole minutes, rounded to the nearest minute.
    #[must_use]
    pub fn total_minutes(&self) -> i64 {
        (self.0 * Decimal::from(60)).round().to_i64().unwrap_or(0)
    }
}

impl std::ops::Add for Hours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Hours {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::fmt::Display for Hours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.total_minutes();
        write!(f, "{:02}:{:02}", total / 60, total % 60)
    }
}

impl std::str::FromStr for Hours {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_basic() {
        assert_eq!(Hours::parse("01:30").unwrap().as_decimal(), dec!(1.5));
        assert_eq!(Hours::parse("00:00").unwrap(), Hours::ZERO);
        assert_eq!(Hours::parse("02:00").unwrap().as_decimal(), dec!(2));
        assert_eq!(Hours::parse("00:45").unwrap().as_decimal(), dec!(0.75));
    }

    #[test]
    fn test_parse_long_hours() {
        assert_eq!(Hours::parse("120:00").unwrap().as_decimal(), dec!(120));
        assert_eq!(Hours::parse("9:15").unwrap().as_decimal(), dec!(9.25));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Hours::parse("90 minutes"),
            Err(HoursError::InvalidFormat(_))
        ));
        assert!(matches!(Hours::parse(""), Err(HoursError::InvalidFormat(_))));
        assert!(matches!(
            Hours::parse("1:5"),
            Err(HoursError::InvalidFormat(_))
        ));
        assert!(matches!(
            Hours::parse("-1:30"),
            Err(HoursError::InvalidFormat(_))
        ));
        assert!(matches!(
            Hours::parse("01:99"),
            Err(HoursError::MinutesOutOfRange(99))
        ));
    }

    #[test]
    fn test_from_decimal_rejects_negative() {
        assert!(Hours::from_decimal(dec!(1.25)).is_ok());
        assert!(matches!(
            Hours::from_decimal(dec!(-0.5)),
            Err(HoursError::Negative(_))
        ));
    }

    #[rstest::rstest]
    #[case("00:00")]
    #[case("01:30")]
    #[case("02:00")]
    #[case("00:20")]
    #[case("11:45")]
    fn test_display_round_trip(#[case] input: &str) {
        assert_eq!(Hours::parse(input).unwrap().to_string(), input);
    }

    #[test]
    fn test_display_rounds_to_nearest_minute() {
        // One third of an hour has no exact decimal form; formatting rounds.
        let third = Hours::from_decimal(Decimal::from(1) / Decimal::from(3)).unwrap();
        assert_eq!(third.to_string(), "00:20");
    }

    #[test]
    fn test_saturating_sub() {
        let two = Hours::parse("02:00").unwrap();
        let half = Hours::parse("00:30").unwrap();
        assert_eq!(two.saturating_sub(half).to_string(), "01:30");
        assert_eq!(half.saturating_sub(two), Hours::ZERO);
        assert_eq!(two.saturating_sub(two), Hours::ZERO);
    }

    #[test]
    fn test_add() {
        let a = Hours::parse("01:45").unwrap();
        let b = Hours::parse("00:30").unwrap();
        assert_eq!((a + b).to_string(), "02:15");
    }

    #[test]
    fn test_ordering() {
        assert!(Hours::parse("01:00").unwrap() < Hours::parse("01:01").unwrap());
        assert_eq!(
            Hours::parse("01:30").unwrap().min(Hours::parse("02:00").unwrap()),
            Hours::parse("01:30").unwrap()
        );
    }

    #[test]
    fn test_serde_as_string() {
        let hours = Hours::parse("03:15").unwrap();
        let json = serde_json::to_string(&hours).unwrap();
        assert_eq!(json, "\"03:15\"");

        let back: Hours = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hours);

        assert!(serde_json::from_str::<Hours>("\"bogus\"").is_err());
    }
}

//! Business day identifier used by the settlement status query.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};

use crate::error::InvalidSettlementDay;

/// A month/day pair rendered as `MMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettlementDay {
    month: u32,
    day: u32,
}

impl SettlementDay {
    /// Creates a day, rejecting month/day pairs no calendar has.
    ///
    /// February 29th is accepted.
    pub fn new(month: u32, day: u32) -> Result<Self, InvalidSettlementDay> {
        // 2000 is a leap year, so 0229 validates.
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(InvalidSettlementDay(format!("{:02}{:02}", month, day)));
        }
        Ok(Self { month, day })
    }

    /// The current local day.
    pub fn today() -> Self {
        Local::now().date_naive().into()
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl From<NaiveDate> for SettlementDay {
    fn from(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl FromStr for SettlementDay {
    type Err = InvalidSettlementDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidSettlementDay(s.to_string()));
        }
        let month = s[..2]
            .parse()
            .map_err(|_| InvalidSettlementDay(s.to_string()))?;
        let day = s[2..]
            .parse()
            .map_err(|_| InvalidSettlementDay(s.to_string()))?;
        Self::new(month, day)
    }
}

impl fmt::Display for SettlementDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let day: SettlementDay = "0704".parse().unwrap();
        assert_eq!(day.month(), 7);
        assert_eq!(day.day(), 4);
        assert_eq!(day.to_string(), "0704");
    }

    #[test]
    fn test_leap_day_accepted() {
        assert!("0229".parse::<SettlementDay>().is_ok());
    }

    #[test]
    fn test_invalid_days_rejected() {
        for bad in ["1301", "0230", "0000", "704", "07-4", "abcd", "07041"] {
            assert!(bad.parse::<SettlementDay>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn test_from_naive_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(SettlementDay::from(date).to_string(), "0109");
    }
}

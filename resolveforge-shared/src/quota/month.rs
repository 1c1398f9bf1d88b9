/// Calendar month keys
///
/// Usage is bucketed by UTC calendar month, written as `YYYY-MM`. The key is
/// always derived from a UTC instant, never from the server's local zone.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A UTC calendar month, displayed and stored as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

/// Error parsing a month key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month key '{0}', expected YYYY-MM")]
pub struct MonthKeyError(pub String);

impl MonthKey {
    /// Builds a key from a year and a 1-based month
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `instant`
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    /// The current UTC month
    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Human-readable label, e.g. `November 2025`
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthKeyError(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_month_boundary_in_utc() {
        let last_second = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        assert_eq!(MonthKey::from_datetime(last_second).to_string(), "2025-03");

        let next = last_second + Duration::seconds(1);
        assert_eq!(MonthKey::from_datetime(next).to_string(), "2025-04");
    }

    #[test]
    fn test_year_boundary() {
        let new_year = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(MonthKey::from_datetime(new_year).to_string(), "2026-01");
        assert_eq!(
            MonthKey::from_datetime(new_year - Duration::seconds(1)).to_string(),
            "2025-12"
        );
    }

    #[test]
    fn test_parse_valid() {
        let key: MonthKey = "2025-11".parse().unwrap();
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 11);
        assert_eq!(key.to_string(), "2025-11");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["2025-13", "2025-00", "2025-1", "25-11", "2025/11", "2025-11-01", "abcd-ef", ""] {
            assert!(input.parse::<MonthKey>().is_err(), "'{}' should be rejected", input);
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(MonthKey::new(2025, 11).unwrap().label(), "November 2025");
        assert_eq!(MonthKey::new(2026, 1).unwrap().label(), "January 2026");
    }

    #[test]
    fn test_serde_as_string() {
        let key = MonthKey::new(2025, 3).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-03\"");

        let back: MonthKey = serde_json::from_str("\"2025-03\"").unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<MonthKey>("\"2025-3\"").is_err());
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let dec = MonthKey::new(2025, 12).unwrap();
        let jan = MonthKey::new(2026, 1).unwrap();
        assert!(dec < jan);
    }
}

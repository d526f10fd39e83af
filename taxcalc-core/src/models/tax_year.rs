use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

static TAX_YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("tax year pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxYearParseError {
    #[error("tax year '{0}' is not in YYYY-YY form")]
    Format(String),

    #[error("tax year '{0}' does not span consecutive years")]
    NotConsecutive(String),
}

/// A UK fiscal year, 6 April to 5 April, keyed as `"YYYY-YY"`.
///
/// Stored as the calendar year in which the tax year starts, so
/// `TaxYear::new(2024)` is `"2024-25"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(i32);

impl TaxYear {
    pub const fn new(start_year: i32) -> Self {
        Self(start_year)
    }

    pub const fn start_year(&self) -> i32 {
        self.0
    }

    /// The tax year that contains `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        if (date.month(), date.day()) >= (4, 6) {
            TaxYear(year)
        } else {
            TaxYear(year - 1)
        }
    }

    /// 6 April of the start year.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 4, 6).unwrap_or(NaiveDate::MIN)
    }

    /// 5 April of the following year.
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 + 1, 4, 5).unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        TaxYear(self.0 + 1)
    }

    pub fn previous(&self) -> Self {
        TaxYear(self.0 - 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl FromStr for TaxYear {
    type Err = TaxYearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = TAX_YEAR_PATTERN
            .captures(s.trim())
            .ok_or_else(|| TaxYearParseError::Format(s.to_string()))?;

        let start: i32 = captures[1]
            .parse()
            .map_err(|_| TaxYearParseError::Format(s.to_string()))?;
        let end: i32 = captures[2]
            .parse()
            .map_err(|_| TaxYearParseError::Format(s.to_string()))?;

        if (start + 1).rem_euclid(100) != end {
            return Err(TaxYearParseError::NotConsecutive(s.to_string()));
        }

        Ok(TaxYear(start))
    }
}

impl Serialize for TaxYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaxYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date '{input}', expected YYYY-MM-DD")]
pub struct InvalidDateError {
    pub input: String,
}

/// A day-granularity date. Time of day and offsets never reach this type.
///
/// Deserializes from any form [`normalize`] accepts and serializes as
/// `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    pub fn days_before(self, days: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    pub fn days_after(self, days: u64) -> Self {
        Self(self.0.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX))
    }

    pub fn to_api_string(&self) -> String {
        self.0.format(API_FORMAT).to_string()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(API_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = InvalidDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = InvalidDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(value: CalendarDate) -> Self {
        value.to_api_string()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl From<NaiveDateTime> for CalendarDate {
    fn from(value: NaiveDateTime) -> Self {
        Self(value.date())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CalendarDate {
    fn from(value: DateTime<Tz>) -> Self {
        Self(value.naive_local().date())
    }
}

/// Parses any accepted date representation down to its calendar day.
///
/// Timestamps keep the date as written: `2024-01-05T23:30:00-05:00` is
/// `2024-01-05`, not the UTC day.
pub fn normalize(value: &str) -> Result<CalendarDate, InvalidDateError> {
    let trimmed = value.trim();
    let invalid = || InvalidDateError {
        input: value.to_string(),
    };
    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.into());
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.into());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(d.into());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.into());
        }
    }
    Err(invalid())
}

/// Inclusive on both ends. An inverted range contains nothing.
pub fn in_range(value: CalendarDate, range: &DateRange) -> bool {
    range.start <= value && value <= range.end
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, InvalidDateError> {
        Ok(Self::new(normalize(start)?, normalize(end)?))
    }

    /// `today - days ..= today`.
    pub fn trailing_days(today: CalendarDate, days: u64) -> Self {
        Self::new(today.days_before(days), today)
    }

    pub fn contains(&self, value: CalendarDate) -> bool {
        in_range(value, self)
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn to_params(&self) -> DateRangeParams {
        DateRangeParams {
            start_date: self.start.to_api_string(),
            end_date: self.end.to_api_string(),
        }
    }
}

/// Wire shape handed to a data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeParams {
    pub start_date: String,
    pub end_date: String,
}

impl DateRangeParams {
    pub fn range(&self) -> Result<DateRange, InvalidDateError> {
        DateRange::parse(&self.start_date, &self.end_date)
    }
}

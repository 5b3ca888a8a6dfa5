//! # Train/Test Date Ranges
//!
//! A [`DateRange`] is an inclusive calendar interval. Train and test windows
//! are evaluated independently against the time axis, so they may overlap or
//! leave gaps; nothing here enforces a partition.
//!
//! Ranges are written `YYYY-MM-DD..YYYY-MM-DD` everywhere they appear as text
//! (command line, environment variables, configuration files).
//!
//! ```rust
//! use eof_hindcast::split::DateRange;
//!
//! let train: DateRange = "1980-01-01..2010-12-31".parse()?;
//! assert_eq!(train.to_string(), "1980-01-01..2010-12-31");
//! # Ok::<(), eof_hindcast::error::HindcastError>(())
//! ```

use crate::error::{HindcastError, HindcastResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const SEPARATOR: &str = "..";

/// Inclusive calendar date interval `start ≤ t ≤ end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> HindcastResult<Self> {
        if start > end {
            return Err(HindcastError::invalid(
                "date range",
                format!("{}{}{}", start, SEPARATOR, end),
                "start date must not be after end date",
            ));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from `(year, month, day)` triples.
    pub fn from_ymd(start: (i32, u32, u32), end: (i32, u32, u32)) -> HindcastResult<Self> {
        let start = ymd(start)?;
        let end = ymd(end)?;
        Self::new(start, end)
    }

    pub(crate) const fn fixed(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Membership mask over a time axis, one entry per time step.
    pub fn mask(&self, times: &[NaiveDate]) -> Vec<bool> {
        times.iter().map(|t| self.contains(*t)).collect()
    }

    /// Indices of the time steps inside the range, in axis order.
    pub fn indices(&self, times: &[NaiveDate]) -> Vec<usize> {
        times
            .iter()
            .enumerate()
            .filter(|(_, t)| self.contains(**t))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Calendar date known at compile time
pub(crate) const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid built-in date"),
    }
}

fn ymd((year, month, day): (i32, u32, u32)) -> HindcastResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| HindcastError::DateParse {
        input: format!("{:04}-{:02}-{:02}", year, month, day),
        reason: "no such calendar date".to_string(),
    })
}

/// Parses a single `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> HindcastResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| HindcastError::DateParse {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

impl FromStr for DateRange {
    type Err = HindcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once(SEPARATOR).ok_or_else(|| {
            HindcastError::invalid(
                "date range",
                s,
                "must be in format 'YYYY-MM-DD..YYYY-MM-DD'",
            )
        })?;
        DateRange::new(parse_date(start)?, parse_date(end)?)
    }
}

impl TryFrom<String> for DateRange {
    type Error = HindcastError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateRange> for String {
    fn from(range: DateRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.start.format(DATE_FORMAT),
            SEPARATOR,
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Value parser for clap arguments and environment variables
pub fn parse_date_range(s: &str) -> Result<DateRange, String> {
    s.parse::<DateRange>().map_err(|e| e.to_string())
}

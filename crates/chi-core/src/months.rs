use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

use crate::schema::HAPPINESS_INDEX_INT;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const REPORT_PREFIX: &str = "CHI";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    #[error("month {0} is outside 1..=12")]
    OutOfRange(u32),
    #[error("unrecognized month '{0}' (expected e.g. Oct22, Oct-22 or 2022-10)")]
    Unrecognized(String),
    #[error("window start {start} is after end {end}")]
    InvertedWindow { start: ReportMonth, end: ReportMonth },
}

/// A calendar month in the reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(MonthError::OutOfRange(month))
        }
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn abbreviation(&self) -> &'static str {
        MONTH_ABBREVIATIONS[(self.month - 1) as usize]
    }

    fn short_year(&self) -> i32 {
        self.year.rem_euclid(100)
    }

    /// `Mar-23`: the value stored in the derived `Month` column.
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.abbreviation(), self.short_year())
    }

    /// `Mar23`: the suffix used in wide-table and report column names.
    pub fn suffix(&self) -> String {
        format!("{}{:02}", self.abbreviation(), self.short_year())
    }

    pub fn source_column(&self) -> String {
        format!("{HAPPINESS_INDEX_INT}_{}", self.suffix())
    }

    pub fn report_column(&self) -> String {
        format!("{REPORT_PREFIX}_{}", self.suffix())
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix())
    }
}

impl FromStr for ReportMonth {
    type Err = MonthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let unrecognized = || MonthError::Unrecognized(value.to_string());

        // 2022-10
        if let Some((year, month)) = trimmed.split_once('-') {
            if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
                let year: i32 = year.parse().map_err(|_| unrecognized())?;
                let month: u32 = month.parse().map_err(|_| unrecognized())?;
                return Self::new(year, month);
            }
        }

        // Oct22, Oct-22, oct 2022
        let name_len = trimmed
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (name, rest) = trimmed.split_at(name_len);
        let month = MONTH_ABBREVIATIONS
            .iter()
            .position(|abbr| name.len() >= 3 && abbr.eq_ignore_ascii_case(&name[..3]))
            .ok_or_else(unrecognized)? as u32
            + 1;
        let digits = rest.trim_start_matches(|c| matches!(c, '-' | ' ' | '_'));
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(unrecognized());
        }
        let year: i32 = match digits.len() {
            2 => 2000 + digits.parse::<i32>().map_err(|_| unrecognized())?,
            4 => digits.parse().map_err(|_| unrecognized())?,
            _ => return Err(unrecognized()),
        };
        Self::new(year, month)
    }
}

impl<'de> Deserialize<'de> for ReportMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// An inclusive range of report months, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    start: ReportMonth,
    end: ReportMonth,
}

impl MonthWindow {
    pub fn new(start: ReportMonth, end: ReportMonth) -> Result<Self, MonthError> {
        if start > end {
            return Err(MonthError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> ReportMonth {
        self.start
    }

    /// The most recent month; its scores may sit in the unsuffixed column.
    pub fn end(&self) -> ReportMonth {
        self.end
    }

    pub fn months(&self) -> Vec<ReportMonth> {
        let mut months = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            months.push(current);
            current = current.succ();
        }
        months
    }

    pub fn contains(&self, month: ReportMonth) -> bool {
        self.start <= month && month <= self.end
    }
}

impl Default for MonthWindow {
    /// October 2022 through December 2023.
    fn default() -> Self {
        Self {
            start: ReportMonth {
                year: 2022,
                month: 10,
            },
            end: ReportMonth {
                year: 2023,
                month: 12,
            },
        }
    }
}

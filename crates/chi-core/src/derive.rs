use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;

use crate::months::ReportMonth;
use crate::schema::{
    is_missing, BILLING_ACCT_ID, CRDDTM, EXCHANGE, HAPPINESS_INDEX, HAPPINESS_INDEX_INT, MDN,
    MONTH, REGION, ZONE_NAME,
};

/// Formats tried, in order, when `CRDDTM` is parsed. Each is tried as a
/// date-time first and then as a bare date.
pub const DEFAULT_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y",
    "%d-%b-%y %I.%M.%S%.f %p",
    "%d-%b-%y %H:%M:%S",
    "%d-%b-%y",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y",
];

/// Working columns kept after derivation.
pub const EVENT_COLUMNS: [&str; 7] = [
    MDN,
    BILLING_ACCT_ID,
    ZONE_NAME,
    REGION,
    EXCHANGE,
    MONTH,
    HAPPINESS_INDEX_INT,
];

#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("row {row}: {column} is missing")]
    MissingValue { row: usize, column: &'static str },
    #[error("row {row}: unparseable timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("row {row}: unparseable happiness score '{value}'")]
    InvalidScore { row: usize, value: String },
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone)]
pub struct DeriveOptions {
    pub timestamp_formats: Vec<String>,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            timestamp_formats: DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|fmt| fmt.to_string())
                .collect(),
        }
    }
}

pub fn parse_timestamp<S: AsRef<str>>(value: &str, formats: &[S]) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    for fmt in formats {
        let fmt = fmt.as_ref();
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_local())
}

/// `Mar-23` for any timestamp in March 2023.
pub fn month_label(timestamp: &NaiveDateTime) -> String {
    ReportMonth::from_date(timestamp).label()
}

/// Integer part of a textual score: the segment before the first `.`.
///
/// This truncates toward zero (`7.9 -> 7`, `-7.9 -> -7`). Numeric text with no
/// integer segment (`.5`, `7e1`) falls back to float parsing and truncation.
pub fn truncate_score(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let left = trimmed.split('.').next().unwrap_or_default();
    if let Ok(parsed) = left.parse::<i64>() {
        return Some(parsed);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .map(|parsed| parsed.trunc() as i64)
}

/// Adds `Month` and `HAPPINESS_INDEX_INT`, retypes `CRDDTM` as a datetime and
/// trims `MDN`. Any row that cannot be converted fails the whole frame.
pub fn derive_columns(df: &DataFrame, options: &DeriveOptions) -> Result<DataFrame, DeriveError> {
    let len = df.height();
    let timestamps = df.column(CRDDTM)?.str()?;
    let subscribers = df.column(MDN)?.str()?;
    let scores = df.column(HAPPINESS_INDEX)?.str()?;

    let mut timestamp_micros = Vec::with_capacity(len);
    let mut months = Vec::with_capacity(len);
    let mut mdns = Vec::with_capacity(len);
    let mut score_ints = Vec::with_capacity(len);

    for idx in 0..len {
        let row = idx + 1;

        let raw_ts = present(timestamps.get(idx)).ok_or(DeriveError::MissingValue {
            row,
            column: CRDDTM,
        })?;
        let ts = parse_timestamp(raw_ts, &options.timestamp_formats).ok_or_else(|| {
            DeriveError::InvalidTimestamp {
                row,
                value: raw_ts.to_string(),
            }
        })?;
        timestamp_micros.push(ts.and_utc().timestamp_micros());
        months.push(month_label(&ts));

        let mdn = present(subscribers.get(idx)).ok_or(DeriveError::MissingValue {
            row,
            column: MDN,
        })?;
        mdns.push(mdn.trim().to_string());

        let raw_score = present(scores.get(idx)).ok_or(DeriveError::MissingValue {
            row,
            column: HAPPINESS_INDEX,
        })?;
        let score = truncate_score(raw_score).ok_or_else(|| DeriveError::InvalidScore {
            row,
            value: raw_score.to_string(),
        })?;
        score_ints.push(score);
    }

    let ts_series = Series::new(CRDDTM.into(), timestamp_micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let mut derived = df.clone();
    derived.with_column(ts_series)?;
    derived.with_column(Series::new(MDN.into(), mdns))?;
    derived.with_column(Series::new(MONTH.into(), months))?;
    derived.with_column(Series::new(HAPPINESS_INDEX_INT.into(), score_ints))?;
    Ok(derived)
}

/// Projects a derived frame onto [`EVENT_COLUMNS`].
pub fn event_columns(derived: &DataFrame) -> PolarsResult<DataFrame> {
    derived.select(EVENT_COLUMNS)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_missing(v))
}

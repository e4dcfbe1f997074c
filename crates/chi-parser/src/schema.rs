//! Column names shared by the input file, the wide table and the report.

pub const MDN: &str = "MDN";
pub const BILLING_ACCT_ID: &str = "BILLING_ACCT_ID";
pub const ZONE_NAME: &str = "ZONE_NAME";
pub const REGION: &str = "REGION";
pub const EXCHANGE: &str = "EXCHANGE";
pub const CRDDTM: &str = "CRDDTM";
pub const HAPPINESS_INDEX: &str = "HAPPINESS_INDEX";

pub const MONTH: &str = "Month";
pub const HAPPINESS_INDEX_INT: &str = "HAPPINESS_INDEX_INT";

/// Columns every event file must carry.
pub const REQUIRED_EVENT_COLUMNS: [&str; 7] = [
    CRDDTM,
    MDN,
    HAPPINESS_INDEX,
    BILLING_ACCT_ID,
    ZONE_NAME,
    REGION,
    EXCHANGE,
];

/// Per-subscriber attributes carried from the events into the report.
pub const CLASSIFICATION_COLUMNS: [&str; 4] = [BILLING_ACCT_ID, ZONE_NAME, REGION, EXCHANGE];

/// Field values read as missing, matching the usual dataframe NA markers.
const MISSING_MARKERS: &[&str] = &[
    "", "nan", "NaN", "NAN", "NA", "N/A", "n/a", "#N/A", "NULL", "null", "None", "<NA>",
];

pub fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value.trim())
}

/// Returns the entries of `required` that are absent from `headers`, in order.
pub fn missing_columns<S: AsRef<str>>(headers: &[String], required: &[S]) -> Vec<String> {
    required
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !headers.iter().any(|header| header == name))
        .map(str::to_string)
        .collect()
}

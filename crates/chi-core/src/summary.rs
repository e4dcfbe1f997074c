use polars::prelude::*;

use crate::schema::{CLASSIFICATION_COLUMNS, MDN};

/// One row per distinct `MDN`, in first-seen order, carrying the first
/// non-null value of each classification column.
///
/// If a subscriber's attributes change between rows the earliest row wins.
pub fn summarize_subscribers(events: &DataFrame) -> PolarsResult<DataFrame> {
    let aggregations: Vec<Expr> = CLASSIFICATION_COLUMNS
        .iter()
        .map(|name| col(*name).drop_nulls().first())
        .collect();

    events
        .clone()
        .lazy()
        .group_by_stable([col(MDN)])
        .agg(aggregations)
        .collect()
}

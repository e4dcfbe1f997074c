use chi_core::merge::{merge_classification, MergeError};
use chi_core::months::{MonthWindow, ReportMonth};
use chi_core::report::{build_report, month_columns, report_columns, ReportError};
use polars::prelude::*;

fn summary() -> DataFrame {
    df![
        "MDN" => ["A", "B"],
        "BILLING_ACCT_ID" => ["BA-A", "BA-B"],
        "ZONE_NAME" => ["North", "South"],
        "REGION" => ["R1", "R2"],
        "EXCHANGE" => ["EX1", "EX2"],
    ]
    .expect("df")
}

fn window(start: (i32, u32), end: (i32, u32)) -> MonthWindow {
    MonthWindow::new(
        ReportMonth::new(start.0, start.1).unwrap(),
        ReportMonth::new(end.0, end.1).unwrap(),
    )
    .unwrap()
}

#[test]
fn left_join_keeps_every_wide_row_in_order() -> PolarsResult<()> {
    let wide = df![
        "MDN" => ["Z", "B", "A", "Y"],
        "HAPPINESS_INDEX_INT_Oct22" => [Some(1i64), Some(2), None, Some(4)],
    ]?;

    let outcome = merge_classification(&wide, &summary()).expect("merge");
    assert_eq!(outcome.merged.height(), 4);
    assert_eq!(outcome.matched, 2);
    assert_eq!(outcome.unmatched, 2);

    let mdn: Vec<Option<&str>> = outcome.merged.column("MDN")?.str()?.into_iter().collect();
    assert_eq!(mdn, [Some("Z"), Some("B"), Some("A"), Some("Y")]);

    let zones: Vec<Option<&str>> = outcome
        .merged
        .column("ZONE_NAME")?
        .str()?
        .into_iter()
        .collect();
    assert_eq!(zones, [None, Some("South"), Some("North"), None]);

    let scores = outcome.merged.column("HAPPINESS_INDEX_INT_Oct22")?.i64()?;
    assert_eq!(scores.get(2), None);
    assert_eq!(scores.get(3), Some(4));
    Ok(())
}

#[test]
fn merge_rejects_missing_key_and_conflicting_columns() {
    let no_key = df!["PHONE" => ["A"]].unwrap();
    assert!(matches!(
        merge_classification(&no_key, &summary()),
        Err(MergeError::MissingKey { table: "wide" })
    ));

    let conflicting = df!["MDN" => ["A"], "REGION" => ["R9"]].unwrap();
    assert!(matches!(
        merge_classification(&conflicting, &summary()),
        Err(MergeError::ConflictingColumn(name)) if name == "REGION"
    ));
}

#[test]
fn latest_month_falls_back_to_unsuffixed_column() {
    let merged = df![
        "MDN" => ["A"],
        "HAPPINESS_INDEX_INT_Nov23" => [5i64],
        "HAPPINESS_INDEX_INT" => [6i64],
    ]
    .unwrap();

    let mappings = month_columns(&merged, &window((2023, 11), (2023, 12))).unwrap();
    assert_eq!(mappings[0].source, "HAPPINESS_INDEX_INT_Nov23");
    assert_eq!(mappings[0].target, "CHI_Nov23");
    assert_eq!(mappings[1].source, "HAPPINESS_INDEX_INT");
    assert_eq!(mappings[1].target, "CHI_Dec23");

    // The bare column only stands in for the latest month.
    let err = month_columns(&merged, &window((2023, 10), (2023, 12))).unwrap_err();
    assert!(matches!(err, ReportError::MissingMonth { expected, .. } if expected == "HAPPINESS_INDEX_INT_Oct23"));
}

#[test]
fn report_selects_and_renames_in_fixed_order() -> PolarsResult<()> {
    let window = window((2022, 10), (2023, 11));
    let mut wide_columns: Vec<Column> = vec![Series::new("MDN".into(), ["A", "Q"]).into()];
    for month in window.months().iter().rev() {
        wide_columns.push(Series::new(month.source_column().into(), [Some(7i64), None]).into());
    }
    wide_columns.push(Series::new("EXTRA".into(), ["x", "y"]).into());
    let wide = DataFrame::new(wide_columns)?;

    let merged = merge_classification(&wide, &summary()).expect("merge").merged;
    let report = build_report(&merged, &window).expect("report");

    assert_eq!(report.width(), 19);
    assert_eq!(report.get_column_names_str(), report_columns(&window));
    assert_eq!(report.get_column_names_str()[1], "CHI_Oct22");
    assert_eq!(report.get_column_names_str()[14], "CHI_Nov23");
    assert!(report.get_column_index("EXTRA").is_none());

    assert_eq!(report.column("CHI_Mar23")?.i64()?.get(0), Some(7));
    assert_eq!(report.column("BILLING_ACCT_ID")?.str()?.get(0), Some("BA-A"));
    assert_eq!(report.column("BILLING_ACCT_ID")?.str()?.get(1), None);
    Ok(())
}

#[test]
fn default_window_report_has_twenty_columns() {
    let columns = report_columns(&MonthWindow::default());
    assert_eq!(columns.len(), 20);
    assert_eq!(columns[15], "CHI_Dec23");
    assert!(columns[1..16].iter().all(|name| name.starts_with("CHI_")));
}

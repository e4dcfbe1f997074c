use chi_core::summary::summarize_subscribers;
use polars::prelude::*;

fn events() -> DataFrame {
    df![
        "MDN" => ["A", "B", "A", "C", "B"],
        "BILLING_ACCT_ID" => [Some("BA-A1"), None, Some("BA-A2"), Some("BA-C"), Some("BA-B")],
        "ZONE_NAME" => ["North", "South", "East", "West", "South"],
        "REGION" => ["R1", "R2", "R1", "R3", "R2"],
        "EXCHANGE" => ["EX1", "EX2", "EX1", "EX3", "EX2"],
        "Month" => ["Oct-22", "Oct-22", "Nov-22", "Nov-22", "Nov-22"],
        "HAPPINESS_INDEX_INT" => [7i64, 5, 8, 6, 4],
    ]
    .expect("df")
}

#[test]
fn one_row_per_distinct_subscriber() -> PolarsResult<()> {
    let summary = summarize_subscribers(&events())?;

    assert_eq!(summary.height(), 3);
    assert_eq!(
        summary.get_column_names_str(),
        ["MDN", "BILLING_ACCT_ID", "ZONE_NAME", "REGION", "EXCHANGE"]
    );

    let mdn: Vec<Option<&str>> = summary.column("MDN")?.str()?.into_iter().collect();
    assert_eq!(mdn, [Some("A"), Some("B"), Some("C")]);
    Ok(())
}

#[test]
fn first_seen_attributes_win() -> PolarsResult<()> {
    let summary = summarize_subscribers(&events())?;

    let zones = summary.column("ZONE_NAME")?.str()?;
    assert_eq!(zones.get(0), Some("North"));

    // B's first row has no billing account; the first non-null one is used.
    let accounts = summary.column("BILLING_ACCT_ID")?.str()?;
    assert_eq!(accounts.get(0), Some("BA-A1"));
    assert_eq!(accounts.get(1), Some("BA-B"));
    assert_eq!(accounts.get(2), Some("BA-C"));
    Ok(())
}

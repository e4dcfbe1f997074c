use chrono::NaiveDate;

use chi_core::months::{MonthError, MonthWindow, ReportMonth};

#[test]
fn labels_match_derived_month_format() {
    let month = ReportMonth::new(2023, 3).unwrap();
    assert_eq!(month.label(), "Mar-23");
    assert_eq!(month.suffix(), "Mar23");
    assert_eq!(month.source_column(), "HAPPINESS_INDEX_INT_Mar23");
    assert_eq!(month.report_column(), "CHI_Mar23");

    let date = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();
    assert_eq!(
        ReportMonth::from_date(&date).label(),
        date.format("%b-%y").to_string()
    );
}

#[test]
fn parses_common_month_spellings() {
    let oct22 = ReportMonth::new(2022, 10).unwrap();
    for text in ["Oct22", "Oct-22", "oct 2022", "OCTOBER-2022", "2022-10"] {
        assert_eq!(text.parse::<ReportMonth>(), Ok(oct22), "{text}");
    }

    assert!(matches!(
        "Foo22".parse::<ReportMonth>(),
        Err(MonthError::Unrecognized(_))
    ));
    assert!(matches!(
        "2022-13".parse::<ReportMonth>(),
        Err(MonthError::OutOfRange(13))
    ));
    assert!("Oct".parse::<ReportMonth>().is_err());
}

#[test]
fn default_window_spans_october_2022_to_december_2023() {
    let window = MonthWindow::default();
    let months = window.months();

    assert_eq!(months.len(), 15);
    assert_eq!(months.first().unwrap().suffix(), "Oct22");
    assert_eq!(months.last().unwrap().suffix(), "Dec23");
    assert!(months.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(window.contains(ReportMonth::new(2023, 1).unwrap()));
    assert!(!window.contains(ReportMonth::new(2024, 1).unwrap()));
}

#[test]
fn window_crosses_year_boundaries_and_rejects_inversion() {
    let start = ReportMonth::new(2023, 11).unwrap();
    let end = ReportMonth::new(2024, 2).unwrap();
    let suffixes: Vec<String> = MonthWindow::new(start, end)
        .unwrap()
        .months()
        .iter()
        .map(ReportMonth::suffix)
        .collect();
    assert_eq!(suffixes, ["Nov23", "Dec23", "Jan24", "Feb24"]);

    assert!(matches!(
        MonthWindow::new(end, start),
        Err(MonthError::InvertedWindow { .. })
    ));
}

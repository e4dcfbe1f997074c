use chi_core::export::{write_table_to, ExportError};
use polars::prelude::*;

#[test]
fn writes_header_without_index_and_blank_nulls() -> PolarsResult<()> {
    let df = df![
        "MDN" => ["A", "B"],
        "CHI_Oct22" => [Some(7i64), None],
        "REGION" => [None, Some("R2")],
    ]?;

    let mut buffer = Vec::new();
    write_table_to(&df, &mut buffer, '\t').expect("write");
    let text = String::from_utf8(buffer).unwrap();

    assert_eq!(text, "MDN\tCHI_Oct22\tREGION\nA\t7\t\nB\t\tR2\n");
    Ok(())
}

#[test]
fn rejects_non_ascii_delimiter() {
    let df = df!["MDN" => ["A"]].unwrap();
    let mut buffer = Vec::new();
    assert!(matches!(
        write_table_to(&df, &mut buffer, '§'),
        Err(ExportError::InvalidDelimiter('§'))
    ));
}

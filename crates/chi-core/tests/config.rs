use std::path::Path;

use chi_core::config::{ConfigError, PipelineConfig};
use chi_core::months::MonthWindow;

#[test]
fn defaults_describe_the_original_export() {
    let config = PipelineConfig::default();
    assert_eq!(config.input.delimiter, '\t');
    assert_eq!(config.input.encoding, "utf-16");
    assert_eq!(config.input.skip_rows, 0);
    assert_eq!(config.output.delimiter, '\t');
    assert_eq!(config.window().unwrap(), MonthWindow::default());
    assert!(matches!(
        config.input_path(),
        Err(ConfigError::Missing("input.path"))
    ));

    let options = config.input_options();
    assert_eq!(options.required_columns.len(), 7);
    assert!(!config.derive_options().timestamp_formats.is_empty());
}

#[test]
fn parses_toml_with_partial_sections() {
    let config = PipelineConfig::from_toml_str(
        r#"
            timestamp_formats = ["%d.%m.%Y %H:%M"]

            [input]
            path = "data/chi_events.txt"
            skip_rows = 2

            [output]
            path = "out/chi_report.txt"
            delimiter = ","

            [window]
            start = "Jan-23"
            end = "2023-06"
        "#,
    )
    .expect("config parses");

    assert_eq!(config.input_path().unwrap(), Path::new("data/chi_events.txt"));
    assert_eq!(config.input.skip_rows, 2);
    assert_eq!(config.input.encoding, "utf-16");
    assert_eq!(config.output.delimiter, ',');
    assert!(config.wide_table.path.is_none());
    assert_eq!(config.window().unwrap().months().len(), 6);
    assert_eq!(
        config.derive_options().timestamp_formats,
        ["%d.%m.%Y %H:%M"]
    );
}

#[test]
fn rejects_bad_months_and_inverted_windows() {
    let err = PipelineConfig::from_toml_str("[window]\nstart = \"Smarch22\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));

    let config =
        PipelineConfig::from_toml_str("[window]\nstart = \"Dec23\"\nend = \"Oct22\"\n").unwrap();
    assert!(matches!(config.window(), Err(ConfigError::Window(_))));
}

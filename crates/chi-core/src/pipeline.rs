use std::fmt;
use std::path::{Path, PathBuf};

use chi_parser::load_delimited;
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::derive::derive_columns;
use crate::error::Result;
use crate::export::write_table;
use crate::merge::merge_classification;
use crate::report::build_report;
use crate::summary::summarize_subscribers;
use crate::wide_table::{load_wide_table, pivot_events, PivotOutcome};

/// Counts gathered over one run, logged at the end and printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub input_rows: usize,
    pub subscribers: usize,
    pub wide_rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Only known when the wide table was pivoted from the events.
    pub out_of_window: Option<usize>,
    pub output_columns: Vec<String>,
    pub output_path: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "input rows:       {}", self.input_rows)?;
        writeln!(f, "subscribers:      {}", self.subscribers)?;
        writeln!(f, "wide table rows:  {}", self.wide_rows)?;
        writeln!(f, "matched:          {}", self.matched)?;
        writeln!(f, "unmatched:        {}", self.unmatched)?;
        if let Some(skipped) = self.out_of_window {
            writeln!(f, "out-of-window:    {skipped}")?;
        }
        writeln!(f, "output columns:   {}", self.output_columns.len())?;
        write!(f, "output:           {}", self.output_path.display())
    }
}

/// Loads the event file and adds the derived columns.
pub fn load_events(path: &Path, config: &PipelineConfig) -> Result<DataFrame> {
    let table = load_delimited(path, &config.input_options())?;
    info!(
        path = %path.display(),
        encoding = table.encoding,
        rows = table.df.height(),
        columns = table.df.width(),
        "loaded events"
    );

    let derived = derive_columns(&table.df, &config.derive_options())?;
    debug!(rows = derived.height(), "derived Month and HAPPINESS_INDEX_INT");
    Ok(derived)
}

/// Pivots the configured event file into a wide table.
pub fn build_wide_table(config: &PipelineConfig) -> Result<PivotOutcome> {
    let window = config.window()?;
    let events = load_events(config.input_path()?, config)?;
    let outcome = pivot_events(&events, &window)?;
    if outcome.out_of_window > 0 {
        warn!(
            events = outcome.out_of_window,
            window_start = %window.start(),
            window_end = %window.end(),
            "events outside the reporting window were ignored"
        );
    }
    Ok(outcome)
}

pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let window = config.window()?;
    let input_path = config.input_path()?;
    let output_path = config.output_path()?;

    let events = load_events(input_path, config)?;

    let summary = summarize_subscribers(&events)?;
    info!(subscribers = summary.height(), "summarized subscribers");

    let (wide, out_of_window) = match config.wide_table.path.as_deref() {
        Some(path) => {
            let wide = load_wide_table(path, &config.wide_table_options())?;
            info!(path = %path.display(), rows = wide.height(), "loaded wide table");
            (wide, None)
        }
        None => {
            let outcome = pivot_events(&events, &window)?;
            info!(
                rows = outcome.table.height(),
                out_of_window = outcome.out_of_window,
                "pivoted wide table from events"
            );
            (outcome.table, Some(outcome.out_of_window))
        }
    };

    let merge = merge_classification(&wide, &summary)?;
    if merge.unmatched > 0 {
        warn!(
            unmatched = merge.unmatched,
            "wide table subscribers without classification"
        );
    }

    let report = build_report(&merge.merged, &window)?;
    write_table(&report, output_path, config.output.delimiter)?;

    let run_summary = RunSummary {
        input_rows: events.height(),
        subscribers: summary.height(),
        wide_rows: wide.height(),
        matched: merge.matched,
        unmatched: merge.unmatched,
        out_of_window,
        output_columns: report
            .get_column_names_str()
            .into_iter()
            .map(str::to_string)
            .collect(),
        output_path: output_path.to_path_buf(),
    };
    info!(
        rows = report.height(),
        columns = report.width(),
        path = %output_path.display(),
        "wrote report"
    );
    Ok(run_summary)
}

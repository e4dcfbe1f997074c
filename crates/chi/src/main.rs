use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chi_core::config::{PipelineConfig, CONFIG_ENV};
use chi_core::derive::event_columns;
use chi_core::export::write_table;
use chi_core::months::ReportMonth;
use chi_core::pipeline::{self, build_wide_table, load_events};
use chi_parser::load_delimited;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use polars::prelude::{DataFrame, DataType};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Customer happiness index reporting", long_about = None)]
struct Cli {
    /// TOML config file (falls back to $CHI_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the monthly CHI report
    Run(RunArgs),
    /// Pivot the events into a wide table of monthly scores
    Pivot(PivotArgs),
    /// Print the first rows of the input table
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Event export to read
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Field delimiter of the input (`tab` or a single character)
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<char>,
    /// Text encoding of the input; a byte-order mark takes precedence
    #[arg(long)]
    encoding: Option<String>,
    /// Lines to skip before the header row
    #[arg(long)]
    skip_rows: Option<usize>,
}

#[derive(Args, Debug, Default)]
struct WindowArgs {
    /// First report month, e.g. Oct22 or 2022-10
    #[arg(long)]
    start: Option<ReportMonth>,
    /// Last report month
    #[arg(long)]
    end: Option<ReportMonth>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    window: WindowArgs,
    /// Existing wide table; pivoted from the input when omitted
    #[arg(long)]
    wide_table: Option<PathBuf>,
    #[arg(long, value_parser = parse_delimiter)]
    wide_delimiter: Option<char>,
    #[arg(long)]
    wide_encoding: Option<String>,
    /// Report file to write
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_parser = parse_delimiter)]
    output_delimiter: Option<char>,
}

#[derive(Args, Debug, Default)]
struct PivotArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    window: WindowArgs,
    /// Wide table file to write
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_parser = parse_delimiter)]
    output_delimiter: Option<char>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Number of rows to print
    #[arg(long, default_value_t = 5)]
    rows: usize,
    /// Show the derived event columns instead of the raw table
    #[arg(long)]
    derived: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = load_config(cli.config)?;

    match cli.command {
        Command::Run(args) => handle_run(&mut config, args),
        Command::Pivot(args) => handle_pivot(&mut config, args),
        Command::Inspect(args) => handle_inspect(&mut config, args),
    }
}

fn load_config(flag: Option<PathBuf>) -> Result<PipelineConfig> {
    let path = flag.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => {
            let config = PipelineConfig::from_path(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            info!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn handle_run(config: &mut PipelineConfig, args: RunArgs) -> Result<()> {
    apply_input(config, args.input);
    apply_window(config, args.window);
    if let Some(path) = args.wide_table {
        config.wide_table.path = Some(path);
    }
    if let Some(delimiter) = args.wide_delimiter {
        config.wide_table.delimiter = delimiter;
    }
    if let Some(encoding) = args.wide_encoding {
        config.wide_table.encoding = encoding;
    }
    if let Some(path) = args.output {
        config.output.path = Some(path);
    }
    if let Some(delimiter) = args.output_delimiter {
        config.output.delimiter = delimiter;
    }

    let summary = pipeline::run(config).context("CHI report run failed")?;
    info!(
        matched = summary.matched,
        unmatched = summary.unmatched,
        columns = summary.output_columns.len(),
        "run complete"
    );
    println!("{summary}");
    Ok(())
}

fn handle_pivot(config: &mut PipelineConfig, args: PivotArgs) -> Result<()> {
    apply_input(config, args.input);
    apply_window(config, args.window);
    if let Some(path) = args.output {
        config.output.path = Some(path);
    }
    if let Some(delimiter) = args.output_delimiter {
        config.output.delimiter = delimiter;
    }

    let output = config.output_path()?.to_path_buf();
    let outcome = build_wide_table(config).context("failed to pivot events")?;
    write_table(&outcome.table, &output, config.output.delimiter)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Wrote {} subscribers x {} months to {} ({} events outside the window)",
        outcome.table.height(),
        outcome.table.width().saturating_sub(1),
        output.display(),
        outcome.out_of_window
    );
    Ok(())
}

fn handle_inspect(config: &mut PipelineConfig, args: InspectArgs) -> Result<()> {
    apply_input(config, args.input);
    let path = config.input_path()?.to_path_buf();

    let (df, encoding) = if args.derived {
        let events = load_events(&path, config)?;
        (event_columns(&events)?, None)
    } else {
        let table = load_delimited(&path, &config.input_options())
            .with_context(|| format!("failed to load {}", path.display()))?;
        (table.df, Some(table.encoding))
    };

    if let Some(encoding) = encoding {
        println!("encoding: {encoding}");
    }
    println!("rows: {}  columns: {}", df.height(), df.width());
    println!("{}", preview_table(&df.head(Some(args.rows)))?);
    Ok(())
}

fn apply_input(config: &mut PipelineConfig, args: InputArgs) {
    if let Some(path) = args.input {
        config.input.path = Some(path);
    }
    if let Some(delimiter) = args.delimiter {
        config.input.delimiter = delimiter;
    }
    if let Some(encoding) = args.encoding {
        config.input.encoding = encoding;
    }
    if let Some(skip_rows) = args.skip_rows {
        config.input.skip_rows = skip_rows;
    }
}

fn apply_window(config: &mut PipelineConfig, args: WindowArgs) {
    if let Some(start) = args.start {
        config.window.start = start;
    }
    if let Some(end) = args.end {
        config.window.end = end;
    }
}

fn preview_table(df: &DataFrame) -> Result<Table> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(df.get_column_names_str());

    let columns = df
        .get_columns()
        .iter()
        .map(|column| column.cast(&DataType::String))
        .collect::<Result<Vec<_>, _>>()?;
    for idx in 0..df.height() {
        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            row.push(column.str()?.get(idx).unwrap_or_default().to_string());
        }
        table.add_row(row);
    }
    Ok(table)
}

fn parse_delimiter(raw: &str) -> Result<char, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok('\t'),
        "comma" => Ok(','),
        "pipe" => Ok('|'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("delimiter must be a single character, got '{raw}'")),
            }
        }
    }
}

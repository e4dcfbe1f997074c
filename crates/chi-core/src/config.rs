use std::fs;
use std::path::{Path, PathBuf};

use chi_parser::schema::REQUIRED_EVENT_COLUMNS;
use chi_parser::LoadOptions;
use serde::Deserialize;
use thiserror::Error;

use crate::derive::DeriveOptions;
use crate::months::{MonthError, MonthWindow, ReportMonth};

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV: &str = "CHI_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid reporting window: {0}")]
    Window(#[from] MonthError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub wide_table: WideTableConfig,
    pub output: OutputConfig,
    pub window: WindowConfig,
    /// Replaces the built-in timestamp formats when non-empty.
    pub timestamp_formats: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    pub delimiter: char,
    pub encoding: String,
    pub skip_rows: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: '\t',
            encoding: "utf-16".to_string(),
            skip_rows: 0,
        }
    }
}

/// Without a path the wide table is pivoted from the input events.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WideTableConfig {
    pub path: Option<PathBuf>,
    pub delimiter: char,
    pub encoding: String,
}

impl Default for WideTableConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: '\t',
            encoding: "utf-8".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: '\t',
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start: ReportMonth,
    pub end: ReportMonth,
}

impl Default for WindowConfig {
    fn default() -> Self {
        let window = MonthWindow::default();
        Self {
            start: window.start(),
            end: window.end(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn window(&self) -> Result<MonthWindow, ConfigError> {
        Ok(MonthWindow::new(self.window.start, self.window.end)?)
    }

    pub fn input_path(&self) -> Result<&Path, ConfigError> {
        self.input
            .path
            .as_deref()
            .ok_or(ConfigError::Missing("input.path"))
    }

    pub fn output_path(&self) -> Result<&Path, ConfigError> {
        self.output
            .path
            .as_deref()
            .ok_or(ConfigError::Missing("output.path"))
    }

    pub fn input_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.input.delimiter,
            encoding: self.input.encoding.clone(),
            skip_rows: self.input.skip_rows,
            required_columns: Vec::new(),
        }
        .with_required(&REQUIRED_EVENT_COLUMNS)
    }

    pub fn wide_table_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.wide_table.delimiter,
            encoding: self.wide_table.encoding.clone(),
            skip_rows: 0,
            required_columns: Vec::new(),
        }
    }

    pub fn derive_options(&self) -> DeriveOptions {
        if self.timestamp_formats.is_empty() {
            DeriveOptions::default()
        } else {
            DeriveOptions {
                timestamp_formats: self.timestamp_formats.clone(),
            }
        }
    }
}

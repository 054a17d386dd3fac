//! Output formatting for the evigraph CLI
//!
//! Every command result implements [`TableDisplay`] and `Serialize`, so it
//! can be rendered either as a human-readable table or as JSON.
//!
//! Colors are disabled automatically when stdout is not a TTY.

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod json;
mod table;

pub use self::json::JsonOutput;
pub use self::table::TableOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// The output format to use
    pub format: OutputFormat,
    /// Disable colored output
    pub no_color: bool,
    /// Compact JSON (single line)
    pub compact: bool,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            compact: false,
        }
    }

    /// Detect TTY context: colors only when stdout is a terminal.
    pub fn auto_detect(format: OutputFormat) -> Self {
        Self {
            no_color: !is_tty(),
            ..Self::new(format)
        }
    }
}

/// Types that render as a human-readable table.
pub trait TableDisplay: Serialize {
    fn to_table(&self) -> String;
}

/// A command result bound to an output configuration.
pub struct Output<T> {
    data: T,
    config: OutputConfig,
}

impl<T: TableDisplay> Output<T> {
    pub fn new(data: T, format: OutputFormat) -> Self {
        Self::with_config(data, OutputConfig::auto_detect(format))
    }

    pub fn with_config(data: T, config: OutputConfig) -> Self {
        Self { data, config }
    }

    /// Render to a string in the configured format.
    pub fn render_to_string(&self) -> anyhow::Result<String> {
        if self.config.no_color {
            colored::control::set_override(false);
        }
        match self.config.format {
            OutputFormat::Table => Ok(self.data.to_table()),
            OutputFormat::Json => JsonOutput::format(&self.data, &self.config),
        }
    }

    /// Render and print to stdout.
    pub fn render(&self) -> anyhow::Result<()> {
        println!("{}", self.render_to_string()?);
        Ok(())
    }
}

/// Truncate a string to fit within `max_width` characters, with an ellipsis.
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    }
}

/// Check if stdout is a TTY
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

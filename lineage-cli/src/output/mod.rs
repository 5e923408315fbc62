//! Output formatting module for the lineage CLI
//!
//! Provides unified output formatting across all commands with support for
//! three formats: table (human-readable), json (machine-readable) and tree
//! (derivation forest).

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod json;
mod table;
mod tree;

pub use self::json::JsonOutput;
pub use self::table::TableOutput;
pub use self::tree::TreeOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
    /// Tree format for the derivation hierarchy
    Tree,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "tree" => Ok(OutputFormat::Tree),
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
    /// Compact mode (less whitespace)
    pub compact: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            compact: false,
        }
    }

    /// Create an OutputConfig with automatic TTY detection and optional color override.
    ///
    /// If `color_override` is `None`, colors are enabled only when stdout is a TTY.
    pub fn auto_detect_with_color_override(
        format: OutputFormat,
        color_override: Option<bool>,
    ) -> Self {
        let use_color = color_override.unwrap_or_else(|| std::io::stdout().is_terminal());
        let config = Self::new(format);
        if use_color {
            config
        } else {
            config.without_colors()
        }
    }

    /// Check if colors should be used
    pub fn use_colors(&self) -> bool {
        !self.no_color
    }

    /// Builder: disable colors
    pub fn without_colors(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Builder: enable compact mode
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::auto_detect_with_color_override(OutputFormat::Table, None)
    }
}

/// Trait for types that can be formatted as output
///
/// Types implementing this trait can be rendered in any supported format.
pub trait Outputter: Serialize {
    /// Render as table format
    fn to_table(&self, config: &OutputConfig) -> String;

    /// Render as JSON format
    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    /// Render as tree format
    fn to_tree(&self, config: &OutputConfig) -> String {
        // Default implementation falls back to table
        self.to_table(config)
    }

    /// Render using the format specified in config
    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
            OutputFormat::Tree => self.to_tree(config),
        }
    }

    /// Render and print to stdout
    fn output(&self, config: &OutputConfig) {
        println!("{}", self.render(config));
    }
}

/// Paint `text` with `paint` only when colors are enabled.
pub fn paint<F>(text: &str, config: &OutputConfig, paint: F) -> String
where
    F: FnOnce(&str) -> colored::ColoredString,
{
    if config.use_colors() {
        paint(text).to_string()
    } else {
        text.to_string()
    }
}

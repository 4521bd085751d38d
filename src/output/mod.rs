mod cli;
mod json;

pub use cli::{print_cli_table, print_priority_table};
pub use json::{print_json, print_priority_json};

use crate::model::{Priority, ScanReport};
use anyhow::Result;
use serde::Serialize;

/// Output format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

/// A CVSS-style score and the priority it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredPriority {
    pub score: f64,
    pub priority: Priority,
}

pub fn print_report(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report),
        OutputFormat::Json => print_json(report),
    }
}

pub fn print_priorities(scores: &[ScoredPriority], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_priority_table(scores),
        OutputFormat::Json => print_priority_json(scores),
    }
}

/// Format report to string for file output
pub fn format_report_to_string(report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => Ok(cli::render_layer_table(report)),
    }
}

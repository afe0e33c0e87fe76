//! Output formatting for command reports.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use serde_json::json;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Name/value table.
    #[default]
    Table,
    /// JSON object.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Result of a command: a title and ordered name/value rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn row(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((name.into(), value.into()));
        self
    }

    /// Value of the first row with the given name.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Render a report in the given format.
pub fn render(report: &Report, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => render_table(report),
        OutputFormat::Json => render_json(report),
    }
}

fn render_table(report: &Report) -> String {
    let mut table = Table::new();
    table.set_header(vec!["name", "value"]);

    for (name, value) in &report.rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    format!("{}\n{}", report.title, table)
}

fn render_json(report: &Report) -> String {
    let rows: Vec<serde_json::Value> = report
        .rows
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    let value = json!({ "title": report.title, "rows": rows });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

//! Table output formatting for CLI commands
//!
//! Renders status snapshots and per-source results using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{CheckResult, StatusSnapshot};

use super::truncate;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Two-column view of one snapshot
    pub fn format_snapshot(&self, snapshot: &StatusSnapshot) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("Found"), self.found_cell(snapshot.found)]);
        table.add_row(vec![
            Cell::new("Model"),
            Cell::new(snapshot.model.as_deref().unwrap_or("-")),
        ]);
        table.add_row(vec![
            Cell::new("Source"),
            Cell::new(snapshot.source.as_deref().unwrap_or("-")),
        ]);
        table.add_row(vec![
            Cell::new("Checked at"),
            Cell::new(snapshot.checked_at.to_rfc3339()),
        ]);

        table.to_string()
    }

    /// One row per source adapter
    pub fn format_sources(&self, rows: &[(String, CheckResult)]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Found").add_attribute(Attribute::Bold),
            Cell::new("Model").add_attribute(Attribute::Bold),
            Cell::new("Link").add_attribute(Attribute::Bold),
        ]);

        for (name, result) in rows {
            table.add_row(vec![
                Cell::new(name),
                self.found_cell(result.found),
                Cell::new(result.model.as_deref().unwrap_or("-")),
                Cell::new(truncate(result.source.as_deref().unwrap_or("-"), 60)),
            ]);
        }

        table.to_string()
    }

    fn found_cell(&self, found: bool) -> Cell {
        let text = if found { "yes" } else { "no" };
        if self.use_colors {
            Cell::new(text).fg(if found { Color::Green } else { Color::DarkGrey })
        } else {
            Cell::new(text)
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

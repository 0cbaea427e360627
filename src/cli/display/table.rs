//! Table builder wrapper around comfy-table for consistent list display.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render the table with a bold title line, or `empty_message` when there
/// are no rows.
pub fn render_section(title: &str, table: Table, total: usize, empty_message: &str) -> String {
    let heading = format!("{} ({})", style(title).bold(), total);
    if total == 0 {
        return format!("{heading}\n{}", style(empty_message).dim());
    }
    format!("{heading}\n{table}")
}

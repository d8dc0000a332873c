//! Table rendering for CLI output using comfy-table.
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `kwd read` / `kwd cache show` | `render_keywords_table()` |
//! | `kwd cache list` | `render_cache_table()` |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use kwd_core::{CacheRecordSummary, Keywords};

use super::format::{format_relative_time, single_line, truncate_str};

/// Widest value shown before truncation.
const MAX_VALUE_WIDTH: usize = 60;

/// Render a keyword dictionary.
///
/// # Example Output
///
/// ```text
/// KEYWORD       VALUE
/// category      hazard
/// subcategory   flood
/// unit          m
/// ```
pub fn render_keywords_table(keywords: &Keywords) -> String {
    if keywords.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![Cell::new("KEYWORD"), Cell::new("VALUE")]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // KEYWORD
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // VALUE
    ]);

    for (key, value) in keywords.iter() {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(truncate_str(&single_line(value), MAX_VALUE_WIDTH)),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render keyword cache records.
///
/// # Example Output
///
/// ```text
/// HASH                               KEYWORDS   UPDATED
/// 1f0c6b7e2d3a4c5b6a7980a1b2c3d4e5          4   2h ago
/// ```
pub fn render_cache_table(records: &[CacheRecordSummary]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("HASH"),
        Cell::new("KEYWORDS").set_alignment(CellAlignment::Right),
        Cell::new("UPDATED"),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(32)), // HASH
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // KEYWORDS
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // UPDATED
    ]);

    for record in records {
        let count = record
            .keyword_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "corrupt".to_string());
        let updated = record
            .updated_at
            .map(format_relative_time)
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&record.hash),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(updated),
        ]);
    }

    table.trim_fmt().to_string()
}

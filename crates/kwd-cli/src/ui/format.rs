//! Formatting utilities for CLI output.

use chrono::{DateTime, Utc};

/// Truncate a string to at most `max_len` characters, ending in `...` when cut.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Show a keyword value on one line: line breaks become `⏎`.
pub fn single_line(value: &str) -> String {
    value.replace("\r\n", "⏎").replace(['\n', '\r'], "⏎")
}

/// Format a timestamp as relative time (e.g., "2h ago", "3d ago").
///
/// - Less than 1 minute: "just now"
/// - Less than 1 hour: "5 mins ago"
/// - Less than 24 hours: "3h ago"
/// - Less than 7 days: "2d ago"
/// - Older or in the future: "2025-01-15"
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    if duration.num_seconds() < 0 {
        return timestamp.format("%Y-%m-%d").to_string();
    }

    if duration.num_minutes() < 1 {
        "just now".to_string()
    } else if duration.num_hours() < 1 {
        format!("{} mins ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

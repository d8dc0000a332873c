//! # CLI UI Module
//!
//! Styling and formatting layer for kwd CLI output.
//!
//! Human-readable output goes through [`Style`]; every command that prints
//! data also accepts `--json` for scripting. Colors respect `NO_COLOR` and
//! are disabled when stdout is not a terminal.
//!
//! ## Module Structure
//!
//! - `color`: Color mode detection
//! - `style`: Message types, prefixes, and styling functions
//! - `format`: Utility formatters (time, truncation)
//! - `table`: Table rendering with comfy-table

pub mod color;
pub mod format;
pub mod style;
pub mod table;

// Re-export main types for convenient access
pub use color::ColorMode;
pub use style::{MessageType, Style};

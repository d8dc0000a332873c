//! Status lines and inline highlights for kwd output.
//!
//! Every command reports its outcome as one prefixed line, for example
//! `[ok] Wrote 3 keyword(s) to sidecar /data/roads.keywords`, optionally
//! followed by indented detail lines. Errors go to stderr with the same
//! prefix scheme.
//!
//! ## Prefixes
//!
//! | Prefix | Meaning | Color |
//! |--------|---------|-------|
//! | `[ok]` | Success | Green |
//! | `[err]` | Error | Red |
//! | `[warn]` | Warning | Yellow |
//! | `[info]` | Information | Blue |
//! | `[hint]` | Suggestion | Cyan |

use owo_colors::OwoColorize;

use super::color::ColorMode;

/// Outcome of a kwd command, shown as the line prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Keywords were written, copied or removed
    Ok,
    /// The command failed; exit code 1
    Err,
    /// Done, but something needs attention (e.g. corrupt cache rows)
    Warn,
    /// Nothing changed, or a neutral report
    Info,
    /// Command to run next
    Hint,
}

impl MessageType {
    /// Bracketed prefix, without color.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ok => "[ok]",
            Self::Err => "[err]",
            Self::Warn => "[warn]",
            Self::Info => "[info]",
            Self::Hint => "[hint]",
        }
    }
}

/// Formats kwd output according to the resolved [`ColorMode`].
///
/// ```text
/// let style = Style::new(ColorMode::Never);
/// assert_eq!(style.message(MessageType::Ok, "Done"), "[ok] Done");
/// ```
#[derive(Debug, Clone)]
pub struct Style {
    color_mode: ColorMode,
}

impl Style {
    /// Style for the given `--color` mode.
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    /// Whether ANSI colors are emitted.
    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// One status line: colored prefix plus text.
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if self.colors_enabled() {
            let colored_prefix = match msg_type {
                MessageType::Ok => prefix.green().to_string(),
                MessageType::Err => prefix.red().to_string(),
                MessageType::Warn => prefix.yellow().to_string(),
                MessageType::Info => prefix.blue().to_string(),
                MessageType::Hint => prefix.cyan().to_string(),
            };
            format!("{} {}", colored_prefix, text)
        } else {
            format!("{} {}", prefix, text)
        }
    }

    /// Indented `label: value` line under a status line, e.g. `Total: 4`.
    pub fn message_detail(&self, label: &str, value: &str) -> String {
        format!("     {}: {}", label, value)
    }

    /// Error line with optional `Cause:` and `Hint:` lines, used for startup
    /// failures (bad config, unusable keyword database path).
    pub fn error_with_context(
        &self,
        msg: &str,
        cause: Option<&str>,
        hint: Option<&str>,
    ) -> String {
        let mut output = self.message(MessageType::Err, msg);

        if let Some(cause_text) = cause {
            output.push('\n');
            output.push_str(&format!("      Cause: {}", cause_text));
        }

        if let Some(hint_text) = hint {
            output.push('\n');
            output.push_str(&format!("      Hint: {}", hint_text));
        }

        output
    }

    /// Indented list entry, e.g. one statistics class.
    pub fn list_item(&self, prefix: &str, text: &str) -> String {
        let styled_prefix = if self.colors_enabled() {
            prefix.dimmed().to_string()
        } else {
            prefix.to_string()
        };
        format!("  {} {}", styled_prefix, text)
    }

    /// `key: value` with a dimmed key, used by `stats` and `locate`.
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.colors_enabled() {
            format!("{}: {}", key.dimmed(), value)
        } else {
            format!("{}: {}", key, value)
        }
    }

    /// Datasource hash shortened to 8 characters, in yellow.
    pub fn hash(&self, hash: &str) -> String {
        let short = hash.get(..8).unwrap_or(hash);
        if self.colors_enabled() {
            short.yellow().to_string()
        } else {
            short.to_string()
        }
    }

    /// Dataset, sidecar or database path, in cyan.
    pub fn file_path(&self, path: &str) -> String {
        if self.colors_enabled() {
            path.cyan().to_string()
        } else {
            path.to_string()
        }
    }

    /// Keyword name, in bold.
    pub fn keyword(&self, key: &str) -> String {
        if self.colors_enabled() {
            key.bold().to_string()
        } else {
            key.to_string()
        }
    }
}

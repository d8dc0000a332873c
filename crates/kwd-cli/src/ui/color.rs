//! `--color` handling for kwd.
//!
//! Keyword listings are often piped into files or other tools, so `auto`
//! only colors an interactive stdout and steps aside when `NO_COLOR` is set
//! (https://no-color.org/).

use std::io::IsTerminal;

/// Value of the global `--color` flag (`KWD_COLOR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color even when piped.
    Always,
    /// Plain text; used by the integration tests.
    Never,
    /// Color only an interactive stdout.
    #[default]
    Auto,
}

impl ColorMode {
    /// Parse a `--color` value, case-insensitively. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    /// Whether prefixes, hashes and paths get ANSI colors.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => Self::should_auto_colorize(),
        }
    }

    /// `NO_COLOR` with any value wins over a TTY.
    fn should_auto_colorize() -> bool {
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        std::io::stdout().is_terminal()
    }
}

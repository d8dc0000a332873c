//! Text format of `.keywords` sidecar files.
//!
//! One `key: value` entry per line, sorted by key:
//!
//! ```text
//! category: hazard
//! subcategory: flood
//! title: Jakarta flood 2013
//! unit: m
//! ```
//!
//! Blank lines and `#` comments are skipped when reading. Values are trimmed;
//! the escapes `\\`, `\n`, `\r`, `\t` and `\s` (space) keep line breaks and
//! boundary whitespace intact. Any other whitespace at either end of a value
//! (no-break space, form feed, ...) is written as `\u{XXXX}`. Unknown escapes
//! are kept verbatim so that hand-written Windows paths survive.

use crate::error::{DbError, DbResult};
use crate::KeywordMap;
use std::path::Path;
use tracing::warn;

/// Check that a keyword name can be stored in a sidecar.
pub fn validate_key(key: &str) -> DbResult<()> {
    if key.is_empty() {
        return Err(DbError::invalid_key(key, "keyword names must not be empty"));
    }
    if key.contains(':') {
        return Err(DbError::invalid_key(key, "keyword names must not contain ':'"));
    }
    if key.contains('\n') || key.contains('\r') {
        return Err(DbError::invalid_key(
            key,
            "keyword names must not contain line breaks",
        ));
    }
    if key.starts_with('#') {
        return Err(DbError::invalid_key(key, "keyword names must not start with '#'"));
    }
    if key.trim() != key {
        return Err(DbError::invalid_key(
            key,
            "keyword names must not have leading or trailing whitespace",
        ));
    }
    Ok(())
}

/// Render a dictionary as sidecar text.
pub fn render(dict: &KeywordMap) -> DbResult<String> {
    let mut out = String::new();
    for (key, value) in dict {
        validate_key(key)?;
        out.push_str(key);
        out.push(':');
        if !value.is_empty() {
            out.push(' ');
            out.push_str(&escape_value(value));
        }
        out.push('\n');
    }
    Ok(out)
}

/// Parse sidecar text. `path` is only used for error context.
pub fn parse(path: &Path, content: &str) -> DbResult<KeywordMap> {
    let mut dict = KeywordMap::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed.split_once(':').ok_or_else(|| DbError::SidecarParse {
            path: path.to_path_buf(),
            line: idx + 1,
            message: "expected `key: value`".to_string(),
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(DbError::SidecarParse {
                path: path.to_path_buf(),
                line: idx + 1,
                message: "empty keyword name".to_string(),
            });
        }

        if dict
            .insert(key.to_string(), unescape_value(value.trim()))
            .is_some()
        {
            warn!(
                "Duplicate keyword `{}` in {} (line {}); keeping the last value",
                key,
                path.display(),
                idx + 1
            );
        }
    }

    Ok(dict)
}

fn escape_value(value: &str) -> String {
    // Whitespace in these byte ranges would be lost to `trim` on read.
    let leading_end = value.len() - value.trim_start().len();
    let trailing_start = value.trim_end().len();

    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        let boundary = i < leading_end || i >= trailing_start;
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' if boundary => out.push_str("\\s"),
            c if boundary && c.is_whitespace() => {
                out.push_str(&format!("\\u{{{:04x}}}", c as u32));
            }
            _ => out.push(c),
        }
    }
    out
}

fn unescape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some('u') => match unicode_escape(chars.as_str()) {
                Some((decoded, consumed)) => {
                    out.push(decoded);
                    chars = chars.as_str()[consumed..].chars();
                }
                None => out.push_str("\\u"),
            },
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Decode the `{XXXX}` part of a `\u{XXXX}` escape at the start of `rest`.
///
/// Returns the character and the number of bytes consumed.
fn unicode_escape(rest: &str) -> Option<(char, usize)> {
    let body = rest.strip_prefix('{')?;
    let end = body.find('}')?;
    let code = u32::from_str_radix(&body[..end], 16).ok()?;
    let decoded = char::from_u32(code)?;
    Some((decoded, end + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, &str)]) -> KeywordMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_is_sorted_and_stable() {
        let keywords = dict(&[("title", "Flood"), ("category", "hazard"), ("unit", "m")]);
        let text = render(&keywords).unwrap();
        assert_eq!(text, "category: hazard\ntitle: Flood\nunit: m\n");
        assert_eq!(render(&keywords).unwrap(), text);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&KeywordMap::new()).unwrap(), "");
        assert_eq!(render(&dict(&[("empty", "")])).unwrap(), "empty:\n");
    }

    #[test]
    fn test_parse_hand_written_file() {
        let text = "# written by hand\n\ncategory:hazard\n  subcategory :  flood  \r\ntitle: a: b\n";
        let parsed = parse(Path::new("x.keywords"), text).unwrap();
        assert_eq!(
            parsed,
            dict(&[("category", "hazard"), ("subcategory", "flood"), ("title", "a: b")])
        );
    }

    #[test]
    fn test_escapes_survive_round_trip() {
        let keywords = dict(&[
            ("multi", "line one\nline two"),
            ("path", "C:\\data\\flood.tif"),
            ("padded", "  spaced  "),
            ("tabbed", "a\tb"),
            ("empty", ""),
        ]);
        let text = render(&keywords).unwrap();
        assert_eq!(text.lines().count(), keywords.len());
        assert_eq!(parse(Path::new("x.keywords"), &text).unwrap(), keywords);
    }

    #[test]
    fn test_unicode_boundary_whitespace_survives_round_trip() {
        let keywords = dict(&[
            ("unit", "100\u{a0}"),
            ("vt", "\u{b}x"),
            ("ff", "y\u{c}"),
            ("em", "\u{2003}indented\u{2003}"),
            ("mixed", " \u{a0}a b\u{a0} "),
            ("blank", "\u{3000}"),
        ]);
        let text = render(&keywords).unwrap();
        assert!(text.contains("unit: 100\\u{00a0}\n"));
        assert_eq!(parse(Path::new("x.keywords"), &text).unwrap(), keywords);
    }

    #[test]
    fn test_interior_unicode_whitespace_is_written_raw() {
        let text = render(&dict(&[("title", "Banjir\u{a0}Jakarta")])).unwrap();
        assert_eq!(text, "title: Banjir\u{a0}Jakarta\n");
    }

    #[test]
    fn test_unknown_escape_kept_verbatim() {
        let parsed = parse(Path::new("x.keywords"), "source: C:\\data\\x.shp\n").unwrap();
        assert_eq!(parsed["source"], "C:\\data\\x.shp");

        let parsed = parse(
            Path::new("x.keywords"),
            "home: C:\\users\\flood\nbad: \\u{zz}\nsurrogate: \\u{d800}\n",
        )
        .unwrap();
        assert_eq!(parsed["home"], "C:\\users\\flood");
        assert_eq!(parsed["bad"], "\\u{zz}");
        assert_eq!(parsed["surrogate"], "\\u{d800}");
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse(Path::new("x.keywords"), "category: hazard\nno separator\n").unwrap_err();
        match err {
            DbError::SidecarParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = parse(Path::new("x.keywords"), ": value\n").unwrap_err();
        assert!(matches!(err, DbError::SidecarParse { line: 1, .. }));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        for key in ["", "a:b", "a\nb", "#comment", " padded"] {
            let err = render(&dict(&[(key, "v")])).unwrap_err();
            assert!(matches!(err, DbError::InvalidKey { .. }), "key {key:?}");
        }
        assert!(validate_key("value_map").is_ok());
        assert!(validate_key("Title With Spaces").is_ok());
    }
}

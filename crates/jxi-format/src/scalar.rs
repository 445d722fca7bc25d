//! Scalar spelling: string escaping, raw strings, numbers and keys.

use std::borrow::Cow;

use jxi_tree::{Key, is_identifier};

fn needs_escape(c: char) -> bool {
    matches!(c, '"' | '\\') || (c as u32) < 0x20
}

/// Escape a string for `"`-quoted output.
///
/// Returns the escaped content (without surrounding quotes).
pub fn escape_quoted(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if (c as u32) < 0x20 => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape a string for backtick-delimited output.
///
/// Only the backtick is escaped. Content ending in a backslash has no raw
/// spelling, since the backslash would escape the closing delimiter.
pub fn escape_raw(s: &str) -> Option<Cow<'_, str>> {
    if s.ends_with('\\') {
        return None;
    }
    if !s.contains('`') {
        return Some(Cow::Borrowed(s));
    }
    Some(Cow::Owned(s.replace('`', "\\`")))
}

/// Shortest decimal spelling of `n` that reads back as the same float.
///
/// Whole numbers keep a `.0` so they stay floats. `None` for non-finite
/// values.
pub fn format_float(n: f64) -> Option<String> {
    n.is_finite().then(|| format!("{n:?}"))
}

/// Whether a dict key can be written without quotes.
pub fn can_be_bare_key(key: &Key) -> bool {
    match key {
        Key::Int(_) => true,
        Key::String(s) => is_identifier(s),
    }
}

//! Low-level jxi output writer.
//!
//! Owns the output buffer and the indentation state, and knows how to
//! spell scalars, keys and link paths. The encoder decides what goes where.

use jxi_tree::{Key, Step};

use crate::options::FormatOptions;
use crate::scalar::{can_be_bare_key, escape_quoted, escape_raw, format_float};
use crate::{EncodeError, EncodeErrorKind};

/// Low-level jxi output writer.
pub struct JxiWriter {
    out: String,
    options: FormatOptions,
    indent_unit: String,
    depth: usize,
}

impl JxiWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::with_options(FormatOptions::default())
    }

    /// Create a new writer with the given options.
    pub fn with_options(options: FormatOptions) -> Self {
        Self {
            out: String::new(),
            indent_unit: options.indent.unit(),
            options,
            depth: 0,
        }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Consume the writer and return the output.
    pub fn finish(self) -> String {
        self.out
    }

    /// Current block nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Newline followed by indentation for the current depth.
    pub fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str(&self.indent_unit);
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Separator between inline items.
    pub fn write_separator(&mut self) {
        self.out.push_str(&self.options.list_item_separator);
    }

    /// Separator between a dict key and its value.
    pub fn write_key_separator(&mut self) {
        self.out.push_str(&self.options.dict_key_separator);
    }

    // Scalars

    pub fn write_null(&mut self) {
        self.write_str("null");
    }

    pub fn write_bool(&mut self, b: bool) {
        self.write_str(if b { "true" } else { "false" });
    }

    pub fn write_int(&mut self, n: i64) {
        self.write_str(&n.to_string());
    }

    pub fn write_float(&mut self, n: f64) -> Result<(), EncodeError> {
        let text = format_float(n).ok_or(EncodeErrorKind::NonFiniteNumber(n))?;
        self.write_str(&text);
        Ok(())
    }

    /// A `"`-quoted string.
    pub fn write_string(&mut self, s: &str) {
        self.out.push('"');
        self.out.push_str(&escape_quoted(s));
        self.out.push('"');
    }

    /// A backtick-delimited raw string.
    pub fn write_raw_string(&mut self, s: &str) -> Result<(), EncodeError> {
        let escaped = escape_raw(s).ok_or_else(|| {
            EncodeError::unsupported(format!("raw string {s:?}: it ends in a backslash"))
        })?;
        self.out.push('`');
        self.out.push_str(&escaped);
        self.out.push('`');
        Ok(())
    }

    /// A dict key or link index: bare when possible, quoted otherwise.
    pub fn write_key(&mut self, key: &Key) {
        match key {
            Key::Int(n) => self.write_int(*n),
            Key::String(s) if can_be_bare_key(key) => self.write_str(s),
            Key::String(s) => self.write_string(s),
        }
    }

    /// A tag or attribute name, which must be an identifier.
    pub fn write_name(&mut self, name: &str) -> Result<(), EncodeError> {
        if !jxi_tree::is_identifier(name) {
            return Err(EncodeError::unsupported(format!(
                "name {name:?}: names must be identifiers"
            )));
        }
        self.write_str(name);
        Ok(())
    }

    /// Link syntax for a path: `@>root>item[1].name;`. Group index 0 is
    /// left implicit.
    pub fn write_link(&mut self, steps: &[Step]) -> Result<(), EncodeError> {
        self.write_str("@");
        for step in steps {
            match step {
                Step::Tag { name, index } => {
                    self.write_str(">");
                    self.write_name(name)?;
                    match index {
                        None | Some(Key::Int(0)) => {}
                        Some(key) => {
                            self.write_str("[");
                            self.write_key(key);
                            self.write_str("]");
                        }
                    }
                }
                Step::Attr(name) => {
                    self.write_str(".");
                    self.write_name(name)?;
                }
                Step::Index(key) => {
                    self.write_str("[");
                    self.write_key(key);
                    self.write_str("]");
                }
            }
        }
        self.write_str(";");
        Ok(())
    }
}

impl Default for JxiWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn written(f: impl FnOnce(&mut JxiWriter) -> Result<(), EncodeError>) -> String {
        let mut writer = JxiWriter::new();
        f(&mut writer).unwrap();
        writer.finish()
    }

    #[test]
    fn test_write_keys() {
        let out = written(|w| {
            w.write_key(&Key::from("plain"));
            w.write_str(" ");
            w.write_key(&Key::from("two words"));
            w.write_str(" ");
            w.write_key(&Key::Int(-4));
            Ok(())
        });
        assert_eq!(out, r#"plain "two words" -4"#);
    }

    #[test]
    fn test_write_link() {
        let out = written(|w| {
            w.write_link(&[
                Step::tag_at("root", 0),
                Step::tag_at("item", 2),
                Step::attr("name"),
                Step::index(1),
                Step::index("a key"),
            ])
        });
        assert_eq!(out, r#"@>root>item[2].name[1]["a key"];"#);
    }

    #[test]
    fn test_indentation() {
        let options = FormatOptions::default().indent("\t").list_item_separator(", ");
        let mut writer = JxiWriter::with_options(options);
        writer.write_str("a");
        writer.indent();
        writer.indent();
        writer.newline();
        writer.write_str("b");
        writer.write_separator();
        writer.write_str("c");
        writer.dedent();
        writer.newline();
        writer.write_str("d");
        assert_eq!(writer.depth(), 1);
        assert_eq!(writer.finish(), "a\n\t\tb, c\n\td");
    }

    #[test]
    fn test_unencodable_scalars() {
        let mut writer = JxiWriter::new();
        let err = writer.write_float(f64::NAN).unwrap_err();
        assert!(matches!(err.kind, EncodeErrorKind::NonFiniteNumber(_)));
        assert!(writer.write_raw_string("ends\\").is_err());
        assert!(writer.write_name("not a name").is_err());
        assert_eq!(writer.finish(), "");
    }
}

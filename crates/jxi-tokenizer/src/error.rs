//! Lexical errors.

use std::fmt;

use crate::Span;

/// Kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A character that cannot start any token.
    IllegalCharacter(char),
    /// End of input before the closing string delimiter.
    UnterminatedString,
    /// Backslash followed by a character with no escape meaning.
    InvalidEscape(char),
    /// `\u` not followed by four hex digits, or an unpaired surrogate.
    InvalidUnicodeEscape,
    /// A raw control character inside a quoted string.
    UnescapedControl(char),
    /// A number that does not follow the numeric grammar.
    MalformedNumber(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::IllegalCharacter(c) => write!(f, "illegal character {c:?}"),
            LexErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            LexErrorKind::InvalidEscape(c) => write!(f, "invalid escape sequence '\\{c}'"),
            LexErrorKind::InvalidUnicodeEscape => {
                write!(f, "invalid unicode escape, expected \\uXXXX")
            }
            LexErrorKind::UnescapedControl(c) => {
                write!(f, "unescaped control character {c:?} in string literal")
            }
            LexErrorKind::MalformedNumber(msg) => write!(f, "malformed number: {msg}"),
        }
    }
}

/// A lexical error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// The kind of error.
    pub kind: LexErrorKind,
    /// Offending bytes in the source.
    pub span: Span,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, in characters from the start of the line.
    pub column: u32,
}

impl LexError {
    /// Create a new lex error.
    pub fn new(kind: LexErrorKind, span: Span, line: u32, column: u32) -> Self {
        Self {
            kind,
            span,
            line,
            column,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.kind, self.line, self.column
        )
    }
}

impl std::error::Error for LexError {}

//! Token types for the jxi tokenizer.

use std::borrow::Cow;
use std::fmt;

use crate::Span;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Symbols
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(` (only when set literals are enabled)
    LParen,
    /// `)` (only when set literals are enabled)
    RParen,
    /// `:`
    Colon,
    /// `/`
    Slash,
    /// `=`
    Eq,
    /// `@`
    At,
    /// `.`
    Dot,
    /// `;`
    Semi,

    // Words
    /// `[A-Za-z][A-Za-z0-9_]*`, minus the reserved spellings
    Ident,
    /// `true` or `false`
    Bool,
    /// `null`
    Null,

    // Literals
    /// Integer literal: `42`, `-7`
    Int,
    /// Float literal: `0.5`, `10e3`
    Float,
    /// Quoted string: `"..."` or `'...'`
    String,
    /// Backtick-delimited raw string
    RawString,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Whether this token is a self-contained literal value.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::RawString
                | TokenKind::Bool
                | TokenKind::Null
        )
    }

    /// Human-readable name, used in "expected X, got Y" messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Colon => "':'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::At => "'@'",
            TokenKind::Dot => "'.'",
            TokenKind::Semi => "';'",
            TokenKind::Ident => "identifier",
            TokenKind::Bool => "boolean",
            TokenKind::Null => "null",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::RawString => "raw string",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Decoded payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue<'src> {
    /// Symbols and end of input carry nothing beyond their kind.
    None,
    /// Identifier or string contents, after escape processing.
    Text(Cow<'src, str>),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// `true` / `false`.
    Bool(bool),
}

/// A token with its kind, location, source slice and decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in the source text.
    pub span: Span,
    /// 1-based line the token starts on.
    pub line: u32,
    /// The source text of this token, delimiters included.
    pub text: &'src str,
    /// The decoded payload.
    pub value: TokenValue<'src>,
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(
        kind: TokenKind,
        span: Span,
        line: u32,
        text: &'src str,
        value: TokenValue<'src>,
    ) -> Self {
        Self {
            kind,
            span,
            line,
            text,
            value,
        }
    }

    /// Decoded text of an identifier, string or raw string.
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this token is an identifier spelled `name`.
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            kind if kind.is_literal() || kind == TokenKind::Ident => {
                write!(f, "{} `{}`", kind, self.text)
            }
            kind => f.write_str(kind.describe()),
        }
    }
}

//! Parse and link errors.

use std::fmt;

use jxi_tokenizer::{LexError, Span};

/// Kind of structural parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was required here.
    UnexpectedToken { expected: String, found: String },
    /// `</close>` does not match `<open>`.
    MismatchedClosingTag { open: String, close: String },
    /// Something that cannot start an element.
    ExpectedValue { found: String },
    /// A dict key that is not an identifier, integer or string.
    InvalidDictKey { found: String },
    /// Input ended inside a construct.
    UnexpectedEof,
    /// A collection, tag or reference inside a set literal.
    UnhashableSetMember(&'static str),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ParseErrorKind::MismatchedClosingTag { open, close } => {
                write!(f, "closing tag `{close}` does not match opening tag `{open}`")
            }
            ParseErrorKind::ExpectedValue { found } => write!(f, "expected a value, found {found}"),
            ParseErrorKind::InvalidDictKey { found } => write!(f, "invalid dict key {found}"),
            ParseErrorKind::UnexpectedEof => f.write_str("unexpected end of input"),
            ParseErrorKind::UnhashableSetMember(type_name) => {
                write!(f, "a {type_name} cannot be a set member")
            }
        }
    }
}

/// A structural parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// 1-based line of the offending token.
    pub line: u32,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, line: u32) -> Self {
        Self { kind, span, line }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.kind, self.line)
    }
}

impl std::error::Error for ParseError {}

/// Kind of link error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkErrorKind {
    /// The link is not `@` followed by steps and `;`.
    MalformedSyntax(String),
    /// A named tag, attribute, index or key does not exist.
    TargetNotFound(String),
    /// A step does not apply to the value it was taken from.
    TypeMismatch(String),
    /// These links only point at one another.
    UnresolvedCycle { pending: usize },
}

impl fmt::Display for LinkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkErrorKind::MalformedSyntax(msg) => write!(f, "malformed link: {msg}"),
            LinkErrorKind::TargetNotFound(msg) => write!(f, "link target not found: {msg}"),
            LinkErrorKind::TypeMismatch(msg) => write!(f, "link type mismatch: {msg}"),
            LinkErrorKind::UnresolvedCycle { pending } => {
                write!(f, "{pending} link(s) could not be resolved; they form a cycle")
            }
        }
    }
}

/// A link that could not be parsed or resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkError {
    pub kind: LinkErrorKind,
    /// The link, or the offending token for malformed syntax.
    pub span: Span,
    /// 1-based source line of the link.
    pub line: u32,
    /// Zero-based index of the path step that failed, when one did.
    pub step: Option<usize>,
}

impl LinkError {
    pub fn new(kind: LinkErrorKind, span: Span, line: u32) -> Self {
        Self {
            kind,
            span,
            line,
            step: None,
        }
    }

    pub fn at_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "{} (step {}) at line {}", self.kind, step + 1, self.line),
            None => write!(f, "{} at line {}", self.kind, self.line),
        }
    }
}

impl std::error::Error for LinkError {}

/// Any failure of [`parse`](crate::parse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    Link(LinkError),
}

impl Error {
    /// 1-based line the error was found on.
    pub fn line(&self) -> u32 {
        match self {
            Error::Lex(e) => e.line,
            Error::Parse(e) => e.line,
            Error::Link(e) => e.line,
        }
    }

    /// Source bytes the error points at.
    pub fn span(&self) -> Span {
        match self {
            Error::Lex(e) => e.span,
            Error::Parse(e) => e.span,
            Error::Link(e) => e.span,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => fmt::Display::fmt(e, f),
            Error::Parse(e) => fmt::Display::fmt(e, f),
            Error::Link(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Link(e) => Some(e),
        }
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Error::Link(e)
    }
}

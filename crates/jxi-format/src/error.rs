//! Encoding errors.

use std::fmt;

/// Kind of encoding error.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeErrorKind {
    /// A value contains itself through an expanded reference.
    CircularReference(String),
    /// A value that has no textual form: an unresolved link, a name that
    /// is not an identifier, or an unencodable raw string.
    UnsupportedValue(String),
    /// `inf`, `-inf` or `NaN`.
    NonFiniteNumber(f64),
    /// A reference whose target no longer exists.
    DanglingReference(String),
}

impl fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeErrorKind::CircularReference(what) => {
                write!(f, "circular reference: {what} contains itself")
            }
            EncodeErrorKind::UnsupportedValue(msg) => write!(f, "cannot encode {msg}"),
            EncodeErrorKind::NonFiniteNumber(n) => write!(f, "cannot encode non-finite number {n}"),
            EncodeErrorKind::DanglingReference(reference) => {
                write!(f, "reference {reference} does not resolve")
            }
        }
    }
}

/// An encoding failure.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeError {
    pub kind: EncodeErrorKind,
}

impl EncodeError {
    pub fn new(kind: EncodeErrorKind) -> Self {
        Self { kind }
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::new(EncodeErrorKind::UnsupportedValue(msg.into()))
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl std::error::Error for EncodeError {}

impl From<EncodeErrorKind> for EncodeError {
    fn from(kind: EncodeErrorKind) -> Self {
        Self::new(kind)
    }
}

//! Errors from structural mutation.

use std::fmt;

/// Error raised by an [`Entity`](crate::Entity) mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A child position past the end of the children.
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// Number of children at the time of the call.
        len: usize,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::IndexOutOfRange { index, len } => {
                write!(f, "child index {index} out of range for {len} children")
            }
        }
    }
}

impl std::error::Error for TreeError {}

//! Document tree representation for jxi.
//!
//! A [`Document`] is an ordered sequence of top-level [`Value`]s. Tags are
//! [`Entity`] nodes: a name, an attribute map and ordered children, with a
//! per-name group index kept in step with every mutation.
//!
//! Symbolic links (`@>root>item[1].name;`) appear as [`Value::Link`]
//! placeholders until resolution. Afterwards a link to a scalar has been
//! replaced by a copy of the scalar, and a link to a composite value by a
//! [`Value::Ref`], a canonical path that [`Document::follow`] dereferences.
//! Ownership stays a tree; references are lookups, never owning edges.

mod document;
mod entity;
mod error;
mod link;
mod value;

pub use document::{Document, Lookup, LookupError, LookupErrorKind, Slot};
pub use entity::{Attributes, Entity};
pub use error::TreeError;
pub use link::{Reference, Step, SymbolicLink};
pub use value::{Dict, Key, Set, Value};

/// Whether `s` can be written as a bare identifier: `[A-Za-z][A-Za-z0-9_]*`
/// and not one of the reserved words `true`, `false`, `null`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !matches!(s, "true" | "false" | "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("firstName"));
        assert!(is_identifier("a_1"));
        assert!(is_identifier("nullable"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("_a"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("two words"));
        assert!(!is_identifier("null"));
        assert!(!is_identifier("true"));
        assert!(!is_identifier("é"));
    }
}

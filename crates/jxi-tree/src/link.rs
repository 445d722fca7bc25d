//! Link paths: unresolved symbolic links and resolved references.

use std::fmt;

use crate::Key;

/// One navigation step of a link path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// `>name` or `>name[index]`: the `index`-th tag called `name`
    /// (the first when absent).
    Tag { name: String, index: Option<Key> },
    /// `.name`: an attribute of the current tag.
    Attr(String),
    /// `[index]`: a child or list item by position, or a dict entry by key.
    Index(Key),
}

impl Step {
    /// `>name`
    pub fn tag(name: impl Into<String>) -> Self {
        Step::Tag {
            name: name.into(),
            index: None,
        }
    }

    /// `>name[index]`
    pub fn tag_at(name: impl Into<String>, index: usize) -> Self {
        Step::Tag {
            name: name.into(),
            index: Some(Key::Int(index as i64)),
        }
    }

    /// `.name`
    pub fn attr(name: impl Into<String>) -> Self {
        Step::Attr(name.into())
    }

    /// `[index]`
    pub fn index(index: impl Into<Key>) -> Self {
        Step::Index(index.into())
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &Key) -> fmt::Result {
    match key {
        Key::Int(n) => write!(f, "[{n}]"),
        Key::String(s) if crate::is_identifier(s) => write!(f, "[{s}]"),
        Key::String(s) => write!(f, "[{s:?}]"),
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Tag { name, index } => {
                write!(f, ">{name}")?;
                match index {
                    Some(key) => write_key(f, key),
                    None => Ok(()),
                }
            }
            Step::Attr(name) => write!(f, ".{name}"),
            Step::Index(key) => write_key(f, key),
        }
    }
}

fn write_path(f: &mut fmt::Formatter<'_>, steps: &[Step]) -> fmt::Result {
    f.write_str("@")?;
    for step in steps {
        write!(f, "{step}")?;
    }
    f.write_str(";")
}

/// A link placeholder, as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicLink {
    /// Identifies the placeholder within one parse, so the resolver can
    /// tell whether a slot still holds it.
    pub id: u32,
    /// The path, at least one step long.
    pub steps: Vec<Step>,
    /// 1-based source line of the `@`.
    pub line: u32,
}

impl fmt::Display for SymbolicLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_path(f, &self.steps)
    }
}

/// A resolved link to a composite value.
///
/// The path is canonical: every tag step carries an explicit group index,
/// and no step passes through another reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    steps: Vec<Step>,
}

impl Reference {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_path(f, &self.steps)
    }
}

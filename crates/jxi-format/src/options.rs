//! Formatting options for jxi output.

/// Indentation unit for block layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indent {
    /// This many spaces.
    Spaces(usize),
    /// A literal string, such as `"\t"`.
    Str(String),
}

impl Indent {
    /// The text of one indentation level.
    pub fn unit(&self) -> String {
        match self {
            Indent::Spaces(n) => " ".repeat(*n),
            Indent::Str(s) => s.clone(),
        }
    }
}

impl From<usize> for Indent {
    fn from(n: usize) -> Self {
        Indent::Spaces(n)
    }
}

impl From<&str> for Indent {
    fn from(s: &str) -> Self {
        Indent::Str(s.to_owned())
    }
}

impl From<String> for Indent {
    fn from(s: String) -> Self {
        Indent::Str(s)
    }
}

/// Whether a construct is written on one line or one part per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Inline,
    Block,
}

/// Options for jxi encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// Indentation per block level (default: 4 spaces)
    pub indent: Indent,

    /// Tag attributes (default: inline)
    pub attributes: Layout,

    /// Lists and sets (default: inline)
    pub lists: Layout,

    /// Dicts (default: inline)
    pub dicts: Layout,

    /// Tag children (default: block)
    pub children: Layout,

    /// Between inline list items, set members, dict entries and children
    /// (default: " ")
    pub list_item_separator: String,

    /// Between a dict key and its value (default: ":")
    pub dict_key_separator: String,

    /// Write the target of a resolved reference in place of the link
    /// (default: false)
    pub expand_references: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: Indent::Spaces(4),
            attributes: Layout::Inline,
            lists: Layout::Inline,
            dicts: Layout::Inline,
            children: Layout::Block,
            list_item_separator: " ".to_owned(),
            dict_key_separator: ":".to_owned(),
            expand_references: false,
        }
    }
}

impl FormatOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything on one line.
    pub fn inline() -> Self {
        Self::default().children(Layout::Inline)
    }

    /// Every construct one part per line.
    pub fn block() -> Self {
        Self::default()
            .attributes(Layout::Block)
            .lists(Layout::Block)
            .dicts(Layout::Block)
    }

    /// Set the indentation: a number of spaces or a literal string.
    pub fn indent(mut self, indent: impl Into<Indent>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn attributes(mut self, layout: Layout) -> Self {
        self.attributes = layout;
        self
    }

    pub fn lists(mut self, layout: Layout) -> Self {
        self.lists = layout;
        self
    }

    pub fn dicts(mut self, layout: Layout) -> Self {
        self.dicts = layout;
        self
    }

    pub fn children(mut self, layout: Layout) -> Self {
        self.children = layout;
        self
    }

    pub fn list_item_separator(mut self, separator: impl Into<String>) -> Self {
        self.list_item_separator = separator.into();
        self
    }

    pub fn dict_key_separator(mut self, separator: impl Into<String>) -> Self {
        self.dict_key_separator = separator.into();
        self
    }

    pub fn expand_references(mut self, expand: bool) -> Self {
        self.expand_references = expand;
        self
    }
}

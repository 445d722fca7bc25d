//! Parser configuration.

/// Options controlling how source text is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject integer parts with leading zeros (`007`, `-01.5`) instead of
    /// reading them as `7` and `-1.5`.
    pub strict_numbers: bool,

    /// Recognise `(` and `)` as set delimiters. When off they are illegal
    /// characters.
    pub sets: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_numbers: false,
            sets: true,
        }
    }
}

impl ParseOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set leading-zero strictness.
    pub fn strict_numbers(mut self, strict: bool) -> Self {
        self.strict_numbers = strict;
        self
    }

    /// Enable or disable set literals.
    pub fn sets(mut self, enabled: bool) -> Self {
        self.sets = enabled;
        self
    }
}

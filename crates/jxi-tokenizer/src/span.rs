//! Byte ranges into the source text.

/// Half-open byte range `start..end` of a token or error in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span {start}..{end} runs backwards");
        Self { start, end }
    }

    /// Zero-width span at `at`, used for end-of-input positions.
    pub fn empty(at: u32) -> Self {
        Self::new(at, at)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Span from the start of `self` to the end of `other`, whichever order
    /// they come in.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The covered text, clamped to `source`; `None` if the span does not
    /// fall on character boundaries.
    pub fn slice(self, source: &str) -> Option<&str> {
        let end = (self.end as usize).min(source.len());
        source.get((self.start as usize).min(end)..end)
    }
}

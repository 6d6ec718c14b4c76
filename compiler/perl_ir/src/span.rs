//! Source location spans.
//!
//! Compact 8-byte byte-offset ranges shared by tokens, nodes and diagnostics.

use std::fmt;

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from file start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if an offset is within this span.
    ///
    /// The end offset counts as inside so that a cursor placed right after
    /// the last character of a token still resolves to that token.
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// Check if another span is fully contained within this span.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Create a point span (zero-length).
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Convert to a `std::ops::Range`.
    #[inline]
    pub fn to_range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Slice the covered text out of `source`.
    ///
    /// Returns an empty string when the span does not fall on valid
    /// boundaries of `source` (e.g. a span from an older file version).
    #[inline]
    pub fn text(self, source: &str) -> &str {
        source.get(self.to_range()).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 8);
        let b = Span::new(2, 6);
        assert_eq!(a.merge(b), Span::new(2, 8));
    }

    #[test]
    fn test_span_contains_end() {
        let span = Span::new(3, 5);
        assert!(span.contains(3));
        assert!(span.contains(5));
        assert!(!span.contains(6));
    }

    #[test]
    fn test_span_text_out_of_bounds() {
        assert_eq!(Span::new(0, 3).text("my $x"), "my ");
        assert_eq!(Span::new(10, 30).text("short"), "");
    }
}

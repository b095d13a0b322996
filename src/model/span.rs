//! Offset spans into the document's flat content stream.

use serde::{Deserialize, Serialize};

/// A span as reported by the analysis service: `length` characters starting
/// at `offset` in the result's `content` string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Whether this span lies entirely inside `parent`.
    pub fn is_within(&self, parent: &Span) -> bool {
        self.offset >= parent.offset && self.end() <= parent.end()
    }

    /// Whether this span lies entirely inside any of `parents`.
    pub fn is_within_any<'a, I>(&self, parents: I) -> bool
    where
        I: IntoIterator<Item = &'a Span>,
    {
        parents.into_iter().any(|parent| self.is_within(parent))
    }
}

/// Half-open interval `[offset, end)` over the content stream.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SpanBounds {
    pub offset: usize,
    pub end: usize,
}

impl SpanBounds {
    /// Create new bounds. `end` is clamped so that `offset <= end`.
    pub fn new(offset: usize, end: usize) -> Self {
        Self {
            offset,
            end: end.max(offset),
        }
    }

    /// The smallest bounds covering every span, or `None` for an empty list.
    pub fn covering(spans: &[Span]) -> Option<Self> {
        let offset = spans.iter().map(|s| s.offset).min()?;
        let end = spans.iter().map(Span::end).max()?;
        Some(Self::new(offset, end))
    }

    /// Length of the interval.
    pub fn len(&self) -> usize {
        self.end - self.offset
    }

    /// Whether the interval is empty.
    pub fn is_empty(&self) -> bool {
        self.end == self.offset
    }
}

impl From<Span> for SpanBounds {
    fn from(span: Span) -> Self {
        Self::new(span.offset, span.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_containment() {
        let outer = Span::new(10, 20);
        assert!(Span::new(10, 20).is_within(&outer));
        assert!(Span::new(12, 5).is_within(&outer));
        assert!(Span::new(29, 1).is_within(&outer));
        assert!(!Span::new(29, 2).is_within(&outer));
        assert!(!Span::new(9, 2).is_within(&outer));
    }

    #[test]
    fn test_within_any() {
        let claimed = [Span::new(0, 5), Span::new(40, 10)];
        assert!(Span::new(42, 3).is_within_any(&claimed));
        assert!(!Span::new(20, 3).is_within_any(&claimed));
        assert!(!Span::new(0, 1).is_within_any(&[]));
    }

    #[test]
    fn test_covering_bounds() {
        let spans = [Span::new(30, 5), Span::new(4, 2), Span::new(12, 30)];
        let bounds = SpanBounds::covering(&spans).unwrap();
        assert_eq!(bounds, SpanBounds::new(4, 42));
        assert_eq!(bounds.len(), 38);
        assert!(SpanBounds::covering(&[]).is_none());
    }
}

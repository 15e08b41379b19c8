//! Source locations

/// Byte range into a source file, attached to expressions and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span for values synthesized by the compiler rather than written in source
    pub fn synthetic() -> Self {
        Self::default()
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_join() {
        let joined = Span::new(4, 9).to(Span::new(1, 6));
        assert_eq!(joined, Span::new(1, 9));
        assert_eq!(joined.len(), 8);
    }

    #[test]
    fn test_synthetic_span_is_empty() {
        assert!(Span::synthetic().is_empty());
    }
}

//! Diagnostic sink used while emitting instructions
//!
//! Encodings never abort on bad input. They report through a [`Report`] and
//! keep producing bytes, so one pass can surface every error in a unit.

use super::Span;

/// Receiver for errors raised during emission
pub trait Report {
    fn error(&mut self, message: &str, location: Span);
}

/// A single reported error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

/// Collecting [`Report`] implementation
///
/// Once any error is recorded the compilation result must not be used for
/// output, but processing may continue.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter()
    }
}

impl Report for Diagnostics {
    fn error(&mut self, message: &str, location: Span) {
        log::debug!("diagnostic at {}: {}", location, message);
        self.errors.push(Diagnostic {
            message: message.to_string(),
            span: location,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_collect_in_order() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());

        diagnostics.error("first", Span::new(0, 1));
        diagnostics.error("second", Span::new(2, 3));

        assert!(diagnostics.has_errors());
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }
}

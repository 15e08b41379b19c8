//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;
use super::{Diagnostics, Span};

/// Instruction selection error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IselError {
    #[error("invalid operand combination for `{instruction}`")]
    NoMatchingInstruction { instruction: String, span: Span },

    #[error("encoding of `{instruction}` failed at {span}")]
    EncodingFailed { instruction: String, span: Span },

    #[error("malformed instruction `{instruction}`: {reason}")]
    MalformedInstruction { instruction: String, reason: String },

    #[error("unknown register `{name}`")]
    UnknownRegister { name: String },

    #[error("register `{register}` already has a decomposition")]
    DuplicateDecomposition { register: String },

    #[error("expression at {span} cannot be used as an instruction operand")]
    UnresolvableOperand { span: Span },

    #[error("no test-and-branch lowering for `{operator}` at {span}")]
    NoLowering { operator: String, span: Span },
}

impl IselError {
    pub fn no_match(instruction: impl Into<String>, span: Span) -> Self {
        Self::NoMatchingInstruction {
            instruction: instruction.into(),
            span,
        }
    }

    pub fn encoding_failed(instruction: impl Into<String>, span: Span) -> Self {
        Self::EncodingFailed {
            instruction: instruction.into(),
            span,
        }
    }

    pub fn malformed(instruction: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInstruction {
            instruction: instruction.into(),
            reason: reason.into(),
        }
    }

    pub fn no_lowering(operator: impl Into<String>, span: Span) -> Self {
        Self::NoLowering {
            operator: operator.into(),
            span,
        }
    }

    /// Source location the error refers to, if any
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::NoMatchingInstruction { span, .. }
            | Self::EncodingFailed { span, .. }
            | Self::UnresolvableOperand { span }
            | Self::NoLowering { span, .. } => Some(*span),
            Self::MalformedInstruction { .. }
            | Self::UnknownRegister { .. }
            | Self::DuplicateDecomposition { .. } => None,
        }
    }
}

pub type IselResult<T> = Result<T, IselError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &IselError) {
        let diagnostic = match error.span() {
            Some(span) => Diagnostic::error()
                .with_message("Code generation error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(error.to_string())
                ]),
            None => Diagnostic::error().with_message(format!("Backend error: {}", error)),
        };

        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
    }

    /// Render every error collected during emission
    pub fn report_diagnostics(&self, file_id: usize, diagnostics: &Diagnostics) {
        for reported in diagnostics.iter() {
            let diagnostic = Diagnostic::error()
                .with_message("Encoding error")
                .with_labels(vec![
                    Label::primary(file_id, reported.span.start..reported.span.end)
                        .with_message(reported.message.clone())
                ]);

            let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
        }
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_span() {
        let err = IselError::no_match("a = x", Span::new(3, 8));
        assert_eq!(err.span(), Some(Span::new(3, 8)));
        assert_eq!(err.to_string(), "invalid operand combination for `a = x`");

        let err = IselError::malformed("nop", "slot 0 out of range");
        assert_eq!(err.span(), None);
    }
}

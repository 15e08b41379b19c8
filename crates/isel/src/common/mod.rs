//! Common infrastructure shared by the engine, the backends and the driver

mod error;
mod report;
mod span;

pub use error::{DiagnosticReporter, IselError, IselResult};
pub use report::{Diagnostic, Diagnostics, Report};
pub use span::Span;

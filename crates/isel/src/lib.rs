//! ISEL - retargetable instruction selection and machine code emission
//!
//! This library turns resolved operands into machine code bytes by matching
//! them against a per-target table of instruction signatures. It ships with a
//! complete SPC700 (SNES audio CPU) table.
//!
//! ## Architecture
//!
//! The library is organized into:
//! - **Common** (`common/`): spans, the diagnostic sink, errors
//! - **Types** (`types/`): builtin definitions and value types
//! - **IR** (`ir/`): typed expression trees supplied by the front end
//! - **ISel** (`isel/`): operand patterns, instruction table, encodings
//! - **Backends** (`backend/`): target platforms (SPC700)
//! - **Driver** (`driver/`): emission session, the caller side of selection

pub mod common;
pub mod types;
pub mod ir;
pub mod isel;
pub mod backend;
pub mod driver;

// Re-exports for convenience
pub use common::{DiagnosticReporter, Diagnostics, IselError, IselResult, Report, Span};
pub use backend::{Platform, PlatformRegistry, Spc700Platform};
pub use driver::{Session, SessionConfig};

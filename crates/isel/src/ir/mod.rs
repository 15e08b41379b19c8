//! Typed expression trees handed to the backend
//!
//! Parsing, scoping and type checking happen upstream. By the time an
//! expression reaches instruction selection its identifiers are resolved to
//! register definitions and its addresses folded to integers.

mod expr;

pub use expr::{BinaryOp, ExprKind, Expression, UnaryOp};

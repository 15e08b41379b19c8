//! Definitions and value types consumed by the selection engine
//!
//! The surrounding compiler owns symbol resolution and type checking. The
//! engine only needs opaque, comparable identities for registers, flags and
//! intrinsics, plus enough of a value's type to know its sign class.

mod definition;
mod value_type;

pub use definition::{Definition, DefinitionKind, Definitions, IntrinsicKind};
pub use value_type::ValueType;

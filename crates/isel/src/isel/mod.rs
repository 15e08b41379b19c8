//! Instruction selection engine
//!
//! Target independent: operand patterns, the instruction table, encoding
//! rules and the records condition lowering hands back to its caller.

mod branch;
mod composite;
pub mod encoding;
mod operand;
mod pattern;
mod signature;
mod table;

pub use branch::{PlatformBranch, TestAndBranch};
pub use composite::{CompositeRegisters, RegisterFile};
pub use encoding::{Bank, CaptureLists, Encoding};
pub use operand::{Operand, OperandDisplay};
pub use pattern::{CaptureList, OperandPattern, PatternDisplay};
pub use signature::{
    BranchKind, InstructionOptions, InstructionSignature, InstructionType, InstructionTypeDisplay, SignatureDisplay,
    Slot,
};
pub use table::{Instruction, InstructionTable, Selection};

//! Instruction signatures and per-registration options

use crate::ir::{BinaryOp, UnaryOp};
use crate::types::{Definition, Definitions};
use super::OperandPattern;

/// Control transfer kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Goto,
    Call,
    Return,
    IrqReturn,
}

impl std::fmt::Display for BranchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchKind::Goto => write!(f, "goto"),
            BranchKind::Call => write!(f, "call"),
            BranchKind::Return => write!(f, "return"),
            BranchKind::IrqReturn => write!(f, "irqreturn"),
        }
    }
}

/// Operation tag of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionType {
    Binary(BinaryOp),
    Unary(UnaryOp),
    Branch(BranchKind),
    /// Intrinsic called for its effect
    VoidIntrinsic(Definition),
    /// Intrinsic whose result is stored into its first operand
    LoadIntrinsic(Definition),
}

impl From<BinaryOp> for InstructionType {
    fn from(op: BinaryOp) -> Self {
        InstructionType::Binary(op)
    }
}

impl From<UnaryOp> for InstructionType {
    fn from(op: UnaryOp) -> Self {
        InstructionType::Unary(op)
    }
}

impl From<BranchKind> for InstructionType {
    fn from(kind: BranchKind) -> Self {
        InstructionType::Branch(kind)
    }
}

impl InstructionType {
    pub fn display<'a>(&'a self, definitions: &'a Definitions) -> InstructionTypeDisplay<'a> {
        InstructionTypeDisplay { ty: self, definitions }
    }
}

pub struct InstructionTypeDisplay<'a> {
    ty: &'a InstructionType,
    definitions: &'a Definitions,
}

impl std::fmt::Display for InstructionTypeDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ty {
            InstructionType::Binary(op) => write!(f, "{}", op),
            InstructionType::Unary(op) => write!(f, "{}", op),
            InstructionType::Branch(kind) => write!(f, "{}", kind),
            InstructionType::VoidIntrinsic(def) | InstructionType::LoadIntrinsic(def) => {
                write!(f, "{}", self.definitions.name(*def))
            }
        }
    }
}

/// Operation, distance hint and operand shapes of one table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSignature {
    pub ty: InstructionType,
    /// Separates short self-relative forms (0) from long absolute forms
    pub distance_hint: usize,
    pub operands: Vec<OperandPattern>,
}

impl InstructionSignature {
    pub fn new(ty: impl Into<InstructionType>, distance_hint: usize, operands: Vec<OperandPattern>) -> Self {
        Self {
            ty: ty.into(),
            distance_hint,
            operands,
        }
    }

    pub fn arity(&self) -> usize {
        self.operands.len()
    }

    pub fn display<'a>(&'a self, definitions: &'a Definitions) -> SignatureDisplay<'a> {
        SignatureDisplay { signature: self, definitions }
    }
}

pub struct SignatureDisplay<'a> {
    signature: &'a InstructionSignature,
    definitions: &'a Definitions,
}

impl std::fmt::Display for SignatureDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let defs = self.definitions;
        write!(f, "{}", self.signature.ty.display(defs))?;
        for (i, operand) in self.signature.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand.display(defs))?;
        }
        if self.signature.distance_hint != 0 {
            write!(f, " [far {}]", self.signature.distance_hint)?;
        }
        Ok(())
    }
}

/// Reference to one captured operand: `captures[operand][capture]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Operand position in the signature
    pub operand: usize,
    /// Index into that position's capture list
    pub capture: usize,
}

impl Slot {
    pub fn new(operand: usize, capture: usize) -> Self {
        Self { operand, capture }
    }

    /// First capture of an operand position
    pub fn at(operand: usize) -> Self {
        Self { operand, capture: 0 }
    }
}

/// Per-registration parameters bound to an encoding
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstructionOptions {
    /// Fixed opcode bytes emitted before any operand bytes
    pub opcode: Vec<u8>,
    /// Logical parameters of the encoding, in the order the encoding reads them
    pub slots: Vec<Slot>,
    /// Flags whose value is clobbered by the instruction
    pub invalidated: Vec<Definition>,
}

impl InstructionOptions {
    pub fn new(opcode: impl Into<Vec<u8>>, slots: impl Into<Vec<Slot>>) -> Self {
        Self {
            opcode: opcode.into(),
            slots: slots.into(),
            invalidated: Vec::new(),
        }
    }

    /// Opcode with no parameters
    pub fn implicit(opcode: impl Into<Vec<u8>>) -> Self {
        Self::new(opcode, Vec::new())
    }

    pub fn invalidating(mut self, flags: impl Into<Vec<Definition>>) -> Self {
        self.invalidated = flags.into();
        self
    }

    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }
}

//! Concrete instruction operands
//!
//! An [`Operand`] is what an expression looks like once the front end has
//! resolved it. Its shape mirrors [`OperandPattern`](super::OperandPattern)
//! so that matching is a structural walk over both trees.

use crate::ir::{ExprKind, Expression, UnaryOp};
use crate::types::{Definition, Definitions};

/// Resolved operand of an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Definition),
    Boolean(bool),
    Integer(i128),
    Dereference {
        far: bool,
        address: Box<Operand>,
        size: usize,
    },
    Index {
        far: bool,
        base: Box<Operand>,
        index: Box<Operand>,
        scale: usize,
        size: usize,
    },
    BitIndex {
        container: Box<Operand>,
        bit: Box<Operand>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Operand>,
    },
}

impl Operand {
    /// Resolve an expression into an operand
    ///
    /// Returns `None` for expressions that still contain computation
    /// (unfolded binary operators), which no addressing mode can express.
    pub fn from_expression(expr: &Expression) -> Option<Operand> {
        let operand = match &expr.kind {
            ExprKind::IntegerLiteral(value) => Operand::Integer(*value),
            ExprKind::BooleanLiteral(value) => Operand::Boolean(*value),
            ExprKind::Register(definition) => Operand::Register(*definition),
            ExprKind::Unary { op, operand } => Operand::Unary {
                op: *op,
                operand: Box::new(Self::from_expression(operand)?),
            },
            ExprKind::Dereference { far, address, size } => Operand::Dereference {
                far: *far,
                address: Box::new(Self::from_expression(address)?),
                size: *size,
            },
            ExprKind::Index { far, base, index, scale, size } => Operand::Index {
                far: *far,
                base: Box::new(Self::from_expression(base)?),
                index: Box::new(Self::from_expression(index)?),
                scale: *scale,
                size: *size,
            },
            ExprKind::BitIndex { container, bit } => Operand::BitIndex {
                container: Box::new(Self::from_expression(container)?),
                bit: Box::new(Self::from_expression(bit)?),
            },
            ExprKind::Binary { .. } => return None,
        };
        Some(operand)
    }

    // ==================== Builders ====================

    pub fn deref(address: Operand, size: usize) -> Self {
        Operand::Dereference { far: false, address: Box::new(address), size }
    }

    pub fn index(base: Operand, index: Operand, size: usize) -> Self {
        Operand::Index {
            far: false,
            base: Box::new(base),
            index: Box::new(index),
            scale: 1,
            size,
        }
    }

    pub fn bit_index(container: Operand, bit: Operand) -> Self {
        Operand::BitIndex { container: Box::new(container), bit: Box::new(bit) }
    }

    pub fn unary(op: UnaryOp, operand: Operand) -> Self {
        Operand::Unary { op, operand: Box::new(operand) }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Operand::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Display adapter that prints register names
    pub fn display<'a>(&'a self, definitions: &'a Definitions) -> OperandDisplay<'a> {
        OperandDisplay { operand: self, definitions }
    }
}

pub struct OperandDisplay<'a> {
    operand: &'a Operand,
    definitions: &'a Definitions,
}

impl std::fmt::Display for OperandDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let defs = self.definitions;
        match self.operand {
            Operand::Register(r) => write!(f, "{}", defs.name(*r)),
            Operand::Boolean(b) => write!(f, "{}", b),
            Operand::Integer(n) if *n > 9 => write!(f, "0x{:X}", n),
            Operand::Integer(n) => write!(f, "{}", n),
            Operand::Dereference { far, address, size } => {
                let kind = if *far { "far " } else { "" };
                write!(f, "*({} as {}*u{})", address.display(defs), kind, size * 8)
            }
            Operand::Index { base, index, .. } => {
                write!(f, "{}[{}]", base.display(defs), index.display(defs))
            }
            Operand::BitIndex { container, bit } => {
                write!(f, "{} $ {}", container.display(defs), bit.display(defs))
            }
            Operand::Unary { op: op @ (UnaryOp::PostIncrement | UnaryOp::PostDecrement), operand } => {
                write!(f, "{}{}", operand.display(defs), op)
            }
            Operand::Unary { op, operand } => write!(f, "{}{}", op, operand.display(defs)),
        }
    }
}

//! Expression tree and operator definitions

use crate::common::Span;
use crate::types::Definition;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Assignment,
    Addition,
    AdditionWithCarry,
    Subtraction,
    SubtractionWithCarry,
    Multiplication,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    LogicalLeftShift,
    LogicalRightShift,
    LeftRotateWithCarry,
    RightRotateWithCarry,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Assignment => write!(f, "="),
            BinaryOp::Addition => write!(f, "+"),
            BinaryOp::AdditionWithCarry => write!(f, "+#"),
            BinaryOp::Subtraction => write!(f, "-"),
            BinaryOp::SubtractionWithCarry => write!(f, "-#"),
            BinaryOp::Multiplication => write!(f, "*"),
            BinaryOp::BitwiseAnd => write!(f, "&"),
            BinaryOp::BitwiseOr => write!(f, "|"),
            BinaryOp::BitwiseXor => write!(f, "^"),
            BinaryOp::LeftShift => write!(f, "<<"),
            BinaryOp::LogicalLeftShift => write!(f, "<<<"),
            BinaryOp::LogicalRightShift => write!(f, ">>>"),
            BinaryOp::LeftRotateWithCarry => write!(f, "<<<<#"),
            BinaryOp::RightRotateWithCarry => write!(f, ">>>>#"),
            BinaryOp::Equal => write!(f, "=="),
            BinaryOp::NotEqual => write!(f, "!="),
            BinaryOp::LessThan => write!(f, "<"),
            BinaryOp::LessThanOrEqual => write!(f, "<="),
            BinaryOp::GreaterThan => write!(f, ">"),
            BinaryOp::GreaterThanOrEqual => write!(f, ">="),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    BitwiseNegation,
    SignedNegation,
    LogicalNegation,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => write!(f, "++"),
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => write!(f, "--"),
            UnaryOp::BitwiseNegation => write!(f, "~"),
            UnaryOp::SignedNegation => write!(f, "-"),
            UnaryOp::LogicalNegation => write!(f, "!"),
        }
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Integer constant, including folded addresses and label values
    IntegerLiteral(i128),
    BooleanLiteral(bool),
    /// Identifier resolved to a builtin register or flag
    Register(Definition),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    /// `*(address as *T)`, `size` is the access width in bytes
    Dereference {
        far: bool,
        address: Box<Expression>,
        size: usize,
    },
    /// `base[index]`
    Index {
        far: bool,
        base: Box<Expression>,
        index: Box<Expression>,
        scale: usize,
        size: usize,
    },
    /// `container $ bit`
    BitIndex {
        container: Box<Expression>,
        bit: Box<Expression>,
    },
    /// Binary operation left unfolded by the front end
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    // ==================== Builders ====================

    pub fn integer(value: i128) -> Self {
        Self::new(ExprKind::IntegerLiteral(value), Span::synthetic())
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::BooleanLiteral(value), Span::synthetic())
    }

    pub fn register(definition: Definition) -> Self {
        Self::new(ExprKind::Register(definition), Span::synthetic())
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        let span = operand.span;
        Self::new(ExprKind::Unary { op, operand: Box::new(operand) }, span)
    }

    pub fn deref(address: Expression, size: usize) -> Self {
        let span = address.span;
        Self::new(
            ExprKind::Dereference { far: false, address: Box::new(address), size },
            span,
        )
    }

    pub fn index(base: Expression, index: Expression, size: usize) -> Self {
        let span = base.span.to(index.span);
        Self::new(
            ExprKind::Index {
                far: false,
                base: Box::new(base),
                index: Box::new(index),
                scale: 1,
                size,
            },
            span,
        )
    }

    pub fn bit_index(container: Expression, bit: Expression) -> Self {
        let span = container.span.to(bit.span);
        Self::new(
            ExprKind::BitIndex { container: Box::new(container), bit: Box::new(bit) },
            span,
        )
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        let span = left.span.to(right.span);
        Self::new(
            ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
            span,
        )
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    // ==================== Queries ====================

    pub fn as_integer(&self) -> Option<i128> {
        match self.kind {
            ExprKind::IntegerLiteral(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_zero_literal(&self) -> bool {
        self.as_integer() == Some(0)
    }

    pub fn as_register(&self) -> Option<Definition> {
        match self.kind {
            ExprKind::Register(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn as_unary(&self) -> Option<(UnaryOp, &Expression)> {
        match &self.kind {
            ExprKind::Unary { op, operand } => Some((*op, operand)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_join_spans() {
        let base = Expression::integer(0x10).with_span(Span::new(2, 6));
        let index = Expression::integer(1).with_span(Span::new(7, 8));
        let expr = Expression::index(base, index, 1);
        assert_eq!(expr.span, Span::new(2, 8));
    }

    #[test]
    fn test_queries() {
        let zero = Expression::integer(0);
        assert!(zero.is_zero_literal());
        assert!(!Expression::integer(5).is_zero_literal());

        let dec = Expression::unary(UnaryOp::PreDecrement, Expression::integer(3));
        let (op, inner) = dec.as_unary().unwrap();
        assert_eq!(op, UnaryOp::PreDecrement);
        assert_eq!(inner.as_integer(), Some(3));
    }
}

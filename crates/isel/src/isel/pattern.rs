//! Operand patterns and the structural matcher
//!
//! A pattern describes one legal operand shape (an addressing mode). Patterns
//! are built once during platform setup and cloned into every signature that
//! uses them. `Capture` is the only node whose matched operand is kept for
//! the encoder.

use crate::ir::UnaryOp;
use crate::types::{Definition, Definitions};
use super::Operand;

/// Operands retained by `Capture` nodes, in depth-first left-to-right order
pub type CaptureList<'o> = Vec<&'o Operand>;

/// Legal operand shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandPattern {
    /// Exactly this register or flag
    Register(Definition),
    /// A boolean literal equal to this value
    Boolean(bool),
    /// Integer in `min..=max`
    IntegerRange { min: i128, max: i128 },
    /// Integer greater than or equal to the bound
    IntegerAtLeast(i128),
    /// Memory access through an address matching `inner`, `size` bytes wide
    Dereference {
        far: bool,
        inner: Box<OperandPattern>,
        size: usize,
    },
    /// `base[index]` where `index` is a fixed register pattern
    Index {
        far: bool,
        base: Box<OperandPattern>,
        index: Box<OperandPattern>,
        scale: usize,
        size: usize,
    },
    /// Single bit `container $ bit`
    BitIndex {
        container: Box<OperandPattern>,
        bit: Box<OperandPattern>,
    },
    /// Operand wrapped in a unary operator
    Unary {
        op: UnaryOp,
        inner: Box<OperandPattern>,
    },
    /// Matches like `inner` and records the matched operand
    Capture(Box<OperandPattern>),
}

impl OperandPattern {
    // ==================== Constructors ====================

    pub fn range(min: i128, max: i128) -> Self {
        Self::IntegerRange { min, max }
    }

    pub fn exactly(value: i128) -> Self {
        Self::IntegerRange { min: value, max: value }
    }

    pub fn at_least(min: i128) -> Self {
        Self::IntegerAtLeast(min)
    }

    pub fn deref(inner: OperandPattern, size: usize) -> Self {
        Self::Dereference { far: false, inner: Box::new(inner), size }
    }

    pub fn index(base: OperandPattern, index: OperandPattern, size: usize) -> Self {
        Self::Index {
            far: false,
            base: Box::new(base),
            index: Box::new(index),
            scale: 1,
            size,
        }
    }

    pub fn bit_index(container: OperandPattern, bit: OperandPattern) -> Self {
        Self::BitIndex { container: Box::new(container), bit: Box::new(bit) }
    }

    pub fn unary(op: UnaryOp, inner: OperandPattern) -> Self {
        Self::Unary { op, inner: Box::new(inner) }
    }

    pub fn capture(inner: OperandPattern) -> Self {
        Self::Capture(Box::new(inner))
    }

    // ==================== Matching ====================

    /// Match a concrete operand, returning its captures on success
    ///
    /// A mismatch is an ordinary outcome during candidate search and carries
    /// no diagnostic.
    pub fn match_operand<'o>(&self, operand: &'o Operand) -> Option<CaptureList<'o>> {
        let mut captures = Vec::new();
        self.match_into(operand, &mut captures).then_some(captures)
    }

    fn match_into<'o>(&self, operand: &'o Operand, captures: &mut CaptureList<'o>) -> bool {
        match (self, operand) {
            (Self::Register(expected), Operand::Register(actual)) => expected == actual,
            (Self::Boolean(expected), Operand::Boolean(actual)) => expected == actual,
            (Self::IntegerRange { min, max }, Operand::Integer(value)) => (*min..=*max).contains(value),
            (Self::IntegerAtLeast(min), Operand::Integer(value)) => value >= min,
            (
                Self::Dereference { far, inner, size },
                Operand::Dereference { far: op_far, address, size: op_size },
            ) => far == op_far && size == op_size && inner.match_into(address, captures),
            (
                Self::Index { far, base, index, scale, size },
                Operand::Index { far: op_far, base: op_base, index: op_index, scale: op_scale, size: op_size },
            ) => {
                far == op_far
                    && scale == op_scale
                    && size == op_size
                    && base.match_into(op_base, captures)
                    && index.match_into(op_index, captures)
            }
            (Self::BitIndex { container, bit }, Operand::BitIndex { container: op_container, bit: op_bit }) => {
                container.match_into(op_container, captures) && bit.match_into(op_bit, captures)
            }
            (Self::Unary { op, inner }, Operand::Unary { op: op_actual, operand: op_inner }) => {
                op == op_actual && inner.match_into(op_inner, captures)
            }
            (Self::Capture(inner), _) => {
                let mark = captures.len();
                captures.push(operand);
                if inner.match_into(operand, captures) {
                    true
                } else {
                    captures.truncate(mark);
                    false
                }
            }
            _ => false,
        }
    }

    /// Number of `Capture` nodes in the tree
    pub fn capture_count(&self) -> usize {
        match self {
            Self::Register(_) | Self::Boolean(_) | Self::IntegerRange { .. } | Self::IntegerAtLeast(_) => 0,
            Self::Dereference { inner, .. } | Self::Unary { inner, .. } => inner.capture_count(),
            Self::Index { base, index, .. } => base.capture_count() + index.capture_count(),
            Self::BitIndex { container, bit } => container.capture_count() + bit.capture_count(),
            Self::Capture(inner) => 1 + inner.capture_count(),
        }
    }

    /// Display adapter that prints register names
    pub fn display<'a>(&'a self, definitions: &'a Definitions) -> PatternDisplay<'a> {
        PatternDisplay { pattern: self, definitions }
    }
}

pub struct PatternDisplay<'a> {
    pattern: &'a OperandPattern,
    definitions: &'a Definitions,
}

impl std::fmt::Display for PatternDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let defs = self.definitions;
        match self.pattern {
            OperandPattern::Register(r) => write!(f, "{}", defs.name(*r)),
            OperandPattern::Boolean(b) => write!(f, "{}", b),
            OperandPattern::IntegerRange { min, max } if min == max => write!(f, "0x{:X}", min),
            OperandPattern::IntegerRange { min, max } => write!(f, "0x{:X}..=0x{:X}", min, max),
            OperandPattern::IntegerAtLeast(min) => write!(f, "{}..", min),
            OperandPattern::Dereference { far, inner, size } => {
                let kind = if *far { "far " } else { "" };
                write!(f, "*({} as {}*u{})", inner.display(defs), kind, size * 8)
            }
            OperandPattern::Index { base, index, .. } => {
                write!(f, "{}[{}]", base.display(defs), index.display(defs))
            }
            OperandPattern::BitIndex { container, bit } => {
                write!(f, "{} $ {}", container.display(defs), bit.display(defs))
            }
            OperandPattern::Unary { op: op @ (UnaryOp::PostIncrement | UnaryOp::PostDecrement), inner } => {
                write!(f, "{}{}", inner.display(defs), op)
            }
            OperandPattern::Unary { op, inner } => write!(f, "{}{}", op, inner.display(defs)),
            OperandPattern::Capture(inner) => write!(f, "<{}>", inner.display(defs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;
    use pretty_assertions::assert_eq;

    fn registers() -> (Definitions, Definition, Definition) {
        let mut defs = Definitions::new();
        let a = defs.add_register("a", ValueType::u8());
        let x = defs.add_register("x", ValueType::u8());
        (defs, a, x)
    }

    #[test]
    fn test_register_matches_exact_definition() {
        let (_, a, x) = registers();
        let pattern = OperandPattern::Register(a);

        assert!(pattern.match_operand(&Operand::Register(a)).is_some());
        assert!(pattern.match_operand(&Operand::Register(x)).is_none());
        assert!(pattern.match_operand(&Operand::Integer(0)).is_none());
    }

    #[test]
    fn test_integer_bounds_are_inclusive() {
        let pattern = OperandPattern::range(0, 0xFF);
        assert!(pattern.match_operand(&Operand::Integer(0)).is_some());
        assert!(pattern.match_operand(&Operand::Integer(0xFF)).is_some());
        assert!(pattern.match_operand(&Operand::Integer(0x100)).is_none());
        assert!(pattern.match_operand(&Operand::Integer(-1)).is_none());

        let at_least = OperandPattern::at_least(1);
        assert!(at_least.match_operand(&Operand::Integer(0)).is_none());
        assert!(at_least.match_operand(&Operand::Integer(1 << 40)).is_some());
    }

    #[test]
    fn test_boolean_pattern() {
        let pattern = OperandPattern::Boolean(true);
        assert!(pattern.match_operand(&Operand::Boolean(true)).is_some());
        assert!(pattern.match_operand(&Operand::Boolean(false)).is_none());
    }

    #[test]
    fn test_dereference_checks_access_size() {
        let pattern = OperandPattern::deref(OperandPattern::capture(OperandPattern::range(0, 0xFF)), 1);

        let byte = Operand::deref(Operand::Integer(0x12), 1);
        let word = Operand::deref(Operand::Integer(0x12), 2);

        let captures = pattern.match_operand(&byte).unwrap();
        assert_eq!(captures, vec![&Operand::Integer(0x12)]);
        assert!(pattern.match_operand(&word).is_none());
    }

    #[test]
    fn test_index_requires_fixed_register() {
        let (_, a, x) = registers();
        let pattern = OperandPattern::index(
            OperandPattern::capture(OperandPattern::range(0, 0xFFFF)),
            OperandPattern::Register(x),
            1,
        );

        let by_x = Operand::index(Operand::Integer(0x1234), Operand::Register(x), 1);
        let by_a = Operand::index(Operand::Integer(0x1234), Operand::Register(a), 1);

        assert_eq!(pattern.match_operand(&by_x), Some(vec![&Operand::Integer(0x1234)]));
        assert_eq!(pattern.match_operand(&by_a), None);
    }

    #[test]
    fn test_capture_order_is_depth_first() {
        // !(*(abs) $ bit) with captures on abs and bit
        let pattern = OperandPattern::unary(
            UnaryOp::LogicalNegation,
            OperandPattern::bit_index(
                OperandPattern::deref(OperandPattern::capture(OperandPattern::range(0, 0xFFFF)), 1),
                OperandPattern::capture(OperandPattern::range(0, 7)),
            ),
        );
        let operand = Operand::unary(
            UnaryOp::LogicalNegation,
            Operand::bit_index(Operand::deref(Operand::Integer(0x1FFF), 1), Operand::Integer(7)),
        );

        let captures = pattern.match_operand(&operand).unwrap();
        assert_eq!(captures, vec![&Operand::Integer(0x1FFF), &Operand::Integer(7)]);
        assert_eq!(pattern.capture_count(), 2);

        // Same tree twice, same result
        assert_eq!(pattern.match_operand(&operand), Some(captures));
    }

    #[test]
    fn test_nested_capture_records_outer_first() {
        let pattern = OperandPattern::capture(OperandPattern::deref(
            OperandPattern::capture(OperandPattern::range(0, 0xFF)),
            1,
        ));
        let operand = Operand::deref(Operand::Integer(5), 1);

        let captures = pattern.match_operand(&operand).unwrap();
        assert_eq!(captures, vec![&operand, &Operand::Integer(5)]);
    }

    #[test]
    fn test_unary_operator_must_match() {
        let (_, _, x) = registers();
        let pattern = OperandPattern::deref(OperandPattern::unary(UnaryOp::PostIncrement, OperandPattern::Register(x)), 1);

        let post_inc = Operand::deref(Operand::unary(UnaryOp::PostIncrement, Operand::Register(x)), 1);
        let pre_inc = Operand::deref(Operand::unary(UnaryOp::PreIncrement, Operand::Register(x)), 1);

        assert_eq!(pattern.match_operand(&post_inc), Some(vec![]));
        assert_eq!(pattern.match_operand(&pre_inc), None);
    }

    #[test]
    fn test_pattern_display() {
        let (defs, _, x) = registers();
        let pattern = OperandPattern::index(
            OperandPattern::capture(OperandPattern::range(0, 0xFF)),
            OperandPattern::Register(x),
            1,
        );
        assert_eq!(pattern.display(&defs).to_string(), "<0x0..=0xFF>[x]");
    }
}

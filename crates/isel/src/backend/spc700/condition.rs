//! Comparison lowering
//!
//! Every comparison becomes `cmp left, right` followed by flag tests, except
//! for the two fused forms the SPC700 offers:
//!
//! - `--x != 0` becomes `dbnz x, dest`
//! - `a != m` becomes `cbne m, dest` when `m` is direct page or direct page
//!   indexed by x and the branch is short

use log::trace;
use crate::ir::{BinaryOp, Expression, UnaryOp};
use crate::isel::{InstructionType, Operand, PlatformBranch, TestAndBranch};
use crate::types::ValueType;
use super::{Spc700Platform, SHORT};

/// Stand-in destination for probing fused branch forms. Only its shape
/// matters: any value accepted by a 16-bit branch target pattern.
const TRIAL_DESTINATION: i128 = 0x1234;

impl Spc700Platform {
    pub(super) fn lower_comparison<'e>(
        &self,
        ty: ValueType,
        op: BinaryOp,
        left: &'e Expression,
        right: &'e Expression,
        distance_hint: usize,
    ) -> Option<TestAndBranch<'e>> {
        let zero = self.registers.zero;
        let negative = self.registers.negative;
        let carry = self.registers.carry;
        let signed_zero = ty.is_signed() && right.is_zero_literal();

        let branches = match op {
            BinaryOp::Equal | BinaryOp::NotEqual => {
                if let Some(fused) = self.fused_equality(op, left, right, distance_hint) {
                    return Some(fused);
                }
                vec![PlatformBranch::new(zero, op == BinaryOp::Equal, true)]
            }
            _ if !ty.is_integer() => return None,
            _ if ty.is_signed() && !signed_zero => return None,
            BinaryOp::LessThan | BinaryOp::GreaterThanOrEqual if signed_zero => {
                vec![PlatformBranch::new(negative, op == BinaryOp::LessThan, true)]
            }
            BinaryOp::LessThan | BinaryOp::GreaterThanOrEqual => {
                vec![PlatformBranch::new(carry, op == BinaryOp::GreaterThanOrEqual, true)]
            }
            BinaryOp::LessThanOrEqual if signed_zero => vec![
                PlatformBranch::new(zero, true, true),
                PlatformBranch::new(negative, true, true),
            ],
            BinaryOp::LessThanOrEqual => vec![
                PlatformBranch::new(zero, true, true),
                PlatformBranch::new(carry, false, true),
            ],
            BinaryOp::GreaterThan if signed_zero => vec![
                PlatformBranch::new(zero, true, false),
                PlatformBranch::new(negative, false, true),
            ],
            BinaryOp::GreaterThan => vec![
                PlatformBranch::new(zero, true, false),
                PlatformBranch::new(carry, true, true),
            ],
            _ => return None,
        };

        trace!("lowering `{}` on {} to cmp with {} flag test(s)", op, ty, branches.len());
        Some(TestAndBranch::new(
            InstructionType::VoidIntrinsic(self.intrinsics.cmp),
            vec![left, right],
            branches,
        ))
    }

    fn fused_equality<'e>(
        &self,
        op: BinaryOp,
        left: &'e Expression,
        right: &'e Expression,
        distance_hint: usize,
    ) -> Option<TestAndBranch<'e>> {
        if op != BinaryOp::NotEqual {
            return None;
        }

        // --x != 0
        if let Some((UnaryOp::PreDecrement, inner)) = left.as_unary() {
            let dbnz = InstructionType::VoidIntrinsic(self.intrinsics.dec_branch_not_zero);
            if right.is_zero_literal() && self.can_branch(dbnz, distance_hint, &[inner]) {
                trace!("lowering --x != 0 to dec_branch_not_zero");
                return Some(TestAndBranch::new(dbnz, vec![inner], Vec::new()));
            }
        }

        // a != m, short only
        if distance_hint == SHORT && left.as_register() == Some(self.registers.a) {
            let cbne = InstructionType::VoidIntrinsic(self.intrinsics.cmp_branch_not_equal);
            if self.can_branch(cbne, SHORT, &[left, right]) {
                trace!("lowering a != m to cmp_branch_not_equal");
                return Some(TestAndBranch::new(cbne, vec![left, right], Vec::new()));
            }
        }

        None
    }

    /// Shape-only trial: would `ty(operands.., dest)` select at this distance?
    fn can_branch(&self, ty: InstructionType, distance_hint: usize, operands: &[&Expression]) -> bool {
        let resolved: Option<Vec<Operand>> = operands
            .iter()
            .map(|expr| Operand::from_expression(expr))
            .chain(std::iter::once(Some(Operand::Integer(TRIAL_DESTINATION))))
            .collect();
        resolved.is_some_and(|operands| self.instructions.can_select(ty, distance_hint, &operands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Platform;
    use crate::backend::spc700::LONG;
    use pretty_assertions::assert_eq;

    fn platform() -> Spc700Platform {
        Spc700Platform::new().unwrap()
    }

    fn dp(address: i128) -> Expression {
        Expression::deref(Expression::integer(address), 1)
    }

    fn flags(plan: &TestAndBranch<'_>) -> Vec<(crate::types::Definition, bool, bool)> {
        plan.branches.iter().map(|b| (b.flag, b.value, b.success)).collect()
    }

    #[test]
    fn test_equality() {
        let p = platform();
        let regs = *p.registers();
        let cmp = InstructionType::VoidIntrinsic(p.intrinsics().cmp);
        let x = Expression::register(regs.x);
        let five = Expression::integer(5);

        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::Equal, &x, &five, SHORT).unwrap();
        assert_eq!(plan.ty, cmp);
        assert_eq!(plan.operands, vec![&x, &five]);
        assert_eq!(flags(&plan), vec![(regs.zero, true, true)]);

        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &x, &five, SHORT).unwrap();
        assert_eq!(flags(&plan), vec![(regs.zero, false, true)]);
    }

    #[test]
    fn test_dec_branch_fusion() {
        let p = platform();
        let regs = *p.registers();
        let dbnz = InstructionType::VoidIntrinsic(p.intrinsics().dec_branch_not_zero);
        let counter = dp(0x10);
        let decrement = Expression::unary(UnaryOp::PreDecrement, counter.clone());
        let zero = Expression::integer(0);

        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &decrement, &zero, SHORT).unwrap();
        assert_eq!(plan.ty, dbnz);
        assert_eq!(plan.operands, vec![&counter]);
        assert!(plan.is_fused());

        let y = Expression::unary(UnaryOp::PreDecrement, Expression::register(regs.y));
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &y, &zero, SHORT).unwrap();
        assert_eq!(plan.ty, dbnz);

        // not a zero test
        let five = Expression::integer(5);
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &decrement, &five, SHORT).unwrap();
        assert_ne!(plan.ty, dbnz);

        // == never fuses
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::Equal, &decrement, &zero, SHORT).unwrap();
        assert_ne!(plan.ty, dbnz);

        // no dbnz form for x
        let x = Expression::unary(UnaryOp::PreDecrement, Expression::register(regs.x));
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &x, &zero, SHORT).unwrap();
        assert_ne!(plan.ty, dbnz);

        // long distance fuses too, through the dbnz-over-jmp forms
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &decrement, &zero, LONG).unwrap();
        assert_eq!(plan.ty, dbnz);
        assert_eq!(plan.operands, vec![&counter]);
        assert!(plan.is_fused());
    }

    #[test]
    fn test_compare_branch_fusion() {
        let p = platform();
        let regs = *p.registers();
        let cbne = InstructionType::VoidIntrinsic(p.intrinsics().cmp_branch_not_equal);
        let a = Expression::register(regs.a);
        let x = Expression::register(regs.x);
        let mem = dp(0x40);

        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &a, &mem, SHORT).unwrap();
        assert_eq!(plan.ty, cbne);
        assert_eq!(plan.operands, vec![&a, &mem]);

        let indexed = Expression::index(Expression::integer(0x40), x.clone(), 1);
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &a, &indexed, SHORT).unwrap();
        assert_eq!(plan.ty, cbne);

        // immediate has no cbne form
        let imm = Expression::integer(3);
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &a, &imm, SHORT).unwrap();
        assert_ne!(plan.ty, cbne);

        // only the accumulator
        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &x, &mem, SHORT).unwrap();
        assert_ne!(plan.ty, cbne);

        let plan = p.test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &a, &mem, LONG).unwrap();
        assert_ne!(plan.ty, cbne);
    }

    #[test]
    fn test_unsigned_ordering() {
        let p = platform();
        let regs = *p.registers();
        let a = Expression::register(regs.a);
        let mem = dp(0x40);
        let u8 = ValueType::u8();

        let lower = |op| flags(&p.test_and_branch(u8, op, &a, &mem, SHORT).unwrap());
        assert_eq!(lower(BinaryOp::LessThan), vec![(regs.carry, false, true)]);
        assert_eq!(lower(BinaryOp::GreaterThanOrEqual), vec![(regs.carry, true, true)]);
        assert_eq!(lower(BinaryOp::LessThanOrEqual), vec![(regs.zero, true, true), (regs.carry, false, true)]);
        assert_eq!(lower(BinaryOp::GreaterThan), vec![(regs.zero, true, false), (regs.carry, true, true)]);
    }

    #[test]
    fn test_signed_ordering() {
        let p = platform();
        let regs = *p.registers();
        let a = Expression::register(regs.a);
        let zero = Expression::integer(0);
        let one = Expression::integer(1);
        let i8 = ValueType::i8();

        let lower = |op| flags(&p.test_and_branch(i8, op, &a, &zero, SHORT).unwrap());
        assert_eq!(lower(BinaryOp::LessThan), vec![(regs.negative, true, true)]);
        assert_eq!(lower(BinaryOp::GreaterThanOrEqual), vec![(regs.negative, false, true)]);
        assert_eq!(lower(BinaryOp::LessThanOrEqual), vec![(regs.zero, true, true), (regs.negative, true, true)]);
        assert_eq!(lower(BinaryOp::GreaterThan), vec![(regs.zero, true, false), (regs.negative, false, true)]);

        for op in [BinaryOp::LessThan, BinaryOp::LessThanOrEqual, BinaryOp::GreaterThan, BinaryOp::GreaterThanOrEqual] {
            assert!(p.test_and_branch(i8, op, &a, &one, SHORT).is_none());
        }
        // equality does not care about sign
        assert!(p.test_and_branch(i8, BinaryOp::Equal, &a, &one, SHORT).is_some());
    }

    #[test]
    fn test_unsupported() {
        let p = platform();
        let a = Expression::register(p.registers().a);
        let one = Expression::integer(1);

        assert!(p.test_and_branch(ValueType::u8(), BinaryOp::Addition, &a, &one, SHORT).is_none());
        assert!(p.test_and_branch(ValueType::bool(), BinaryOp::LessThan, &a, &one, SHORT).is_none());
    }
}

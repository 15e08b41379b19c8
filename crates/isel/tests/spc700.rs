//! End-to-end checks of the SPC700 platform through the public API

use isel::backend::spc700::{LONG, SHORT};
use isel::backend::{Platform, Spc700Platform};
use isel::common::{Diagnostics, Span};
use isel::ir::{BinaryOp, Expression, UnaryOp};
use isel::isel::{Bank, BranchKind, InstructionType, Operand, OperandPattern, RegisterFile};
use isel::types::ValueType;
use isel::{Session, SessionConfig};
use pretty_assertions::assert_eq;

struct At(u32);

impl Bank for At {
    fn absolute_address(&self) -> u32 {
        self.0
    }
}

fn platform() -> Spc700Platform {
    Spc700Platform::new().expect("spc700 platform")
}

/// Every registered instruction writes exactly `size` bytes for a range of
/// addresses, including those that fail
#[test]
fn emitted_length_matches_size() {
    let p = platform();
    let regs = *p.registers();
    let goto = InstructionType::Branch(BranchKind::Goto);
    let operand_sets = vec![
        (goto, SHORT, vec![Operand::Integer(0x0300)]),
        (goto, LONG, vec![Operand::Integer(0x0300)]),
        (goto, SHORT, vec![Operand::Integer(0x0300), Operand::Register(regs.zero), Operand::Boolean(false)]),
        (
            goto,
            SHORT,
            vec![
                Operand::Integer(0x0300),
                Operand::bit_index(Operand::deref(Operand::Integer(0x10), 1), Operand::Integer(4)),
                Operand::Boolean(true),
            ],
        ),
        (
            InstructionType::Binary(BinaryOp::Assignment),
            SHORT,
            vec![
                Operand::Register(regs.carry),
                Operand::bit_index(Operand::deref(Operand::Integer(0x2345), 1), Operand::Integer(1)),
            ],
        ),
    ];

    for (ty, hint, operands) in &operand_sets {
        let selection = p.instructions().select(*ty, *hint, operands).expect("selectable");
        for address in [0x0000, 0x0100, 0x0280, 0x0300, 0x0400, 0xFF00] {
            let mut diagnostics = Diagnostics::new();
            let mut buffer = Vec::new();
            let ok = selection.emit(&mut diagnostics, &At(address), &mut buffer, Span::synthetic());
            assert_eq!(buffer.len(), selection.size());
            assert_eq!(ok, diagnostics.is_empty());
        }
    }
}

#[test]
fn pattern_matching_is_deterministic() {
    let p = platform();
    let x = p.registers().x;
    let pattern = OperandPattern::deref(
        OperandPattern::index(
            OperandPattern::capture(OperandPattern::range(0, 0xFF)),
            OperandPattern::Register(x),
            2,
        ),
        1,
    );
    let operand = Operand::deref(Operand::index(Operand::Integer(0x33), Operand::Register(x), 2), 1);

    let first = pattern.match_operand(&operand);
    let second = pattern.match_operand(&operand);
    assert_eq!(first, second);
    assert_eq!(first, Some(vec![&Operand::Integer(0x33)]));
}

#[test]
fn direct_page_wins_over_absolute() {
    let p = platform();
    let a = p.registers().a;
    let operands = [Operand::Register(a), Operand::deref(Operand::Integer(0x00FF), 1)];
    let selection = p
        .instructions()
        .select(BinaryOp::Assignment.into(), SHORT, &operands)
        .unwrap();
    assert_eq!(selection.instruction.options.opcode, vec![0xE4]);
    assert_eq!(selection.size(), 2);
}

#[test]
fn pc_relative_range_through_session() {
    let p = platform();
    let origin = 0x1000;

    for (dest, expected) in [(origin + 2 + 127, 0x7F), (origin + 2 - 128, 0x80)] {
        let mut session = Session::new(&p, SessionConfig { origin, distance_hint: SHORT });
        session.goto(dest, Span::synthetic()).unwrap();
        assert_eq!(session.output(), &[0x2F, expected]);
    }

    for dest in [origin + 2 + 128, origin + 2 - 129] {
        let mut session = Session::new(&p, SessionConfig { origin, distance_hint: SHORT });
        assert!(session.goto(dest, Span::new(0, 4)).is_err());
        let (output, diagnostics) = session.finish();
        assert_eq!(output, vec![0x2F, 0x00]);
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["pc-relative offset is outside of representable signed 8-bit range -128..127"]);
    }
}

#[test]
fn absolute_bit_field() {
    let p = platform();
    let carry = Expression::register(p.registers().carry);
    let bit = |address, bit| {
        Expression::bit_index(Expression::deref(Expression::integer(address), 1), Expression::integer(bit))
    };

    let mut session = Session::new(&p, SessionConfig::default());
    session.emit(BinaryOp::Assignment, &[&carry, &bit(0x1FFF, 7)], Span::synthetic()).unwrap();
    assert_eq!(session.output(), &[0xAA, 0xFF, 0xFF]);

    for n in 0..8 {
        let mut session = Session::new(&p, SessionConfig::default());
        let result = session.emit(BinaryOp::Assignment, &[&carry, &bit(0x2000, n)], Span::synthetic());
        assert!(result.is_err());
        assert_eq!(session.output().len(), 3);
        assert!(session.diagnostics().has_errors());
    }
}

#[test]
fn decrement_branch_fusion() {
    let p = platform();
    let counter = Expression::deref(Expression::integer(0x20), 1);
    let decremented = Expression::unary(UnaryOp::PreDecrement, counter.clone());
    let zero = Expression::integer(0);
    let five = Expression::integer(5);
    let dbnz = InstructionType::VoidIntrinsic(p.intrinsics().dec_branch_not_zero);

    let plan = p
        .test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &decremented, &zero, SHORT)
        .unwrap();
    assert_eq!(plan.ty, dbnz);
    assert!(plan.branches.is_empty());

    let plan = p
        .test_and_branch(ValueType::u8(), BinaryOp::NotEqual, &counter, &five, SHORT)
        .unwrap();
    assert_ne!(plan.ty, dbnz);
    assert_eq!(plan.branches.len(), 1);

    // dbnz dp, rel: the branch offset counts all three bytes
    let mut session = Session::new(&p, SessionConfig::default());
    session
        .branch_if(ValueType::u8(), BinaryOp::NotEqual, &decremented, &zero, 0x0200, Span::synthetic())
        .unwrap();
    assert_eq!(session.output(), &[0x6E, 0x20, 0xFD]);
}

#[test]
fn signed_and_unsigned_ordering() {
    let p = platform();
    let regs = *p.registers();
    let a = Expression::register(regs.a);
    let y = Expression::register(regs.y);
    let zero = Expression::integer(0);

    let plan = p.test_and_branch(ValueType::i8(), BinaryOp::LessThan, &a, &zero, SHORT).unwrap();
    assert_eq!(plan.branches.len(), 1);
    assert_eq!(plan.branches[0].flag, regs.negative);

    let less = p.test_and_branch(ValueType::u8(), BinaryOp::LessThan, &a, &y, SHORT).unwrap();
    let at_least = p.test_and_branch(ValueType::u8(), BinaryOp::GreaterThanOrEqual, &a, &y, SHORT).unwrap();
    assert_eq!(less.branches.len(), 1);
    assert_eq!(at_least.branches.len(), 1);
    assert_eq!(less.branches[0].flag, regs.carry);
    assert_eq!(at_least.branches[0].flag, regs.carry);
    assert_eq!(less.branches[0].value, !at_least.branches[0].value);
}

#[test]
fn composite_register_file() {
    let p = platform();
    let regs = *p.registers();
    let mut file = RegisterFile::new(p.definitions(), p.composite_registers());

    file.write(regs.ya, 0x1234);
    assert_eq!(file.read(regs.y), 0x12);
    assert_eq!(file.read(regs.a), 0x34);

    file.write(regs.y, 0xAB);
    file.write(regs.a, 0xCD);
    assert_eq!(file.read(regs.ya), 0xABCD);

    // x is not part of any composite
    file.write(regs.x, 0x99);
    assert_eq!(file.read(regs.ya), 0xABCD);
    assert_eq!(p.composite_registers().composite_of(regs.x), None);
}

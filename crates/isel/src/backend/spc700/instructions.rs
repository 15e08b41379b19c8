//! SPC700 instruction table
//!
//! Registration order is selection priority. Direct-page forms are added
//! before absolute forms so that addresses below 0x100 get the short encoding.

use crate::common::IselResult;
use crate::ir::{BinaryOp, UnaryOp};
use crate::isel::encoding::{
    AbsoluteBitIndex, DirectBitBranch, DirectBitBranchLong, DirectBitIndex, Implicit, Operand16, Operand8,
    Operand8Operand8, Operand8PcRelative8, PcRelative8, RepeatedImplicit, RepeatedOperand16, RepeatedOperand8,
    SplitOperand8Operand16,
};
use crate::isel::{
    BranchKind, Encoding, InstructionOptions, InstructionSignature, InstructionTable, InstructionType,
    OperandPattern as P, Slot,
};
use super::registers::{Intrinsics, Registers};

/// Distance hint of pc-relative branch forms
pub const SHORT: usize = 0;
/// Distance hint of branch forms that reach through an absolute `jmp`
pub const LONG: usize = 1;

const JMP: u8 = 0x5F;

/// Addressing-mode vocabulary
struct Patterns {
    a: P,
    x: P,
    y: P,
    ya: P,
    sp: P,
    psw: P,
    carry: P,
    overflow: P,
    direct_page: P,
    interrupt: P,

    no: P,
    yes: P,
    imm_u8: P,
    imm_u16: P,
    imm_high_page: P,

    /// `*(dp as *u8)`
    dp: P,
    /// `*(dp as *u16)`
    dp16: P,
    dp_x: P,
    dp_y: P,
    dp_bit: P,
    /// `[dp+x]`
    dp_x_indirect: P,
    /// `[dp]+y`
    dp_indirect_y: P,
    abs: P,
    abs_x: P,
    abs_y: P,
    abs_bit: P,
    abs_bit_not: P,
    x_indirect: P,
    y_indirect: P,
    x_post_increment: P,
    /// `[abs+x]` jump vector
    abs_x_vector: P,
}

impl Patterns {
    fn new(regs: &Registers) -> Self {
        let u8_value = || P::capture(P::range(0, 0xFF));
        let u16_value = || P::capture(P::range(0, 0xFFFF));
        let bit = || P::capture(P::range(0, 7));
        let x = P::Register(regs.x);
        let y = P::Register(regs.y);
        let abs_bit = P::bit_index(P::deref(u16_value(), 1), bit());

        Self {
            a: P::Register(regs.a),
            ya: P::Register(regs.ya),
            sp: P::Register(regs.sp),
            psw: P::Register(regs.psw),
            carry: P::Register(regs.carry),
            overflow: P::Register(regs.overflow),
            direct_page: P::Register(regs.direct_page),
            interrupt: P::Register(regs.interrupt),

            no: P::Boolean(false),
            yes: P::Boolean(true),
            imm_u8: u8_value(),
            imm_u16: u16_value(),
            imm_high_page: P::capture(P::range(0xFF00, 0xFFFF)),

            dp: P::deref(u8_value(), 1),
            dp16: P::deref(u8_value(), 2),
            dp_x: P::index(u8_value(), x.clone(), 1),
            dp_y: P::index(u8_value(), y.clone(), 1),
            dp_bit: P::bit_index(P::deref(u8_value(), 1), bit()),
            dp_x_indirect: P::deref(P::index(u8_value(), x.clone(), 2), 1),
            dp_indirect_y: P::index(P::deref(u8_value(), 2), y.clone(), 1),
            abs: P::deref(u16_value(), 1),
            abs_x: P::index(u16_value(), x.clone(), 1),
            abs_y: P::index(u16_value(), y.clone(), 1),
            abs_bit_not: P::unary(UnaryOp::LogicalNegation, abs_bit.clone()),
            abs_bit,
            x_indirect: P::deref(x.clone(), 1),
            y_indirect: P::deref(y.clone(), 1),
            x_post_increment: P::deref(P::unary(UnaryOp::PostIncrement, x.clone()), 1),
            abs_x_vector: P::index(u16_value(), x.clone(), 2),
            x,
            y,
        }
    }

    /// `tcall n` vector, 16-bit entry at `0xFFDE - 2n`
    fn table_call(n: u8) -> P {
        P::deref(P::exactly(0xFFDE - 2 * i128::from(n)), 2)
    }
}

struct Builder<'t> {
    table: &'t mut InstructionTable,
}

impl Builder<'_> {
    fn add(
        &mut self,
        ty: impl Into<InstructionType>,
        operands: Vec<P>,
        encoding: &'static dyn Encoding,
        options: InstructionOptions,
    ) -> IselResult<()> {
        self.table.register(InstructionSignature::new(ty, SHORT, operands), encoding, options)
    }

    fn add_long(
        &mut self,
        ty: impl Into<InstructionType>,
        operands: Vec<P>,
        encoding: &'static dyn Encoding,
        options: InstructionOptions,
    ) -> IselResult<()> {
        self.table.register(InstructionSignature::new(ty, LONG, operands), encoding, options)
    }
}

fn implicit(opcode: impl Into<Vec<u8>>) -> InstructionOptions {
    InstructionOptions::implicit(opcode)
}

fn with(opcode: impl Into<Vec<u8>>, slots: impl Into<Vec<Slot>>) -> InstructionOptions {
    InstructionOptions::new(opcode, slots)
}

/// First capture of operand `n`
fn at(n: usize) -> Slot {
    Slot::at(n)
}

/// Address and subscript of a bit operand at position `n`
fn bit_of(n: usize) -> [Slot; 2] {
    [Slot::new(n, 0), Slot::new(n, 1)]
}

/// Register the full SPC700 instruction set
pub fn register_all(table: &mut InstructionTable, regs: &Registers, intrinsics: &Intrinsics) -> IselResult<()> {
    let p = Patterns::new(regs);
    let mut b = Builder { table };
    let assign = BinaryOp::Assignment;
    let cmp = InstructionType::VoidIntrinsic(intrinsics.cmp);

    // ==================== Loads and stores ====================

    // a = mem
    b.add(assign, vec![p.a.clone(), p.imm_u8.clone()], &Operand8, with([0xE8], [at(1)]))?;
    b.add(assign, vec![p.a.clone(), p.x_indirect.clone()], &Implicit, implicit([0xE6]))?;
    b.add(assign, vec![p.a.clone(), p.dp.clone()], &Operand8, with([0xE4], [at(1)]))?;
    b.add(assign, vec![p.a.clone(), p.dp_x.clone()], &Operand8, with([0xF4], [at(1)]))?;
    b.add(assign, vec![p.a.clone(), p.abs.clone()], &Operand16, with([0xE5], [at(1)]))?;
    b.add(assign, vec![p.a.clone(), p.abs_x.clone()], &Operand16, with([0xF5], [at(1)]))?;
    b.add(assign, vec![p.a.clone(), p.abs_y.clone()], &Operand16, with([0xF6], [at(1)]))?;
    b.add(assign, vec![p.a.clone(), p.dp_x_indirect.clone()], &Operand8, with([0xE7], [at(1)]))?;
    b.add(assign, vec![p.a.clone(), p.dp_indirect_y.clone()], &Operand8, with([0xF7], [at(1)]))?;
    // a = *(x++), *(x++) = a
    b.add(assign, vec![p.a.clone(), p.x_post_increment.clone()], &Implicit, implicit([0xBF]))?;
    b.add(assign, vec![p.x_post_increment.clone(), p.a.clone()], &Implicit, implicit([0xAF]))?;
    // mem = a
    b.add(assign, vec![p.x_indirect.clone(), p.a.clone()], &Implicit, implicit([0xC6]))?;
    b.add(assign, vec![p.dp.clone(), p.a.clone()], &Operand8, with([0xC4], [at(0)]))?;
    b.add(assign, vec![p.dp_x.clone(), p.a.clone()], &Operand8, with([0xD4], [at(0)]))?;
    b.add(assign, vec![p.abs.clone(), p.a.clone()], &Operand16, with([0xC5], [at(0)]))?;
    b.add(assign, vec![p.abs_x.clone(), p.a.clone()], &Operand16, with([0xD5], [at(0)]))?;
    b.add(assign, vec![p.abs_y.clone(), p.a.clone()], &Operand16, with([0xD6], [at(0)]))?;
    b.add(assign, vec![p.dp_x_indirect.clone(), p.a.clone()], &Operand8, with([0xC7], [at(0)]))?;
    b.add(assign, vec![p.dp_indirect_y.clone(), p.a.clone()], &Operand8, with([0xD7], [at(0)]))?;

    // ==================== ALU ====================

    {
        let operators: [(InstructionType, &[u8]); 8] = [
            (BinaryOp::BitwiseOr.into(), &[0x00]),
            (BinaryOp::BitwiseAnd.into(), &[0x20]),
            (BinaryOp::BitwiseXor.into(), &[0x40]),
            (BinaryOp::AdditionWithCarry.into(), &[0x80]),
            // clrc; adc
            (BinaryOp::Addition.into(), &[0x60, 0x80]),
            (cmp, &[0x60]),
            (BinaryOp::SubtractionWithCarry.into(), &[0xA0]),
            // setc; sbc
            (BinaryOp::Subtraction.into(), &[0x80, 0xA0]),
        ];
        let shapes: [(&P, &P, &'static dyn Encoding, u8, Vec<Slot>); 12] = [
            (&p.a, &p.imm_u8, &Operand8, 0x08, vec![at(1)]),
            (&p.a, &p.x_indirect, &Implicit, 0x06, vec![]),
            (&p.a, &p.dp, &Operand8, 0x04, vec![at(1)]),
            (&p.a, &p.dp_x, &Operand8, 0x14, vec![at(1)]),
            (&p.a, &p.abs, &Operand16, 0x05, vec![at(1)]),
            (&p.a, &p.abs_x, &Operand16, 0x15, vec![at(1)]),
            (&p.a, &p.abs_y, &Operand16, 0x16, vec![at(1)]),
            (&p.a, &p.dp_x_indirect, &Operand8, 0x07, vec![at(1)]),
            (&p.a, &p.dp_indirect_y, &Operand8, 0x17, vec![at(1)]),
            (&p.x_indirect, &p.y_indirect, &Implicit, 0x19, vec![]),
            // source byte first
            (&p.dp, &p.imm_u8, &Operand8Operand8, 0x18, vec![at(1), at(0)]),
            (&p.dp, &p.dp, &Operand8Operand8, 0x09, vec![at(1), at(0)]),
        ];
        for (ty, base) in operators {
            for (left, right, encoding, mode, slots) in &shapes {
                let mut opcode = base.to_vec();
                if let Some(last) = opcode.last_mut() {
                    *last |= mode;
                }
                b.add(ty, vec![(*left).clone(), (*right).clone()], *encoding, with(opcode, slots.clone()))?;
            }
        }
    }

    // x = mem, mem = x
    b.add(assign, vec![p.x.clone(), p.imm_u8.clone()], &Operand8, with([0xCD], [at(1)]))?;
    b.add(assign, vec![p.x.clone(), p.dp.clone()], &Operand8, with([0xF8], [at(1)]))?;
    b.add(assign, vec![p.x.clone(), p.dp_y.clone()], &Operand8, with([0xF9], [at(1)]))?;
    b.add(assign, vec![p.x.clone(), p.abs.clone()], &Operand16, with([0xE9], [at(1)]))?;
    b.add(assign, vec![p.dp.clone(), p.x.clone()], &Operand8, with([0xD8], [at(0)]))?;
    b.add(assign, vec![p.dp_y.clone(), p.x.clone()], &Operand8, with([0xD9], [at(0)]))?;
    b.add(assign, vec![p.abs.clone(), p.x.clone()], &Operand16, with([0xC9], [at(0)]))?;
    // y = mem, mem = y
    b.add(assign, vec![p.y.clone(), p.imm_u8.clone()], &Operand8, with([0x8D], [at(1)]))?;
    b.add(assign, vec![p.y.clone(), p.dp.clone()], &Operand8, with([0xEB], [at(1)]))?;
    b.add(assign, vec![p.y.clone(), p.dp_x.clone()], &Operand8, with([0xFB], [at(1)]))?;
    b.add(assign, vec![p.y.clone(), p.abs.clone()], &Operand16, with([0xEC], [at(1)]))?;
    b.add(assign, vec![p.dp.clone(), p.y.clone()], &Operand8, with([0xCB], [at(0)]))?;
    b.add(assign, vec![p.dp_x.clone(), p.y.clone()], &Operand8, with([0xDB], [at(0)]))?;
    b.add(assign, vec![p.abs.clone(), p.y.clone()], &Operand16, with([0xCC], [at(0)]))?;
    // register moves
    b.add(assign, vec![p.a.clone(), p.x.clone()], &Implicit, implicit([0x7D]))?;
    b.add(assign, vec![p.a.clone(), p.y.clone()], &Implicit, implicit([0xDD]))?;
    b.add(assign, vec![p.x.clone(), p.a.clone()], &Implicit, implicit([0x5D]))?;
    b.add(assign, vec![p.y.clone(), p.a.clone()], &Implicit, implicit([0xFD]))?;
    b.add(assign, vec![p.x.clone(), p.sp.clone()], &Implicit, implicit([0x9D]))?;
    b.add(assign, vec![p.sp.clone(), p.x.clone()], &Implicit, implicit([0xBD]))?;
    // mem = mem
    b.add(assign, vec![p.dp.clone(), p.imm_u8.clone()], &Operand8Operand8, with([0x8F], [at(1), at(0)]))?;
    b.add(assign, vec![p.dp.clone(), p.dp.clone()], &Operand8Operand8, with([0xFA], [at(1), at(0)]))?;
    // cmp x, cmp y
    b.add(cmp, vec![p.x.clone(), p.imm_u8.clone()], &Operand8, with([0xC8], [at(1)]))?;
    b.add(cmp, vec![p.x.clone(), p.dp.clone()], &Operand8, with([0x3E], [at(1)]))?;
    b.add(cmp, vec![p.x.clone(), p.abs.clone()], &Operand16, with([0x1E], [at(1)]))?;
    b.add(cmp, vec![p.y.clone(), p.imm_u8.clone()], &Operand8, with([0xAD], [at(1)]))?;
    b.add(cmp, vec![p.y.clone(), p.dp.clone()], &Operand8, with([0x7E], [at(1)]))?;
    b.add(cmp, vec![p.y.clone(), p.abs.clone()], &Operand16, with([0x5E], [at(1)]))?;

    // ==================== Increment, decrement, negation ====================

    let steps = [
        (UnaryOp::PreIncrement, [0xBC, 0xAB, 0xBB, 0xAC, 0x3D, 0xFC]),
        (UnaryOp::PreDecrement, [0x9C, 0x8B, 0x9B, 0x8C, 0x1D, 0xDC]),
    ];
    for (op, [a, dp, dp_x, abs, x, y]) in steps {
        let zero = [regs.zero];
        b.add(op, vec![p.a.clone()], &Implicit, implicit([a]).invalidating(zero))?;
        b.add(op, vec![p.dp.clone()], &Operand8, with([dp], [at(0)]).invalidating(zero))?;
        b.add(op, vec![p.dp_x.clone()], &Operand8, with([dp_x], [at(0)]).invalidating(zero))?;
        b.add(op, vec![p.abs.clone()], &Operand16, with([abs], [at(0)]).invalidating(zero))?;
        b.add(op, vec![p.x.clone()], &Implicit, implicit([x]).invalidating(zero))?;
        b.add(op, vec![p.y.clone()], &Implicit, implicit([y]).invalidating(zero))?;
    }
    // eor a, #$FF
    b.add(UnaryOp::BitwiseNegation, vec![p.a.clone()], &Implicit, implicit([0x48, 0xFF]))?;
    // eor a, #$FF; clrc; adc a, #1
    b.add(UnaryOp::SignedNegation, vec![p.a.clone()], &Implicit, implicit([0x48, 0xFF, 0x60, 0x88, 0x01]))?;

    // ==================== Shifts and rotates ====================

    let shifts = [
        (BinaryOp::LeftShift, 0x00),
        (BinaryOp::LogicalLeftShift, 0x00),
        (BinaryOp::LeftRotateWithCarry, 0x20),
        (BinaryOp::LogicalRightShift, 0x40),
        (BinaryOp::RightRotateWithCarry, 0x60),
    ];
    for (op, base) in shifts {
        b.add(op, vec![p.a.clone(), p.imm_u8.clone()], &RepeatedImplicit, with([base | 0x1C], [at(1)]))?;
        b.add(op, vec![p.dp.clone(), p.imm_u8.clone()], &RepeatedOperand8, with([base | 0x0B], [at(0), at(1)]))?;
        b.add(op, vec![p.dp_x.clone(), p.imm_u8.clone()], &RepeatedOperand8, with([base | 0x1B], [at(0), at(1)]))?;
        b.add(op, vec![p.abs.clone(), p.imm_u8.clone()], &RepeatedOperand16, with([base | 0x0C], [at(0), at(1)]))?;
    }

    // xcn
    b.add(InstructionType::VoidIntrinsic(intrinsics.swap_digits), vec![p.a.clone()], &Implicit, implicit([0x9F]))?;

    // ==================== 16-bit ====================

    b.add(assign, vec![p.ya.clone(), p.dp16.clone()], &Operand8, with([0xBA], [at(1)]))?;
    b.add(assign, vec![p.dp16.clone(), p.ya.clone()], &Operand8, with([0xDA], [at(0)]))?;
    b.add(UnaryOp::PreIncrement, vec![p.dp16.clone()], &Operand8, with([0x3A], [at(0)]).invalidating([regs.zero]))?;
    b.add(UnaryOp::PreDecrement, vec![p.dp16.clone()], &Operand8, with([0x1A], [at(0)]).invalidating([regs.zero]))?;
    b.add(BinaryOp::Addition, vec![p.ya.clone(), p.dp16.clone()], &Operand8, with([0x7A], [at(1)]))?;
    b.add(BinaryOp::Subtraction, vec![p.ya.clone(), p.dp16.clone()], &Operand8, with([0x9A], [at(1)]))?;
    b.add(cmp, vec![p.ya.clone(), p.dp16.clone()], &Operand8, with([0x5A], [at(1)]))?;
    // ya = y * a, ya = a * y
    let mul = BinaryOp::Multiplication;
    b.add(mul, vec![p.ya.clone(), p.y.clone(), p.a.clone()], &Implicit, implicit([0xCF]))?;
    b.add(mul, vec![p.ya.clone(), p.a.clone(), p.y.clone()], &Implicit, implicit([0xCF]))?;
    b.add(InstructionType::VoidIntrinsic(intrinsics.divmod), vec![p.ya.clone(), p.x.clone()], &Implicit, implicit([0x9E]))?;
    b.add(InstructionType::VoidIntrinsic(intrinsics.decimal_adjust_add), vec![], &Implicit, implicit([0xDF]))?;
    b.add(InstructionType::VoidIntrinsic(intrinsics.decimal_adjust_sub), vec![], &Implicit, implicit([0xBE]))?;

    // ==================== Jumps and branches ====================

    let goto = BranchKind::Goto;
    b.add(goto, vec![p.imm_u16.clone()], &PcRelative8, with([0x2F], [at(0)]))?;
    b.add(goto, vec![p.abs_x_vector.clone()], &Operand16, with([0x1F], [at(0)]))?;
    b.add_long(goto, vec![p.imm_u16.clone()], &Operand16, with([JMP], [at(0)]))?;
    b.add_long(goto, vec![p.abs_x_vector.clone()], &Operand16, with([0x1F], [at(0)]))?;

    // goto dest if flag == value: (flag, opcode when false, opcode when true)
    let flag_branches = [
        (regs.carry, 0x90, 0xB0),
        (regs.zero, 0xD0, 0xF0),
        (regs.negative, 0x10, 0x30),
        (regs.overflow, 0x50, 0x70),
    ];
    for (flag, if_clear, if_set) in flag_branches {
        for (value, opcode, inverse) in [(false, if_clear, if_set), (true, if_set, if_clear)] {
            let operands = vec![p.imm_u16.clone(), P::Register(flag), P::Boolean(value)];
            b.add(goto, operands.clone(), &PcRelative8, with([opcode], [at(0)]))?;
            // skip over a jmp when the condition does not hold
            b.add_long(goto, operands, &Operand16, with([inverse, 3, JMP], [at(0)]))?;
        }
    }
    // bbc/bbs
    let [dp, bit] = bit_of(1);
    for (value, opcode, inverse) in [(false, 0x13, 0x03), (true, 0x03, 0x13)] {
        let operands = vec![p.imm_u16.clone(), p.dp_bit.clone(), P::Boolean(value)];
        b.add(goto, operands.clone(), &DirectBitBranch, with([opcode], [dp, bit, at(0)]))?;
        b.add_long(goto, operands, &DirectBitBranchLong, with([inverse, JMP], [dp, bit, at(0)]))?;
    }

    // cbne
    let cbne = InstructionType::VoidIntrinsic(intrinsics.cmp_branch_not_equal);
    b.add(cbne, vec![p.a.clone(), p.dp.clone(), p.imm_u16.clone()], &Operand8PcRelative8, with([0x2E], [at(1), at(2)]))?;
    b.add(cbne, vec![p.a.clone(), p.dp_x.clone(), p.imm_u16.clone()], &Operand8PcRelative8, with([0xDE], [at(1), at(2)]))?;
    // dbnz
    let dbnz = InstructionType::VoidIntrinsic(intrinsics.dec_branch_not_zero);
    b.add(dbnz, vec![p.y.clone(), p.imm_u16.clone()], &PcRelative8, with([0xFE], [at(1)]))?;
    b.add(dbnz, vec![p.dp.clone(), p.imm_u16.clone()], &Operand8PcRelative8, with([0x6E], [at(0), at(1)]))?;
    // dbnz over a bra that skips the jmp
    b.add_long(dbnz, vec![p.y.clone(), p.imm_u16.clone()], &Operand16, with([0xFE, 2, 0x2F, 3, JMP], [at(1)]))?;
    b.add_long(
        dbnz,
        vec![p.dp.clone(), p.imm_u16.clone()],
        &SplitOperand8Operand16,
        with([0x6E, 2, 0x2F, 3, JMP], [at(0), at(1)]),
    )?;

    // pcall, call, tcall
    let call = BranchKind::Call;
    b.add(call, vec![p.imm_high_page.clone()], &Operand8, with([0x4F], [at(0)]))?;
    b.add(call, vec![p.imm_u16.clone()], &Operand16, with([0x3F], [at(0)]))?;
    for n in 0..16u8 {
        b.add(call, vec![Patterns::table_call(n)], &Implicit, implicit([0x01 | (n << 4)]))?;
    }
    b.add(BranchKind::Return, vec![], &Implicit, implicit([0x6F]))?;
    b.add(BranchKind::IrqReturn, vec![], &Implicit, implicit([0x7F]))?;
    // brk
    b.add(InstructionType::VoidIntrinsic(intrinsics.irqcall), vec![], &Implicit, implicit([0x0F]))?;

    // ==================== Stack ====================

    let push = InstructionType::VoidIntrinsic(intrinsics.push);
    let pop = InstructionType::LoadIntrinsic(intrinsics.pop);
    for (register, push_op, pop_op) in [(&p.a, 0x2D, 0xAE), (&p.x, 0x4D, 0xCE), (&p.y, 0x6D, 0xEE), (&p.psw, 0x0D, 0x8E)] {
        b.add(push, vec![register.clone()], &Implicit, implicit([push_op]))?;
        b.add(pop, vec![register.clone()], &Implicit, implicit([pop_op]))?;
    }

    // ==================== Flags and bits ====================

    // clrc, setc, notc
    b.add(assign, vec![p.carry.clone(), p.no.clone()], &Implicit, implicit([0x60]))?;
    b.add(assign, vec![p.carry.clone(), p.yes.clone()], &Implicit, implicit([0x80]))?;
    b.add(UnaryOp::LogicalNegation, vec![p.carry.clone()], &Implicit, implicit([0xED]))?;
    // clrv
    b.add(assign, vec![p.overflow.clone(), p.no.clone()], &Implicit, implicit([0xE0]))?;
    // clrp, setp
    b.add(assign, vec![p.direct_page.clone(), p.no.clone()], &Implicit, implicit([0x20]))?;
    b.add(assign, vec![p.direct_page.clone(), p.yes.clone()], &Implicit, implicit([0x40]))?;
    // di, ei
    b.add(assign, vec![p.interrupt.clone(), p.no.clone()], &Implicit, implicit([0xC0]))?;
    b.add(assign, vec![p.interrupt.clone(), p.yes.clone()], &Implicit, implicit([0xA0]))?;
    // clr1, set1
    b.add(assign, vec![p.dp_bit.clone(), p.no.clone()], &DirectBitIndex, with([0x12], bit_of(0)))?;
    b.add(assign, vec![p.dp_bit.clone(), p.yes.clone()], &DirectBitIndex, with([0x02], bit_of(0)))?;
    // tclr1, tset1
    b.add(InstructionType::VoidIntrinsic(intrinsics.test_and_clear), vec![p.a.clone(), p.abs.clone()], &Operand16, with([0x4E], [at(1)]))?;
    b.add(InstructionType::VoidIntrinsic(intrinsics.test_and_set), vec![p.a.clone(), p.abs.clone()], &Operand16, with([0x0E], [at(1)]))?;
    // and1, or1, eor1
    let carry_ops = [
        (BinaryOp::BitwiseAnd, &p.abs_bit, 0x4A),
        (BinaryOp::BitwiseAnd, &p.abs_bit_not, 0x6A),
        (BinaryOp::BitwiseOr, &p.abs_bit, 0x0A),
        (BinaryOp::BitwiseOr, &p.abs_bit_not, 0x2A),
        (BinaryOp::BitwiseXor, &p.abs_bit, 0x8A),
    ];
    for (op, source, opcode) in carry_ops {
        b.add(op, vec![p.carry.clone(), source.clone()], &AbsoluteBitIndex, with([opcode], bit_of(1)))?;
    }
    // not1
    b.add(UnaryOp::LogicalNegation, vec![p.abs_bit.clone()], &AbsoluteBitIndex, with([0xEA], bit_of(0)))?;
    // mov1
    b.add(assign, vec![p.carry.clone(), p.abs_bit.clone()], &AbsoluteBitIndex, with([0xAA], bit_of(1)))?;
    b.add(assign, vec![p.abs_bit.clone(), p.carry.clone()], &AbsoluteBitIndex, with([0xCA], bit_of(0)))?;

    // ==================== Misc ====================

    b.add(InstructionType::VoidIntrinsic(intrinsics.nop), vec![], &Implicit, implicit([0x00]))?;
    b.add(InstructionType::VoidIntrinsic(intrinsics.sleep), vec![], &Implicit, implicit([0xEF]))?;
    b.add(InstructionType::VoidIntrinsic(intrinsics.stop), vec![], &Implicit, implicit([0xFF]))?;

    Ok(())
}

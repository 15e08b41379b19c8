//! SPC700 builtin registers, flags and intrinsics

use crate::types::{Definition, Definitions, ValueType};

/// Registers and status flags
#[derive(Debug, Clone, Copy)]
pub struct Registers {
    pub a: Definition,
    pub x: Definition,
    pub y: Definition,
    /// `y:a` pair used by 16-bit moves, `mul` and `div`
    pub ya: Definition,
    pub sp: Definition,
    pub psw: Definition,

    pub negative: Definition,
    pub overflow: Definition,
    pub direct_page: Definition,
    pub break_flag: Definition,
    pub half_carry: Definition,
    pub interrupt: Definition,
    pub zero: Definition,
    pub carry: Definition,
}

impl Registers {
    pub fn define(defs: &mut Definitions) -> Self {
        let u8 = ValueType::u8();
        let flag = ValueType::bool();
        Self {
            a: defs.add_register("a", u8),
            x: defs.add_register("x", u8),
            y: defs.add_register("y", u8),
            ya: defs.add_register("ya", ValueType::u16()),
            sp: defs.add_register("sp", u8),
            psw: defs.add_register("psw", u8),

            negative: defs.add_register("negative", flag),
            overflow: defs.add_register("overflow", flag),
            direct_page: defs.add_register("direct_page", flag),
            break_flag: defs.add_register("break_flag", flag),
            half_carry: defs.add_register("half_carry", flag),
            interrupt: defs.add_register("interrupt", flag),
            zero: defs.add_register("zero", flag),
            carry: defs.add_register("carry", flag),
        }
    }
}

/// Intrinsic functions
#[derive(Debug, Clone, Copy)]
pub struct Intrinsics {
    pub push: Definition,
    pub pop: Definition,
    /// `brk`
    pub irqcall: Definition,
    pub nop: Definition,
    pub sleep: Definition,
    pub stop: Definition,
    /// `xcn`
    pub swap_digits: Definition,
    pub test_and_set: Definition,
    pub test_and_clear: Definition,
    /// `div ya, x`: quotient in a, remainder in y
    pub divmod: Definition,
    pub decimal_adjust_add: Definition,
    pub decimal_adjust_sub: Definition,
    pub cmp: Definition,
    pub cmp_branch_not_equal: Definition,
    pub dec_branch_not_zero: Definition,
}

impl Intrinsics {
    pub fn define(defs: &mut Definitions) -> Self {
        Self {
            push: defs.add_void_intrinsic("push"),
            pop: defs.add_load_intrinsic("pop", ValueType::u8()),
            irqcall: defs.add_void_intrinsic("irqcall"),
            nop: defs.add_void_intrinsic("nop"),
            sleep: defs.add_void_intrinsic("sleep"),
            stop: defs.add_void_intrinsic("stop"),
            swap_digits: defs.add_void_intrinsic("swap_digits"),
            test_and_set: defs.add_void_intrinsic("test_and_set"),
            test_and_clear: defs.add_void_intrinsic("test_and_clear"),
            divmod: defs.add_void_intrinsic("divmod"),
            decimal_adjust_add: defs.add_void_intrinsic("decimal_adjust_add"),
            decimal_adjust_sub: defs.add_void_intrinsic("decimal_adjust_sub"),
            cmp: defs.add_void_intrinsic("cmp"),
            cmp_branch_not_equal: defs.add_void_intrinsic("cmp_branch_not_equal"),
            dec_branch_not_zero: defs.add_void_intrinsic("dec_branch_not_zero"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DefinitionKind, IntrinsicKind};

    #[test]
    fn test_define() {
        let mut defs = Definitions::new();
        let regs = Registers::define(&mut defs);
        let intrinsics = Intrinsics::define(&mut defs);

        assert_eq!(defs.register("ya").unwrap(), regs.ya);
        assert_eq!(defs.register_type(regs.ya), Some(ValueType::u16()));
        assert_eq!(defs.register_type(regs.carry), Some(ValueType::bool()));
        assert!(defs.register("cmp").is_err());
        assert_eq!(
            defs.kind(intrinsics.pop),
            Some(DefinitionKind::Intrinsic(IntrinsicKind::Load(ValueType::u8())))
        );
        assert_eq!(defs.name(intrinsics.dec_branch_not_zero), "dec_branch_not_zero");
        assert_eq!(defs.len(), 29);
    }
}

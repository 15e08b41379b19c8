//! SPC700 platform
//!
//! Sony SPC700, the audio CPU of the SNES. 8-bit registers `a`, `x`, `y`,
//! the `ya` pair for 16-bit work, a relocatable direct page and a 64 KiB
//! address space.

mod condition;
mod instructions;
mod registers;

use log::debug;
use crate::common::IselResult;
use crate::ir::{BinaryOp, Expression};
use crate::isel::{CompositeRegisters, InstructionTable, TestAndBranch};
use crate::types::{Definitions, ValueType};
use super::Platform;

pub use instructions::{LONG, SHORT};
pub use registers::{Intrinsics, Registers};

/// SPC700 instruction selection platform
#[derive(Debug)]
pub struct Spc700Platform {
    definitions: Definitions,
    registers: Registers,
    intrinsics: Intrinsics,
    instructions: InstructionTable,
    composites: CompositeRegisters,
}

impl Spc700Platform {
    pub fn new() -> IselResult<Self> {
        let mut definitions = Definitions::new();
        let registers = Registers::define(&mut definitions);
        let intrinsics = Intrinsics::define(&mut definitions);

        let mut composites = CompositeRegisters::new();
        composites.register_decomposition(&definitions, registers.ya, [registers.y, registers.a])?;

        let mut instructions = InstructionTable::new();
        instructions::register_all(&mut instructions, &registers, &intrinsics)?;
        debug!(
            "spc700: {} definitions, {} instructions",
            definitions.len(),
            instructions.len()
        );

        Ok(Self {
            definitions,
            registers,
            intrinsics,
            instructions,
            composites,
        })
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }
}

impl Platform for Spc700Platform {
    fn name(&self) -> &'static str {
        "spc700"
    }

    fn target(&self) -> &'static str {
        "Sony SPC700 (SNES audio processor)"
    }

    fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    fn instructions(&self) -> &InstructionTable {
        &self.instructions
    }

    fn composite_registers(&self) -> &CompositeRegisters {
        &self.composites
    }

    fn test_and_branch<'e>(
        &self,
        ty: ValueType,
        op: BinaryOp,
        left: &'e Expression,
        right: &'e Expression,
        distance_hint: usize,
    ) -> Option<TestAndBranch<'e>> {
        self.lower_comparison(ty, op, left, right, distance_hint)
    }
}

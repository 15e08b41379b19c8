//! Emission session
//!
//! The caller side of instruction selection: resolves expressions into
//! operands, selects and emits into one contiguous section, turns selection
//! misses into "invalid operand combination" errors and expands
//! test-and-branch plans into compare plus conditional jumps.

use log::trace;
use crate::backend::Platform;
use crate::common::{Diagnostics, IselError, IselResult, Report, Span};
use crate::ir::{BinaryOp, Expression};
use crate::isel::{Bank, BranchKind, InstructionType, Operand, PlatformBranch, TestAndBranch};
use crate::types::ValueType;

/// Distance hint of every non-branch instruction
const NEAR: usize = 0;

/// Runtime options of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Absolute address of the first emitted byte
    pub origin: u32,
    /// Distance hint for branches, 0 selects the short forms
    pub distance_hint: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            origin: 0x0200,
            distance_hint: 0,
        }
    }
}

struct Position(u32);

impl Bank for Position {
    fn absolute_address(&self) -> u32 {
        self.0
    }
}

/// Emits instructions for one platform into a single section
pub struct Session<'p> {
    platform: &'p dyn Platform,
    config: SessionConfig,
    output: Vec<u8>,
    diagnostics: Diagnostics,
}

impl<'p> Session<'p> {
    pub fn new(platform: &'p dyn Platform, config: SessionConfig) -> Self {
        Self {
            platform,
            config,
            output: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn platform(&self) -> &'p dyn Platform {
        self.platform
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Address of the next emitted byte
    pub fn address(&self) -> u32 {
        self.config.origin.wrapping_add(self.output.len() as u32)
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Output and diagnostics. The output must not be used when any error
    /// was reported.
    pub fn finish(self) -> (Vec<u8>, Diagnostics) {
        (self.output, self.diagnostics)
    }

    pub fn resolve(expr: &Expression) -> IselResult<Operand> {
        Operand::from_expression(expr).ok_or(IselError::UnresolvableOperand { span: expr.span })
    }

    /// Select and emit a non-branch instruction. Returns the bytes written.
    pub fn emit(
        &mut self,
        ty: impl Into<InstructionType>,
        operands: &[&Expression],
        location: Span,
    ) -> IselResult<usize> {
        let operands = operands
            .iter()
            .map(|expr| Self::resolve(expr))
            .collect::<IselResult<Vec<_>>>()?;
        self.emit_operands(ty.into(), NEAR, &operands, location)
    }

    /// Unconditional jump using the configured distance hint
    pub fn goto(&mut self, dest: u32, location: Span) -> IselResult<usize> {
        let operands = [Operand::Integer(dest.into())];
        self.emit_operands(BranchKind::Goto.into(), self.config.distance_hint, &operands, location)
    }

    /// Select and emit from resolved operands
    pub fn emit_operands(
        &mut self,
        ty: InstructionType,
        distance_hint: usize,
        operands: &[Operand],
        location: Span,
    ) -> IselResult<usize> {
        let platform = self.platform;
        let Some(selection) = platform.instructions().select(ty, distance_hint, operands) else {
            return Err(self.invalid_operands(ty, location));
        };

        let bank = Position(self.address());
        let start = self.output.len();
        let ok = selection.emit(&mut self.diagnostics, &bank, &mut self.output, location);
        let written = self.output.len() - start;
        trace!("{:#06X}: {:02X?}", bank.0, &self.output[start..]);

        if ok {
            Ok(written)
        } else {
            let name = ty.display(platform.definitions()).to_string();
            Err(IselError::encoding_failed(name, location))
        }
    }

    /// Jump to `dest` when `left op right` holds
    pub fn branch_if(
        &mut self,
        ty: ValueType,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        dest: u32,
        location: Span,
    ) -> IselResult<()> {
        let plan = self
            .platform
            .test_and_branch(ty, op, left, right, self.config.distance_hint)
            .ok_or_else(|| IselError::no_lowering(op.to_string(), location))?;
        self.emit_test_and_branch(&plan, dest, location)
    }

    /// Emit a lowered comparison
    ///
    /// Fused plans become one instruction with `dest` appended. Otherwise the
    /// compare is followed by one conditional jump per flag test: passing
    /// tests jump to `dest`, failing tests jump past the sequence.
    pub fn emit_test_and_branch(&mut self, plan: &TestAndBranch<'_>, dest: u32, location: Span) -> IselResult<()> {
        let mut operands = plan
            .operands
            .iter()
            .map(|expr| Self::resolve(expr))
            .collect::<IselResult<Vec<_>>>()?;

        if plan.is_fused() {
            operands.push(Operand::Integer(dest.into()));
            self.emit_operands(plan.ty, self.config.distance_hint, &operands, location)?;
            return Ok(());
        }

        let platform = self.platform;
        let goto = InstructionType::Branch(BranchKind::Goto);
        let hint = self.config.distance_hint;

        // Sizes do not depend on the destination, so the whole sequence is
        // laid out before anything is written.
        let mut length = match platform.instructions().select(plan.ty, NEAR, &operands) {
            Some(selection) => selection.size(),
            None => return Err(self.invalid_operands(plan.ty, location)),
        };
        for branch in &plan.branches {
            let operands = flag_test(branch, dest);
            match platform.instructions().select(goto, hint, &operands) {
                Some(selection) => length += selection.size(),
                None => return Err(self.invalid_operands(goto, location)),
            }
        }
        let end = self.address().wrapping_add(length as u32);

        self.emit_operands(plan.ty, NEAR, &operands, location)?;
        for branch in &plan.branches {
            let target = if branch.success { dest } else { end };
            self.emit_operands(goto, hint, &flag_test(branch, target), location)?;
        }
        Ok(())
    }

    fn invalid_operands(&mut self, ty: InstructionType, location: Span) -> IselError {
        let name = ty.display(self.platform.definitions()).to_string();
        self.diagnostics
            .error(&format!("invalid operand combination for `{}`", name), location);
        IselError::no_match(name, location)
    }
}

/// `goto target if flag == value`
fn flag_test(branch: &PlatformBranch, target: u32) -> [Operand; 3] {
    [
        Operand::Integer(target.into()),
        Operand::Register(branch.flag),
        Operand::Boolean(branch.value),
    ]
}

//! Test-and-branch plans produced by condition lowering

use crate::ir::Expression;
use crate::types::Definition;
use super::InstructionType;

/// One flag test of a lowered comparison
///
/// When `flag` holds `value` the comparison is decided and its outcome is
/// `success`. Otherwise evaluation moves to the next test. A list of
/// `success = true` tests is therefore an OR, and a `success = false` test
/// guards (ANDs) the tests after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformBranch {
    pub flag: Definition,
    pub value: bool,
    pub success: bool,
}

impl PlatformBranch {
    pub fn new(flag: Definition, value: bool, success: bool) -> Self {
        Self { flag, value, success }
    }
}

/// Lowered comparison: one compare or fused intrinsic followed by flag tests
///
/// A fused branch intrinsic carries no tests. The caller appends the branch
/// destination as its last operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestAndBranch<'e> {
    pub ty: InstructionType,
    pub operands: Vec<&'e Expression>,
    pub branches: Vec<PlatformBranch>,
}

impl<'e> TestAndBranch<'e> {
    pub fn new(ty: InstructionType, operands: Vec<&'e Expression>, branches: Vec<PlatformBranch>) -> Self {
        Self { ty, operands, branches }
    }

    /// Whether the operation itself branches
    pub fn is_fused(&self) -> bool {
        self.branches.is_empty()
    }
}

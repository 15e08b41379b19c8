//! Platform trait and implementations
//!
//! A platform supplies everything target specific the selection engine needs:
//! 1. Builtin registers, flags and intrinsics
//! 2. The instruction table, in priority order
//! 3. Composite register decompositions
//! 4. Lowering of comparisons into compare plus flag branches

pub mod spc700;

use crate::common::IselResult;
use crate::ir::{BinaryOp, Expression};
use crate::isel::{CompositeRegisters, InstructionTable, TestAndBranch};
use crate::types::{Definitions, ValueType};

pub use spc700::Spc700Platform;

/// Trait for instruction selection targets
///
/// All state is built at construction and read-only afterwards, so a
/// platform can be shared between threads.
pub trait Platform: Send + Sync {
    /// The name of this platform (e.g., "spc700")
    fn name(&self) -> &'static str;

    /// Target CPU description
    fn target(&self) -> &'static str;

    fn definitions(&self) -> &Definitions;

    fn instructions(&self) -> &InstructionTable;

    fn composite_registers(&self) -> &CompositeRegisters;

    /// Lower `left op right` of type `ty` into a test-and-branch plan
    ///
    /// `None` means no specialized lowering exists and the caller must fall
    /// back to a generic sequence.
    fn test_and_branch<'e>(
        &self,
        ty: ValueType,
        op: BinaryOp,
        left: &'e Expression,
        right: &'e Expression,
        distance_hint: usize,
    ) -> Option<TestAndBranch<'e>>;
}

/// Registry of available platforms
pub struct PlatformRegistry {
    platforms: Vec<Box<dyn Platform>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self { platforms: Vec::new() }
    }

    /// Registry with every built-in platform
    pub fn with_builtin() -> IselResult<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(Spc700Platform::new()?));
        Ok(registry)
    }

    pub fn register(&mut self, platform: Box<dyn Platform>) {
        self.platforms.push(platform);
    }

    pub fn find_by_name(&self, name: &str) -> Option<&dyn Platform> {
        self.platforms.iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn default_platform(&self) -> Option<&dyn Platform> {
        self.platforms.first().map(|p| p.as_ref())
    }

    pub fn list(&self) -> impl Iterator<Item = &dyn Platform> {
        self.platforms.iter().map(|p| p.as_ref())
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

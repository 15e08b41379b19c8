//! Builtin definitions registry
//!
//! Registers, flags and intrinsics are created once while a platform is set
//! up. Everything downstream refers to them through a [`Definition`] handle,
//! which is `Copy` and compares by identity.

use std::collections::HashMap;
use string_interner::{DefaultStringInterner, DefaultSymbol};
use crate::common::{IselError, IselResult};
use super::ValueType;

/// Opaque handle to a builtin register, flag or intrinsic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Definition(u32);

impl Definition {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a definition stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// A machine register. Flags are registers of type `bool`.
    Register(ValueType),
    /// A builtin operation exposed to source code as a function
    Intrinsic(IntrinsicKind),
}

/// Intrinsic flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicKind {
    /// Called for its effect (`nop()`, `push(a)`)
    Void,
    /// Produces a value into its operand (`a = pop()`)
    Load(ValueType),
}

#[derive(Debug, Clone)]
struct Entry {
    name: DefaultSymbol,
    kind: DefinitionKind,
}

/// Registry of builtin definitions with interned names
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    names: DefaultStringInterner,
    entries: Vec<Entry>,
    by_name: HashMap<DefaultSymbol, Definition>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, name: &str, kind: DefinitionKind) -> Definition {
        let symbol = self.names.get_or_intern(name);
        let definition = Definition(self.entries.len() as u32);
        self.entries.push(Entry { name: symbol, kind });
        self.by_name.insert(symbol, definition);
        definition
    }

    /// Create a register (or flag, when `ty` is `bool`)
    pub fn add_register(&mut self, name: &str, ty: ValueType) -> Definition {
        self.add(name, DefinitionKind::Register(ty))
    }

    pub fn add_void_intrinsic(&mut self, name: &str) -> Definition {
        self.add(name, DefinitionKind::Intrinsic(IntrinsicKind::Void))
    }

    pub fn add_load_intrinsic(&mut self, name: &str, ty: ValueType) -> Definition {
        self.add(name, DefinitionKind::Intrinsic(IntrinsicKind::Load(ty)))
    }

    /// Find a definition by name. Later definitions shadow earlier ones.
    pub fn lookup(&self, name: &str) -> Option<Definition> {
        let symbol = self.names.get(name)?;
        self.by_name.get(&symbol).copied()
    }

    /// Find a register by name
    pub fn register(&self, name: &str) -> IselResult<Definition> {
        self.lookup(name)
            .filter(|&def| self.is_register(def))
            .ok_or_else(|| IselError::UnknownRegister { name: name.to_string() })
    }

    pub fn name(&self, definition: Definition) -> &str {
        self.entries
            .get(definition.index())
            .and_then(|entry| self.names.resolve(entry.name))
            .unwrap_or("<unknown>")
    }

    pub fn kind(&self, definition: Definition) -> Option<DefinitionKind> {
        self.entries.get(definition.index()).map(|entry| entry.kind)
    }

    pub fn is_register(&self, definition: Definition) -> bool {
        matches!(self.kind(definition), Some(DefinitionKind::Register(_)))
    }

    /// Type held by a register, `None` for intrinsics
    pub fn register_type(&self, definition: Definition) -> Option<ValueType> {
        match self.kind(definition)? {
            DefinitionKind::Register(ty) => Some(ty),
            DefinitionKind::Intrinsic(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Definition> + '_ {
        (0..self.entries.len() as u32).map(Definition)
    }
}

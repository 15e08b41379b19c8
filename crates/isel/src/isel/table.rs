//! Instruction table and selection
//!
//! Candidates sharing an operation and arity are kept in registration order.
//! Selection walks that list and takes the first candidate whose every
//! operand position matches, so earlier registrations win.

use std::collections::HashMap;
use log::trace;
use crate::common::{IselError, IselResult, Report, Span};
use crate::types::Definition;
use super::{Bank, CaptureLists, Encoding, InstructionOptions, InstructionSignature, InstructionType, Operand};

/// One registered candidate
#[derive(Debug)]
pub struct Instruction {
    pub signature: InstructionSignature,
    pub encoding: &'static dyn Encoding,
    pub options: InstructionOptions,
}

impl Instruction {
    /// Match every operand position, collecting one capture list per position
    pub fn match_operands<'o>(&self, operands: &'o [Operand]) -> Option<CaptureLists<'o>> {
        if operands.len() != self.signature.arity() {
            return None;
        }
        let lists = self
            .signature
            .operands
            .iter()
            .zip(operands)
            .map(|(pattern, operand)| pattern.match_operand(operand))
            .collect::<Option<Vec<_>>>()?;
        Some(CaptureLists::new(lists))
    }

    /// Whether running this instruction leaves `flag` undefined
    pub fn clobbers(&self, flag: Definition) -> bool {
        self.options.invalidated.contains(&flag)
    }
}

/// A matched candidate with its captures, ready to emit
#[derive(Debug)]
pub struct Selection<'t, 'o> {
    pub instruction: &'t Instruction,
    pub captures: CaptureLists<'o>,
}

impl Selection<'_, '_> {
    pub fn size(&self) -> usize {
        self.instruction.encoding.size(&self.instruction.options, &self.captures)
    }

    pub fn emit(&self, report: &mut dyn Report, bank: &dyn Bank, buffer: &mut Vec<u8>, location: Span) -> bool {
        let instruction = self.instruction;
        instruction
            .encoding
            .emit(report, bank, buffer, &instruction.options, &self.captures, location)
    }
}

type Key = (InstructionType, usize);

/// Registered instructions of a platform
#[derive(Debug, Default)]
pub struct InstructionTable {
    instructions: Vec<Instruction>,
    by_key: HashMap<Key, Vec<usize>>,
}

impl InstructionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate after the existing ones for its `(operation, arity)`
    ///
    /// Fails when the options do not give the encoding enough slots or a slot
    /// points at a capture the signature can never produce.
    pub fn register(
        &mut self,
        signature: InstructionSignature,
        encoding: &'static dyn Encoding,
        options: InstructionOptions,
    ) -> IselResult<()> {
        let describe = || format!("{:?}/{} {:02X?}", signature.ty, signature.arity(), options.opcode);

        if options.slots.len() < encoding.slot_count() {
            return Err(IselError::malformed(
                describe(),
                format!("encoding `{}` reads {} slots, {} given", encoding.name(), encoding.slot_count(), options.slots.len()),
            ));
        }
        for slot in &options.slots {
            let captures = signature
                .operands
                .get(slot.operand)
                .map(|pattern| pattern.capture_count())
                .unwrap_or(0);
            if slot.capture >= captures {
                return Err(IselError::malformed(
                    describe(),
                    format!("slot ({}, {}) refers to a capture that does not exist", slot.operand, slot.capture),
                ));
            }
        }

        let key = (signature.ty, signature.arity());
        self.by_key.entry(key).or_default().push(self.instructions.len());
        self.instructions.push(Instruction { signature, encoding, options });
        Ok(())
    }

    /// Candidates for an operation and arity, in priority order
    pub fn candidates(&self, ty: InstructionType, arity: usize) -> impl Iterator<Item = &Instruction> + '_ {
        self.by_key
            .get(&(ty, arity))
            .into_iter()
            .flatten()
            .map(|&index| &self.instructions[index])
    }

    /// First candidate with the given distance hint matching all operands
    pub fn select<'o>(
        &self,
        ty: InstructionType,
        distance_hint: usize,
        operands: &'o [Operand],
    ) -> Option<Selection<'_, 'o>> {
        let mut tried = 0;
        for instruction in self.candidates(ty, operands.len()) {
            if instruction.signature.distance_hint != distance_hint {
                continue;
            }
            tried += 1;
            if let Some(captures) = instruction.match_operands(operands) {
                trace!(
                    "selected {:?} opcode {:02X?} after {} candidate(s)",
                    ty, instruction.options.opcode, tried
                );
                return Some(Selection { instruction, captures });
            }
        }
        trace!("no match for {:?}/{} after {} candidate(s)", ty, operands.len(), tried);
        None
    }

    /// Whether [`select`](Self::select) would succeed. Never emits.
    pub fn can_select(&self, ty: InstructionType, distance_hint: usize, operands: &[Operand]) -> bool {
        self.select(ty, distance_hint, operands).is_some()
    }

    /// All instructions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Diagnostics;
    use crate::ir::BinaryOp;
    use crate::isel::encoding::{Implicit, Operand16, Operand8, PcRelative8};
    use crate::isel::{BranchKind, OperandPattern, Slot};
    use crate::types::{Definitions, ValueType};
    use pretty_assertions::assert_eq;

    struct At(u32);

    impl Bank for At {
        fn absolute_address(&self) -> u32 {
            self.0
        }
    }

    fn assign(defs: &Definitions) -> (OperandPattern, InstructionType) {
        let a = defs.lookup("a").unwrap();
        (OperandPattern::Register(a), BinaryOp::Assignment.into())
    }

    fn setup() -> (Definitions, InstructionTable) {
        let mut defs = Definitions::new();
        defs.add_register("a", ValueType::u8());
        let (a, ty) = assign(&defs);

        let mut table = InstructionTable::new();
        // a = dp before a = abs; every dp address also fits the abs pattern
        table
            .register(
                InstructionSignature::new(ty, 0, vec![
                    a.clone(),
                    OperandPattern::deref(OperandPattern::capture(OperandPattern::range(0, 0xFF)), 1),
                ]),
                &Operand8,
                InstructionOptions::new([0xE4], [Slot::at(1)]),
            )
            .unwrap();
        table
            .register(
                InstructionSignature::new(ty, 0, vec![
                    a,
                    OperandPattern::deref(OperandPattern::capture(OperandPattern::range(0, 0xFFFF)), 1),
                ]),
                &Operand16,
                InstructionOptions::new([0xE5], [Slot::at(1)]),
            )
            .unwrap();
        (defs, table)
    }

    fn load(defs: &Definitions, address: i128) -> Vec<Operand> {
        vec![
            Operand::Register(defs.lookup("a").unwrap()),
            Operand::deref(Operand::Integer(address), 1),
        ]
    }

    fn emit(table: &InstructionTable, ty: InstructionType, operands: &[Operand]) -> Vec<u8> {
        let selection = table.select(ty, 0, operands).unwrap();
        let mut diagnostics = Diagnostics::new();
        let mut buffer = Vec::new();
        assert!(selection.emit(&mut diagnostics, &At(0), &mut buffer, Span::synthetic()));
        assert_eq!(buffer.len(), selection.size());
        buffer
    }

    #[test]
    fn test_first_registered_wins() {
        let (defs, table) = setup();
        let (_, ty) = assign(&defs);
        assert_eq!(emit(&table, ty, &load(&defs, 0x12)), vec![0xE4, 0x12]);
    }

    #[test]
    fn test_falls_through_to_wider_form() {
        let (defs, table) = setup();
        let (_, ty) = assign(&defs);
        assert_eq!(emit(&table, ty, &load(&defs, 0x1234)), vec![0xE5, 0x34, 0x12]);
    }

    #[test]
    fn test_no_candidate() {
        let (defs, table) = setup();
        let (_, ty) = assign(&defs);
        assert!(table.select(ty, 0, &load(&defs, 0x10000)).is_none());
        assert!(!table.can_select(ty, 0, &load(&defs, 0x10000)));
        // different arity
        assert!(table.select(ty, 0, &load(&defs, 0x12)[..1]).is_none());
        // different operation
        assert!(table.select(BinaryOp::Addition.into(), 0, &load(&defs, 0x12)).is_none());
    }

    #[test]
    fn test_distance_hint_separates_forms() {
        let mut table = InstructionTable::new();
        let dest = || vec![OperandPattern::capture(OperandPattern::range(0, 0xFFFF))];
        table
            .register(
                InstructionSignature::new(BranchKind::Goto, 0, dest()),
                &PcRelative8,
                InstructionOptions::new([0x2F], [Slot::at(0)]),
            )
            .unwrap();
        table
            .register(
                InstructionSignature::new(BranchKind::Goto, 1, dest()),
                &Operand16,
                InstructionOptions::new([0x5F], [Slot::at(0)]),
            )
            .unwrap();

        let operands = [Operand::Integer(0x400)];
        let short = table.select(BranchKind::Goto.into(), 0, &operands).unwrap();
        let long = table.select(BranchKind::Goto.into(), 1, &operands).unwrap();
        assert_eq!(short.instruction.options.opcode, vec![0x2F]);
        assert_eq!(long.instruction.options.opcode, vec![0x5F]);
        assert!(table.select(BranchKind::Goto.into(), 2, &operands).is_none());
    }

    #[test]
    fn test_register_rejects_bad_slots() {
        let (defs, mut table) = setup();
        let (a, ty) = assign(&defs);

        // not enough slots for the encoding
        let result = table.register(
            InstructionSignature::new(ty, 0, vec![a.clone(), OperandPattern::range(0, 0xFF)]),
            &Operand8,
            InstructionOptions::implicit([0xE8]),
        );
        assert!(matches!(result, Err(IselError::MalformedInstruction { .. })));

        // slot points at an operand without captures
        let result = table.register(
            InstructionSignature::new(ty, 0, vec![a.clone(), OperandPattern::range(0, 0xFF)]),
            &Operand8,
            InstructionOptions::new([0xE8], [Slot::at(1)]),
        );
        assert!(matches!(result, Err(IselError::MalformedInstruction { .. })));

        // slot past the last operand
        let result = table.register(
            InstructionSignature::new(ty, 0, vec![a]),
            &Implicit,
            InstructionOptions::new([0x00], [Slot::at(3)]),
        );
        assert!(result.is_err());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_candidates_keep_order() {
        let (defs, table) = setup();
        let (_, ty) = assign(&defs);
        let opcodes: Vec<_> = table.candidates(ty, 2).map(|i| i.options.opcode[0]).collect();
        assert_eq!(opcodes, vec![0xE4, 0xE5]);
    }
}

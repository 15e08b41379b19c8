//! Encoding rules
//!
//! An encoding is a stateless size/emit pair shared by every opcode with the
//! same byte layout. The per-instruction details (opcode bytes and which
//! captures feed which field) come from [`InstructionOptions`].
//!
//! `emit` must produce exactly `size` bytes, on success and on failure, so
//! that address layout stays valid after a diagnostic.

use crate::common::{Report, Span};
use super::{CaptureList, InstructionOptions, Operand, Slot};

pub const PC_RELATIVE_RANGE_ERROR: &str =
    "pc-relative offset is outside of representable signed 8-bit range -128..127";
pub const ABSOLUTE_BIT_RANGE_ERROR: &str =
    "absolute address is outside representable unsigned 13-bit range 0x0000..0x1FFF used by single-bit instruction";

/// Output location the instruction is emitted at
pub trait Bank {
    /// Absolute address of the first byte of the instruction being emitted
    fn absolute_address(&self) -> u32;
}

/// Captures of every operand position of a matched signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureLists<'o>(Vec<CaptureList<'o>>);

impl<'o> CaptureLists<'o> {
    pub fn new(lists: Vec<CaptureList<'o>>) -> Self {
        Self(lists)
    }

    pub fn get(&self, slot: Slot) -> Option<&'o Operand> {
        self.0.get(slot.operand)?.get(slot.capture).copied()
    }

    /// Integer value at `slot`
    ///
    /// Slots are validated against the signature when an instruction is
    /// registered, so a missing or non-integer capture reads as zero.
    pub fn integer(&self, slot: Slot) -> i128 {
        self.get(slot).and_then(Operand::as_integer).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Size computation and byte emission for one byte layout
pub trait Encoding: Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Number of option slots read by this encoding
    fn slot_count(&self) -> usize;

    fn size(&self, options: &InstructionOptions, captures: &CaptureLists<'_>) -> usize;

    /// Append the instruction to `buffer`. Returns false after reporting an
    /// error; the promised number of bytes is written either way.
    fn emit(
        &self,
        report: &mut dyn Report,
        bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        location: Span,
    ) -> bool;
}

// ============================================================================
// Helpers
// ============================================================================

fn param(options: &InstructionOptions, captures: &CaptureLists<'_>, index: usize) -> i128 {
    options.slot(index).map_or(0, |slot| captures.integer(slot))
}

fn push_u16(buffer: &mut Vec<u8>, value: i128) {
    buffer.extend_from_slice(&(value as u16).to_le_bytes());
}

fn count(value: i128) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Opcode bytes with a bit subscript OR'ed into bits 5..7 of the last byte
fn opcode_with_bit(opcode: &[u8], bit: i128) -> Vec<u8> {
    let mut bytes = opcode.to_vec();
    if let Some(last) = bytes.last_mut() {
        *last |= ((bit as u8) & 0x07) << 5;
    }
    bytes
}

/// Append a signed 8-bit displacement from the start of an instruction of
/// `instruction_size` bytes to `dest`
fn push_pc_relative(
    report: &mut dyn Report,
    bank: &dyn Bank,
    buffer: &mut Vec<u8>,
    dest: i128,
    instruction_size: usize,
    location: Span,
) -> bool {
    let base = i128::from(bank.absolute_address());
    let offset = dest - base - instruction_size as i128;
    match i8::try_from(offset) {
        Ok(offset) => {
            buffer.push(offset as u8);
            true
        }
        Err(_) => {
            buffer.push(0);
            report.error(PC_RELATIVE_RANGE_ERROR, location);
            false
        }
    }
}

// ============================================================================
// Encodings
// ============================================================================

/// Opcode bytes only
#[derive(Debug)]
pub struct Implicit;

impl Encoding for Implicit {
    fn name(&self) -> &'static str {
        "implicit"
    }

    fn slot_count(&self) -> usize {
        0
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len()
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        _captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        buffer.extend_from_slice(&options.opcode);
        true
    }
}

/// Opcode followed by one byte: `[op, u8]`
#[derive(Debug)]
pub struct Operand8;

impl Encoding for Operand8 {
    fn name(&self) -> &'static str {
        "u8"
    }

    fn slot_count(&self) -> usize {
        1
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 1
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        buffer.extend_from_slice(&options.opcode);
        buffer.push(param(options, captures, 0) as u8);
        true
    }
}

/// Opcode followed by a little-endian word: `[op, lo, hi]`
#[derive(Debug)]
pub struct Operand16;

impl Encoding for Operand16 {
    fn name(&self) -> &'static str {
        "u16"
    }

    fn slot_count(&self) -> usize {
        1
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 2
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        buffer.extend_from_slice(&options.opcode);
        push_u16(buffer, param(options, captures, 0));
        true
    }
}

/// Opcode followed by two bytes in slot order, independent of operand order
#[derive(Debug)]
pub struct Operand8Operand8;

impl Encoding for Operand8Operand8 {
    fn name(&self) -> &'static str {
        "u8,u8"
    }

    fn slot_count(&self) -> usize {
        2
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 2
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        buffer.extend_from_slice(&options.opcode);
        buffer.push(param(options, captures, 0) as u8);
        buffer.push(param(options, captures, 1) as u8);
        true
    }
}

/// Short branch: `[op, rel8]`, slot 0 is the destination
#[derive(Debug)]
pub struct PcRelative8;

impl Encoding for PcRelative8 {
    fn name(&self) -> &'static str {
        "rel8"
    }

    fn slot_count(&self) -> usize {
        1
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 1
    }

    fn emit(
        &self,
        report: &mut dyn Report,
        bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        location: Span,
    ) -> bool {
        let size = self.size(options, captures);
        buffer.extend_from_slice(&options.opcode);
        push_pc_relative(report, bank, buffer, param(options, captures, 0), size, location)
    }
}

/// Operand byte then short branch: `[op, u8, rel8]`, slots are (operand, destination)
#[derive(Debug)]
pub struct Operand8PcRelative8;

impl Encoding for Operand8PcRelative8 {
    fn name(&self) -> &'static str {
        "u8,rel8"
    }

    fn slot_count(&self) -> usize {
        2
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 2
    }

    fn emit(
        &self,
        report: &mut dyn Report,
        bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        location: Span,
    ) -> bool {
        let size = self.size(options, captures);
        buffer.extend_from_slice(&options.opcode);
        buffer.push(param(options, captures, 0) as u8);
        push_pc_relative(report, bank, buffer, param(options, captures, 1), size, location)
    }
}

/// Operand byte after the first opcode byte, word at the end:
/// `[op0, u8, op1.., lo, hi]`. Slots are (byte, word).
#[derive(Debug)]
pub struct SplitOperand8Operand16;

impl Encoding for SplitOperand8Operand16 {
    fn name(&self) -> &'static str {
        "u8..u16"
    }

    fn slot_count(&self) -> usize {
        2
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 3
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        let (head, tail) = options.opcode.split_at(options.opcode.len().min(1));
        buffer.extend_from_slice(head);
        buffer.push(param(options, captures, 0) as u8);
        buffer.extend_from_slice(tail);
        push_u16(buffer, param(options, captures, 1));
        true
    }
}

/// Direct-page bit access, subscript in the opcode: `[op | bit << 5, dp]`
///
/// Slots: (direct page address, bit subscript).
#[derive(Debug)]
pub struct DirectBitIndex;

impl Encoding for DirectBitIndex {
    fn name(&self) -> &'static str {
        "dp.bit"
    }

    fn slot_count(&self) -> usize {
        2
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 1
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        let dp = param(options, captures, 0);
        let bit = param(options, captures, 1);
        buffer.extend(opcode_with_bit(&options.opcode, bit));
        buffer.push(dp as u8);
        true
    }
}

/// Branch on a direct-page bit: `[op | bit << 5, dp, rel8]`
///
/// Slots: (direct page address, bit subscript, destination).
#[derive(Debug)]
pub struct DirectBitBranch;

impl Encoding for DirectBitBranch {
    fn name(&self) -> &'static str {
        "dp.bit,rel8"
    }

    fn slot_count(&self) -> usize {
        3
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 2
    }

    fn emit(
        &self,
        report: &mut dyn Report,
        bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        location: Span,
    ) -> bool {
        let size = self.size(options, captures);
        let dp = param(options, captures, 0);
        let bit = param(options, captures, 1);
        buffer.extend(opcode_with_bit(&options.opcode, bit));
        buffer.push(dp as u8);
        push_pc_relative(report, bank, buffer, param(options, captures, 2), size, location)
    }
}

/// Long branch on a direct-page bit: inverted bit branch over an absolute jump
///
/// Opcode is `[inverted bit branch, jump...]`, emitted as
/// `[op0 | bit << 5, dp, skip, jump..., lo, hi]`.
/// Slots: (direct page address, bit subscript, destination).
#[derive(Debug)]
pub struct DirectBitBranchLong;

impl Encoding for DirectBitBranchLong {
    fn name(&self) -> &'static str {
        "dp.bit,abs"
    }

    fn slot_count(&self) -> usize {
        3
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 4
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        let dp = param(options, captures, 0);
        let bit = param(options, captures, 1);
        let (branch, jump) = options.opcode.split_at(options.opcode.len().min(1));

        buffer.extend(opcode_with_bit(branch, bit));
        buffer.push(dp as u8);
        buffer.push((jump.len() + 2) as u8);
        buffer.extend_from_slice(jump);
        push_u16(buffer, param(options, captures, 2));
        true
    }
}

/// Absolute bit access: 13-bit address and 3-bit subscript packed into one
/// little-endian word `[op, lo, hi]`
///
/// Slots: (absolute address, bit subscript).
#[derive(Debug)]
pub struct AbsoluteBitIndex;

impl Encoding for AbsoluteBitIndex {
    fn name(&self) -> &'static str {
        "abs13.bit"
    }

    fn slot_count(&self) -> usize {
        2
    }

    fn size(&self, options: &InstructionOptions, _captures: &CaptureLists<'_>) -> usize {
        options.opcode.len() + 2
    }

    fn emit(
        &self,
        report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        location: Span,
    ) -> bool {
        let address = param(options, captures, 0);
        let bit = param(options, captures, 1);
        buffer.extend_from_slice(&options.opcode);

        if (0..0x2000).contains(&address) {
            push_u16(buffer, (address & 0x1FFF) | ((bit & 0x07) << 13));
            true
        } else {
            push_u16(buffer, 0);
            report.error(ABSOLUTE_BIT_RANGE_ERROR, location);
            false
        }
    }
}

/// Opcode repeated `count` times, slot 0 is the count
#[derive(Debug)]
pub struct RepeatedImplicit;

impl Encoding for RepeatedImplicit {
    fn name(&self) -> &'static str {
        "implicit*n"
    }

    fn slot_count(&self) -> usize {
        1
    }

    fn size(&self, options: &InstructionOptions, captures: &CaptureLists<'_>) -> usize {
        count(param(options, captures, 0)) * options.opcode.len()
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        for _ in 0..count(param(options, captures, 0)) {
            buffer.extend_from_slice(&options.opcode);
        }
        true
    }
}

/// `[op, u8]` repeated `count` times. Slots: (operand, count).
#[derive(Debug)]
pub struct RepeatedOperand8;

impl Encoding for RepeatedOperand8 {
    fn name(&self) -> &'static str {
        "u8*n"
    }

    fn slot_count(&self) -> usize {
        2
    }

    fn size(&self, options: &InstructionOptions, captures: &CaptureLists<'_>) -> usize {
        count(param(options, captures, 1)) * (options.opcode.len() + 1)
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        let value = param(options, captures, 0) as u8;
        for _ in 0..count(param(options, captures, 1)) {
            buffer.extend_from_slice(&options.opcode);
            buffer.push(value);
        }
        true
    }
}

/// `[op, lo, hi]` repeated `count` times. Slots: (operand, count).
#[derive(Debug)]
pub struct RepeatedOperand16;

impl Encoding for RepeatedOperand16 {
    fn name(&self) -> &'static str {
        "u16*n"
    }

    fn slot_count(&self) -> usize {
        2
    }

    fn size(&self, options: &InstructionOptions, captures: &CaptureLists<'_>) -> usize {
        count(param(options, captures, 1)) * (options.opcode.len() + 2)
    }

    fn emit(
        &self,
        _report: &mut dyn Report,
        _bank: &dyn Bank,
        buffer: &mut Vec<u8>,
        options: &InstructionOptions,
        captures: &CaptureLists<'_>,
        _location: Span,
    ) -> bool {
        let value = param(options, captures, 0);
        for _ in 0..count(param(options, captures, 1)) {
            buffer.extend_from_slice(&options.opcode);
            push_u16(buffer, value);
        }
        true
    }
}

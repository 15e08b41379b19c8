//! Composite registers
//!
//! Some registers are the concatenation of narrower ones (`ya` is `y:a`).
//! The registry only records the decomposition. [`RegisterFile`] gives it
//! observable meaning by keeping the parts and the whole consistent.

use std::collections::HashMap;
use crate::common::{IselError, IselResult};
use crate::types::{Definition, Definitions};

/// Wide register to parts mapping, parts listed most-significant first
#[derive(Debug, Clone, Default)]
pub struct CompositeRegisters {
    parts: HashMap<Definition, Vec<Definition>>,
    owners: HashMap<Definition, Definition>,
}

impl CompositeRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_decomposition(
        &mut self,
        definitions: &Definitions,
        wide: Definition,
        parts: impl Into<Vec<Definition>>,
    ) -> IselResult<()> {
        if self.parts.contains_key(&wide) {
            return Err(IselError::DuplicateDecomposition {
                register: definitions.name(wide).to_string(),
            });
        }
        let parts = parts.into();
        for &part in &parts {
            self.owners.insert(part, wide);
        }
        self.parts.insert(wide, parts);
        Ok(())
    }

    /// Parts of a wide register, most-significant first
    pub fn decompose(&self, wide: Definition) -> Option<&[Definition]> {
        self.parts.get(&wide).map(Vec::as_slice)
    }

    /// Wide register a part belongs to
    pub fn composite_of(&self, part: Definition) -> Option<Definition> {
        self.owners.get(&part).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Definition, &[Definition])> {
        self.parts.iter().map(|(&wide, parts)| (wide, parts.as_slice()))
    }
}

/// Register values with composite registers stored as their parts
pub struct RegisterFile<'p> {
    definitions: &'p Definitions,
    composites: &'p CompositeRegisters,
    values: HashMap<Definition, u64>,
}

impl<'p> RegisterFile<'p> {
    pub fn new(definitions: &'p Definitions, composites: &'p CompositeRegisters) -> Self {
        Self {
            definitions,
            composites,
            values: HashMap::new(),
        }
    }

    fn bits(&self, register: Definition) -> u32 {
        self.definitions
            .register_type(register)
            .map_or(0, |ty| ty.bits())
    }

    fn mask(bits: u32) -> u64 {
        if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
    }

    /// Store a value, splitting it across the parts of a composite register
    pub fn write(&mut self, register: Definition, value: u64) {
        match self.composites.decompose(register) {
            Some(parts) => {
                let mut rest = value;
                for &part in parts.iter().rev() {
                    let bits = self.bits(part);
                    self.values.insert(part, rest & Self::mask(bits));
                    rest = rest.checked_shr(bits).unwrap_or(0);
                }
            }
            None => {
                let masked = value & Self::mask(self.bits(register));
                self.values.insert(register, masked);
            }
        }
    }

    /// Current value, recombining composite registers from their parts.
    /// Unwritten registers read as zero.
    pub fn read(&self, register: Definition) -> u64 {
        match self.composites.decompose(register) {
            Some(parts) => parts.iter().fold(0, |acc, &part| {
                let bits = self.bits(part);
                acc.checked_shl(bits).unwrap_or(0) | self.read(part)
            }),
            None => self.values.get(&register).copied().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;

    fn setup() -> (Definitions, CompositeRegisters, [Definition; 4]) {
        let mut defs = Definitions::new();
        let a = defs.add_register("a", ValueType::u8());
        let y = defs.add_register("y", ValueType::u8());
        let ya = defs.add_register("ya", ValueType::u16());
        let x = defs.add_register("x", ValueType::u8());
        let mut composites = CompositeRegisters::new();
        composites.register_decomposition(&defs, ya, [y, a]).unwrap();
        (defs, composites, [a, y, ya, x])
    }

    #[test]
    fn test_lookup() {
        let (_, composites, [a, y, ya, x]) = setup();
        assert_eq!(composites.decompose(ya), Some(&[y, a][..]));
        assert_eq!(composites.composite_of(a), Some(ya));
        assert_eq!(composites.composite_of(x), None);
        assert_eq!(composites.decompose(x), None);
    }

    #[test]
    fn test_duplicate_decomposition() {
        let (defs, mut composites, [a, y, ya, _]) = setup();
        let err = composites.register_decomposition(&defs, ya, [a, y]).unwrap_err();
        assert_eq!(err, IselError::DuplicateDecomposition { register: "ya".to_string() });
    }

    #[test]
    fn test_write_wide_read_parts() {
        let (defs, composites, [a, y, ya, _]) = setup();
        let mut file = RegisterFile::new(&defs, &composites);
        file.write(ya, 0xBEEF);
        assert_eq!(file.read(y), 0xBE);
        assert_eq!(file.read(a), 0xEF);
        assert_eq!(file.read(ya), 0xBEEF);
    }

    #[test]
    fn test_write_parts_read_wide() {
        let (defs, composites, [a, y, ya, x]) = setup();
        let mut file = RegisterFile::new(&defs, &composites);
        file.write(y, 0x12);
        file.write(a, 0x34);
        file.write(x, 0x56);
        assert_eq!(file.read(ya), 0x1234);
        assert_eq!(file.read(x), 0x56);
    }

    #[test]
    fn test_write_truncates_to_width() {
        let (defs, composites, [a, _, ya, _]) = setup();
        let mut file = RegisterFile::new(&defs, &composites);
        file.write(a, 0x1FF);
        assert_eq!(file.read(a), 0xFF);
        file.write(ya, 0x12345);
        assert_eq!(file.read(ya), 0x2345);
    }
}

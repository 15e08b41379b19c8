//! Value types as seen by the backend

/// Type of a value held in a register or compared by a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Fixed-width integer
    Int { bits: u8, signed: bool },
    /// Single-bit truth value (flags)
    Bool,
}

impl ValueType {
    pub fn u8() -> Self {
        Self::Int { bits: 8, signed: false }
    }

    pub fn i8() -> Self {
        Self::Int { bits: 8, signed: true }
    }

    pub fn u16() -> Self {
        Self::Int { bits: 16, signed: false }
    }

    pub fn i16() -> Self {
        Self::Int { bits: 16, signed: true }
    }

    /// Far pointer sized integer
    pub fn u24() -> Self {
        Self::Int { bits: 24, signed: false }
    }

    pub fn bool() -> Self {
        Self::Bool
    }

    /// Storage size in bytes
    pub fn size(&self) -> usize {
        match self {
            Self::Int { bits, .. } => usize::from(*bits).div_ceil(8),
            Self::Bool => 1,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Self::Int { bits, .. } => u32::from(*bits),
            Self::Bool => 1,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int { .. })
    }

    /// Smallest representable value, `None` for non-integer types
    pub fn min_value(&self) -> Option<i128> {
        match *self {
            Self::Int { bits: 0, .. } => Some(0),
            Self::Int { bits, signed: true } => Some(-(1i128 << (bits - 1))),
            Self::Int { signed: false, .. } => Some(0),
            Self::Bool => None,
        }
    }

    /// Largest representable value, `None` for non-integer types
    pub fn max_value(&self) -> Option<i128> {
        match *self {
            Self::Int { bits: 0, .. } => Some(0),
            Self::Int { bits, signed: true } => Some((1i128 << (bits - 1)) - 1),
            Self::Int { bits, signed: false } => Some((1i128 << bits) - 1),
            Self::Bool => None,
        }
    }

    /// True when the minimum representable value is negative
    pub fn is_signed(&self) -> bool {
        self.min_value().is_some_and(|min| min < 0)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int { bits, signed: true } => write!(f, "i{}", bits),
            Self::Int { bits, signed: false } => write!(f, "u{}", bits),
            Self::Bool => write!(f, "bool"),
        }
    }
}

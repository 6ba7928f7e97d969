//! Binary op-codes

use std::fmt;

/// The six binary primitive op-codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    /// Layer with a 4-byte float height
    LayerLong,
    /// Layer with a 2-byte integer height
    LayerShort,
    /// Polyline with 2-byte fields and integer coordinates
    PolylineShort,
    /// Polyline with 4-byte fields and float coordinates
    PolylineLong,
    /// Hatches with 2-byte fields and integer coordinates
    HatchesShort,
    /// Hatches with 4-byte fields and float coordinates
    HatchesLong,
}

impl OpCode {
    /// Wire value
    pub fn code(self) -> u16 {
        match self {
            Self::LayerLong => 127,
            Self::LayerShort => 128,
            Self::PolylineShort => 129,
            Self::PolylineLong => 130,
            Self::HatchesShort => 131,
            Self::HatchesLong => 132,
        }
    }

    /// Decode a wire value
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            127 => Some(Self::LayerLong),
            128 => Some(Self::LayerShort),
            129 => Some(Self::PolylineShort),
            130 => Some(Self::PolylineLong),
            131 => Some(Self::HatchesShort),
            132 => Some(Self::HatchesLong),
            _ => None,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_contiguous() {
        for code in 127..=132 {
            assert_eq!(OpCode::from_code(code).map(OpCode::code), Some(code));
        }
        assert_eq!(OpCode::from_code(126), None);
        assert_eq!(OpCode::from_code(133), None);
    }
}

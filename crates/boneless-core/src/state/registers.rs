/// Number of registers in one window.
pub const WINDOW_REGISTER_COUNT: usize = 16;
/// `Flags::bits` position of the zero flag.
pub const FLAGS_Z: u16 = 1 << 0;
/// `Flags::bits` position of the sign flag.
pub const FLAGS_S: u16 = 1 << 1;
/// `Flags::bits` position of the carry/borrow flag.
pub const FLAGS_C: u16 = 1 << 2;
/// `Flags::bits` position of the signed overflow flag.
pub const FLAGS_V: u16 = 1 << 3;

/// Register index within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl Register {
    /// Every register of a window in index order.
    pub const ALL: [Self; WINDOW_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
        Self::R15,
    ];

    /// Returns the offset of this register from the window base (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a 3-bit instruction register field; only `R0..R7` are reachable.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Self {
        Self::ALL[(bits & 0x7) as usize]
    }
}

/// Condition flags updated by A-class instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct Flags {
    /// Result was zero.
    pub zero: bool,
    /// Bit 15 of the result.
    pub sign: bool,
    /// Unsigned carry out of ADD, or borrow for SUB/CMP.
    pub carry: bool,
    /// Signed two's-complement overflow.
    pub overflow: bool,
}

impl Flags {
    /// Packs the flags as `V C S Z` in bits 3..0.
    #[must_use]
    pub const fn bits(self) -> u16 {
        let mut bits = 0;
        if self.zero {
            bits |= FLAGS_Z;
        }
        if self.sign {
            bits |= FLAGS_S;
        }
        if self.carry {
            bits |= FLAGS_C;
        }
        if self.overflow {
            bits |= FLAGS_V;
        }
        bits
    }

    /// Unpacks flags from `bits`; bits above 3 are ignored.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            zero: bits & FLAGS_Z != 0,
            sign: bits & FLAGS_S != 0,
            carry: bits & FLAGS_C != 0,
            overflow: bits & FLAGS_V != 0,
        }
    }
}

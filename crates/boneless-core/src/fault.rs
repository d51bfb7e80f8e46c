use thiserror::Error;

/// Fault classes used for grouping step failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder rejected an instruction word.
    Decode,
    /// Fetch, window or load touched memory outside the backing store.
    Memory,
}

/// Stable fault taxonomy reported by stepping and memory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Opcode class field has no decoder.
    #[error("unimplemented instruction class")]
    UnimplementedInstruction = 0x01,
    /// Opcode class is known but the sub-field combination is undefined.
    #[error("invalid instruction encoding")]
    InvalidEncoding = 0x02,
    /// Access fell outside the simulated memory.
    #[error("memory access out of bounds")]
    OutOfBounds = 0x03,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnimplementedInstruction),
            0x02 => Some(Self::InvalidEncoding),
            0x03 => Some(Self::OutOfBounds),
            _ => None,
        }
    }

    /// Returns the class this fault code belongs to.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnimplementedInstruction | Self::InvalidEncoding => FaultClass::Decode,
            Self::OutOfBounds => FaultClass::Memory,
        }
    }
}

/// A failed [`crate::Simulator::step`], with the location that faulted.
///
/// State is left exactly as it was before the step, including `pc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("{code} at pc {pc:#06x}{}", opcode_suffix(.opcode))]
pub struct StepError {
    /// Fault kind.
    pub code: FaultCode,
    /// Program counter of the faulting fetch.
    pub pc: u16,
    /// Fetched opcode, absent when the fetch itself was out of bounds.
    pub opcode: Option<u16>,
}

#[allow(clippy::ref_option)]
fn opcode_suffix(opcode: &Option<u16>) -> String {
    opcode.map_or_else(String::new, |word| format!(" (opcode {word:#06x})"))
}

/// Rejected [`crate::SimConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Memory cannot hold a single register window.
    #[error("memory size {size} is smaller than one register window ({min} cells)")]
    MemoryTooSmall {
        /// Requested size in cells.
        size: usize,
        /// Minimum accepted size.
        min: usize,
    },
    /// Memory exceeds the 16-bit address space.
    #[error("memory size {size} exceeds the 16-bit address space ({max} cells)")]
    MemoryTooLarge {
        /// Requested size in cells.
        size: usize,
        /// Maximum accepted size.
        max: usize,
    },
    /// Start PC does not address a memory cell.
    #[error("start pc {start_pc:#06x} is outside memory of {size} cells")]
    StartPcOutOfRange {
        /// Requested start PC.
        start_pc: u16,
        /// Memory size in cells.
        size: usize,
    },
}

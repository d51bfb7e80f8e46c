//! Flag update behaviours for the instruction classes.

use crate::state::Flags;

/// Describes how flags change when an instruction commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// Flags are untouched (I-class).
    #[default]
    None,
    /// Only Z and S are written; C and V keep their previous values (logic group).
    ZeroSign {
        /// Zero flag.
        zero: bool,
        /// Sign flag.
        sign: bool,
    },
    /// All four flags are written (arithmetic group).
    All(Flags),
}

impl FlagsUpdate {
    /// Applies this update on top of `current`.
    #[must_use]
    pub const fn apply(self, current: Flags) -> Flags {
        match self {
            Self::None => current,
            Self::ZeroSign { zero, sign } => Flags {
                zero,
                sign,
                ..current
            },
            Self::All(flags) => flags,
        }
    }
}

/// Returns bit 15 of `raw`, read in two's complement for negative values.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn sign_bit(raw: i32) -> bool {
    (raw as u32) & 0x8000 != 0
}

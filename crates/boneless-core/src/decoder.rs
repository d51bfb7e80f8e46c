//! Instruction decoder for the Boneless ISA.
//!
//! Decoding is pure: it classifies a 16-bit word and extracts its fields, or
//! reports why the word cannot be executed. Nothing here touches machine state.

use crate::encoding::{class_field, classify_alu, classify_imm, AluOp, ImmOp, OpcodeClass};
use crate::fault::FaultCode;
use crate::state::Register;

/// Fully decoded instruction ready for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// A-class register-register operation.
    Alu {
        /// Operation selected by `code`/`typ`.
        op: AluOp,
        /// Destination register (bits 10..8).
        dst: Register,
        /// First operand register (bits 7..5).
        opa: Register,
        /// Second operand register (bits 4..2).
        opb: Register,
    },
    /// I-class immediate byte load.
    Imm {
        /// Operation selected by `opc`.
        op: ImmOp,
        /// Source and destination register (bits 10..8).
        srcdst: Register,
        /// 8-bit immediate (bits 7..0).
        imm: u8,
    },
}

impl Instruction {
    /// Re-encodes this instruction to its 16-bit word.
    #[must_use]
    pub const fn encode(self) -> u16 {
        match self {
            Self::Alu { op, dst, opa, opb } => {
                crate::encoding::encode_alu(op, dst as u8, opa as u8, opb as u8)
            }
            Self::Imm { op, srcdst, imm } => crate::encoding::encode_imm(op, srcdst as u8, imm),
        }
    }
}

/// Instruction decoder for the Boneless ISA.
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit instruction word.
    ///
    /// # Errors
    ///
    /// - [`FaultCode::UnimplementedInstruction`] when the class field has no decoder.
    /// - [`FaultCode::InvalidEncoding`] for `typ = 3` in A-class or an unassigned
    ///   `opc` in I-class.
    pub fn decode(word: u16) -> Result<Instruction, FaultCode> {
        let class =
            OpcodeClass::from_u5(class_field(word)).ok_or(FaultCode::UnimplementedInstruction)?;

        match class {
            OpcodeClass::Alu => Self::decode_alu(word),
            OpcodeClass::Immediate => Self::decode_imm(word),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn decode_alu(word: u16) -> Result<Instruction, FaultCode> {
        let code = ((word >> 11) & 0x1) as u8;
        let typ = (word & 0x3) as u8;
        let op = classify_alu(code, typ).ok_or(FaultCode::InvalidEncoding)?;

        Ok(Instruction::Alu {
            op,
            dst: Register::from_u3(((word >> 8) & 0x7) as u8),
            opa: Register::from_u3(((word >> 5) & 0x7) as u8),
            opb: Register::from_u3(((word >> 2) & 0x7) as u8),
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn decode_imm(word: u16) -> Result<Instruction, FaultCode> {
        let opc = ((word >> 11) & 0x7) as u8;
        let op = classify_imm(opc).ok_or(FaultCode::InvalidEncoding)?;

        Ok(Instruction::Imm {
            op,
            srcdst: Register::from_u3(((word >> 8) & 0x7) as u8),
            imm: (word & 0xFF) as u8,
        })
    }
}

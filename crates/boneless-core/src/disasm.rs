//! Instruction disassembly for the Boneless ISA.
//!
//! Renders decodable words as `MNEMONIC operands` and everything else as a
//! `.word` directive, so a listing never stops at an unknown class.

use std::fmt;

use crate::decoder::{Decoder, Instruction};
use crate::encoding::{AluOp, ImmOp};
use crate::state::Register;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address of this word.
    pub addr: u16,
    /// Raw instruction word.
    pub raw_word: u16,
    /// Mnemonic (e.g. `ADD`, `MOVH`, `.word`).
    pub mnemonic: String,
    /// Formatted operands (e.g. `R0, R1, R2` or `R2, 0xAB`).
    pub operands: String,
    /// Whether the word failed to decode.
    pub is_illegal: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            f.write_str(&self.mnemonic)
        } else {
            write!(f, "{} {}", self.mnemonic, self.operands)
        }
    }
}

/// Disassembles one instruction word, reporting `addr` as its location.
#[must_use]
pub fn disassemble_at(addr: u16, word: u16) -> DisassemblyRow {
    match Decoder::decode(word) {
        Ok(instr) => DisassemblyRow {
            addr,
            raw_word: word,
            mnemonic: format_mnemonic(&instr).to_string(),
            operands: format_operands(&instr),
            is_illegal: false,
        },
        Err(fault) => DisassemblyRow {
            addr,
            raw_word: word,
            mnemonic: ".word".to_string(),
            operands: format!("0x{word:04X} ; {fault}"),
            is_illegal: true,
        },
    }
}

/// Disassembles one instruction word without a location.
#[must_use]
pub fn disassemble(word: u16) -> DisassemblyRow {
    disassemble_at(0, word)
}

/// Disassembles `before` words ahead of `center` through `after` words past it.
///
/// Rows outside `memory` are omitted.
#[must_use]
pub fn disassemble_window(
    center: u16,
    before: usize,
    after: usize,
    memory: &[u16],
) -> Vec<DisassemblyRow> {
    let center = usize::from(center);
    let start = center.saturating_sub(before);
    let end = center.saturating_add(after).saturating_add(1).min(memory.len());

    (start..end)
        .filter_map(|addr| {
            let addr16 = u16::try_from(addr).ok()?;
            Some(disassemble_at(addr16, memory[addr]))
        })
        .collect()
}

const fn format_mnemonic(instr: &Instruction) -> &'static str {
    match instr {
        Instruction::Alu { op, .. } => match op {
            AluOp::And => "AND",
            AluOp::Or => "OR",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Cmp => "CMP",
        },
        Instruction::Imm { op, .. } => match op {
            ImmOp::Movl => "MOVL",
            ImmOp::Movh => "MOVH",
        },
    }
}

fn format_operands(instr: &Instruction) -> String {
    match *instr {
        Instruction::Alu {
            op: AluOp::Cmp,
            opa,
            opb,
            ..
        } => format!("{}, {}", format_register(opa), format_register(opb)),
        Instruction::Alu { dst, opa, opb, .. } => format!(
            "{}, {}, {}",
            format_register(dst),
            format_register(opa),
            format_register(opb)
        ),
        Instruction::Imm { srcdst, imm, .. } => {
            format!("{}, 0x{imm:02X}", format_register(srcdst))
        }
    }
}

fn format_register(reg: Register) -> String {
    format!("R{}", reg.index())
}

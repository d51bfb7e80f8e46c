//! Instruction execution for the Boneless ISA.
//!
//! A step runs in three phases:
//! 1. Fetch `mem[pc]` and decode it
//! 2. Compute the destination write and flag update without touching state
//! 3. Commit both through the internal write path and advance `pc` by one
//!
//! Faults surface before phase 3, so a faulting step has no side effects.

mod flags;

pub use flags::{sign_bit, FlagsUpdate};

use crate::decoder::{Decoder, Instruction};
use crate::encoding::{AluOp, ImmOp};
use crate::fault::{FaultCode, StepError};
use crate::state::{Flags, Register};
use crate::Simulator;

/// Side effects computed for one instruction, applied by [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Register write, if the instruction produces one.
    pub dest: Option<(Register, u16)>,
    /// Flag update to apply.
    pub flags_update: FlagsUpdate,
}

/// Record of one retired instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Retired {
    /// Address the instruction was fetched from.
    pub pc: u16,
    /// Raw instruction word.
    pub opcode: u16,
    /// Decoded form of `opcode`.
    pub instruction: Instruction,
}

/// Computes the effects of `instr` against current register values.
#[must_use]
pub fn execute_instruction(instr: &Instruction, sim: &Simulator) -> ExecuteState {
    match *instr {
        Instruction::Alu { op, dst, opa, opb } => {
            execute_alu(op, dst, sim.read_register(opa), sim.read_register(opb))
        }
        Instruction::Imm { op, srcdst, imm } => {
            execute_imm(op, srcdst, sim.read_register(srcdst), imm)
        }
    }
}

/// Applies computed effects through the handler write path.
///
/// This path ignores the run scope.
pub fn commit_execution(sim: &mut Simulator, exec: &ExecuteState) {
    if let Some((reg, value)) = exec.dest {
        sim.write_register_internal(reg, value);
    }
    sim.flags = exec.flags_update.apply(sim.flags);
}

/// Fetches, decodes, executes and commits the instruction at `pc`.
///
/// # Errors
///
/// Returns a [`StepError`] carrying the fault kind, the faulting `pc` and the
/// opcode when it could be fetched. An instruction at `0xFFFF` faults with
/// [`FaultCode::OutOfBounds`] since `pc` cannot advance past the address
/// space. State is unchanged on error.
pub fn step_one(sim: &mut Simulator) -> Result<Retired, StepError> {
    let pc = sim.pc;
    let opcode = sim.memory.read(usize::from(pc)).map_err(|code| StepError {
        code,
        pc,
        opcode: None,
    })?;

    let instruction = Decoder::decode(opcode).map_err(|code| StepError {
        code,
        pc,
        opcode: Some(opcode),
    })?;

    let next_pc = pc.checked_add(1).ok_or(StepError {
        code: FaultCode::OutOfBounds,
        pc,
        opcode: Some(opcode),
    })?;

    let exec = execute_instruction(&instruction, sim);
    commit_execution(sim, &exec);
    sim.pc = next_pc;

    tracing::trace!(
        pc = format_args!("{pc:#06x}"),
        opcode = format_args!("{opcode:#06x}"),
        instr = %crate::disasm::disassemble(opcode),
        flags = format_args!("{:#03x}", sim.flags.bits()),
        "retired"
    );

    Ok(Retired {
        pc,
        opcode,
        instruction,
    })
}

#[allow(clippy::similar_names)]
fn execute_alu(op: AluOp, dst: Register, val_a: u16, val_b: u16) -> ExecuteState {
    let a = i32::from(val_a);
    let b = i32::from(val_b);
    let s_a = sign_bit(a);
    let s_b = sign_bit(b);

    let (raw, carry_overflow) = match op {
        AluOp::And => (a & b, None),
        AluOp::Or => (a | b, None),
        AluOp::Xor => (a ^ b, None),
        AluOp::Add => {
            let raw = a + b;
            let s_r = sign_bit(raw);
            let carry = raw > 0xFFFF;
            let overflow = (s_a && s_b && !s_r) || (!s_a && !s_b && s_r);
            (raw, Some((carry, overflow)))
        }
        AluOp::Sub | AluOp::Cmp => {
            let raw = a - b;
            let s_r = sign_bit(raw);
            let carry = val_a < val_b;
            let overflow = (s_a && !s_b && !s_r) || (!s_a && s_b && s_r);
            (raw, Some((carry, overflow)))
        }
    };

    let zero = raw == 0;
    let sign = sign_bit(raw);

    let flags_update = match carry_overflow {
        Some((carry, overflow)) => FlagsUpdate::All(Flags {
            zero,
            sign,
            carry,
            overflow,
        }),
        None => FlagsUpdate::ZeroSign { zero, sign },
    };

    let dest = match op {
        AluOp::Cmp => None,
        _ => Some((dst, wrap_to_u16(raw))),
    };

    ExecuteState { dest, flags_update }
}

fn execute_imm(op: ImmOp, srcdst: Register, current: u16, imm: u8) -> ExecuteState {
    let value = match op {
        ImmOp::Movl => (current & 0xFF00) | u16::from(imm),
        ImmOp::Movh => (current & 0x00FF) | (u16::from(imm) << 8),
    };

    ExecuteState {
        dest: Some((srcdst, value)),
        flags_update: FlagsUpdate::None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn wrap_to_u16(raw: i32) -> u16 {
    raw.rem_euclid(0x1_0000) as u16
}

//! Instruction-level simulator core for the Boneless 16-bit CPU.

/// Word-addressed memory backing data and the register window.
pub mod memory;
pub use memory::{words_from_be_bytes, Memory, DEFAULT_MEMORY_CELLS, MAX_MEMORY_CELLS};

/// Public host-facing API: configuration, simulator state and run scope.
pub mod api;
pub use api::{
    BoxedIoHook, IoHook, RunOutcome, RunScope, RunStop, SimConfig, Simulator, DEFAULT_START_PC,
};

/// Architectural state primitives.
pub mod state;
pub use state::{
    Flags, Register, RunState, WriteOutcome, FLAGS_C, FLAGS_S, FLAGS_V, FLAGS_Z,
    WINDOW_REGISTER_COUNT,
};

/// Opcode class and sub-operation tables.
pub mod encoding;
pub use encoding::{
    class_field, classify_alu, classify_imm, encode_alu, encode_imm, AluOp, ImmOp, OpcodeClass,
    ALU_ENCODING_TABLE, IMM_ENCODING_TABLE,
};

/// Instruction decoder with field extraction.
pub mod decoder;
pub use decoder::{Decoder, Instruction};

/// Fault taxonomy for decode, memory and configuration failures.
pub mod fault;
pub use fault::{ConfigError, FaultClass, FaultCode, StepError};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, step_one, ExecuteState, FlagsUpdate, Retired,
};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble, disassemble_at, disassemble_window, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tracing_subscriber as _;

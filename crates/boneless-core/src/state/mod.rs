//! Architectural state primitives: register indices, flags and run-scope state.

/// Register window indices and condition flags.
pub mod registers;
/// Run-scope state and external mutation outcomes.
pub mod run_state;

pub use registers::{
    Flags, Register, FLAGS_C, FLAGS_S, FLAGS_V, FLAGS_Z, WINDOW_REGISTER_COUNT,
};
pub use run_state::{RunState, WriteOutcome};

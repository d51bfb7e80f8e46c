//! Deterministic run fingerprint used for cross-host comparison.
//!
//! Run with `RUST_LOG=boneless_core=trace` to see each retired instruction.

use boneless_core::{
    encode_alu, encode_imm, AluOp, ImmOp, RunStop, SimConfig, Simulator, DEFAULT_START_PC,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber::EnvFilter;

/// Sums 0x7FFF and 0x0001, compares, then XORs; ends on an unimplemented word.
const PROGRAM: [u16; 9] = [
    encode_imm(ImmOp::Movl, 1, 0xFF),
    encode_imm(ImmOp::Movh, 1, 0x7F),
    encode_imm(ImmOp::Movl, 2, 0x01),
    encode_alu(AluOp::Add, 0, 1, 2),
    encode_alu(AluOp::Cmp, 0, 0, 1),
    encode_alu(AluOp::Sub, 3, 2, 1),
    encode_alu(AluOp::Xor, 4, 3, 0),
    encode_alu(AluOp::Or, 5, 4, 2),
    0x1000,
];

fn hash_words(hash: &mut u64, words: &[u16]) {
    for word in words {
        for byte in word.to_le_bytes() {
            *hash ^= u64::from(byte);
            *hash = hash.wrapping_mul(0x1000_0000_01B3);
        }
    }
}

fn fingerprint() -> String {
    let mut sim = Simulator::new(SimConfig::default()).expect("default config is valid");
    let loaded = sim
        .load_program(&PROGRAM, DEFAULT_START_PC)
        .expect("program fits in default memory");
    assert!(loaded.is_applied());

    let outcome = sim.run(64);

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_words(&mut hash, &[u16::try_from(outcome.steps).unwrap_or(u16::MAX)]);
    match outcome.stop {
        RunStop::StepLimit => hash_words(&mut hash, &[0x10]),
        RunStop::Fault(fault) => {
            hash_words(&mut hash, &[0x11, u16::from(fault.code.as_u8()), fault.pc]);
        }
    }
    hash_words(&mut hash, &[sim.pc(), sim.window(), sim.flags().bits()]);
    hash_words(&mut hash, sim.memory());

    format!("{hash:016x}")
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    println!("{}", fingerprint());
}

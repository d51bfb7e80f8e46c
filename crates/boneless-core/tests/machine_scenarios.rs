//! Machine-level scenarios: window addressing, immediate loads, run scope
//! gating and fault reporting through the public API.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use boneless_core::{
    disassemble_window, encode_alu, encode_imm, AluOp, BoxedIoHook, FaultCode, Flags, ImmOp,
    Register, RunState, RunStop, SimConfig, Simulator, StepError, WriteOutcome,
    WINDOW_REGISTER_COUNT,
};
use proptest::prelude::*;
use rstest::{fixture, rstest};
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber::EnvFilter;

/// Highest window base that fits in default memory.
const LAST_WINDOW: u16 = 0x03F0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[fixture]
fn sim() -> Simulator {
    init_tracing();
    Simulator::new(SimConfig::default()).expect("default config is valid")
}

fn loaded(mut sim: Simulator, words: &[u16]) -> Simulator {
    let outcome = sim.load_program(words, sim.pc()).expect("program fits");
    assert_eq!(outcome, WriteOutcome::Applied);
    sim
}

#[rstest]
fn zero_word_on_zero_memory_is_and_r0(sim: Simulator) {
    let mut sim = loaded(sim, &[0x0000]);

    let retired = sim.step().expect("0x0000 decodes as AND");

    assert_eq!(retired.pc, 0x10);
    assert_eq!(sim.read_register(Register::R0), 0);
    assert_eq!(
        sim.flags(),
        Flags {
            zero: true,
            ..Flags::default()
        }
    );
    assert_eq!(sim.pc(), 0x11);
}

#[rstest]
fn add_max_positive_plus_one(sim: Simulator) {
    let mut sim = loaded(sim, &[encode_alu(AluOp::Add, 0, 1, 2)]);
    assert!(sim.write_register(Register::R1, 0x7FFF).is_applied());
    assert!(sim.write_register(Register::R2, 0x0001).is_applied());

    sim.step().expect("ADD decodes");

    assert_eq!(sim.read_register(Register::R0), 0x8000);
    assert_eq!(
        sim.flags(),
        Flags {
            zero: false,
            sign: true,
            carry: false,
            overflow: true,
        }
    );
}

#[rstest]
fn movh_fills_high_byte(sim: Simulator) {
    let word = encode_imm(ImmOp::Movh, 2, 0xAB);
    assert_eq!(word, 0x4AAB);
    let mut sim = loaded(sim, &[word]);
    assert!(sim.write_register(Register::R2, 0x00CD).is_applied());

    sim.step().expect("MOVH decodes");

    assert_eq!(sim.read_register(Register::R2), 0xABCD);
}

#[rstest]
#[case::class_0x02(0x1000, FaultCode::UnimplementedInstruction)]
#[case::class_0x07(0x3FFF, FaultCode::UnimplementedInstruction)]
#[case::class_0x10(0x8000, FaultCode::UnimplementedInstruction)]
#[case::class_0x1f(0xF800, FaultCode::UnimplementedInstruction)]
#[case::alu_typ_3(0x0003, FaultCode::InvalidEncoding)]
#[case::alu_arith_typ_3(0x0FFF, FaultCode::InvalidEncoding)]
#[case::imm_opc_2(0x5000, FaultCode::InvalidEncoding)]
#[case::imm_opc_7(0x7FFF, FaultCode::InvalidEncoding)]
fn faulting_words_leave_state_untouched(
    sim: Simulator,
    #[case] word: u16,
    #[case] expected: FaultCode,
) {
    let mut sim = loaded(sim, &[word]);
    assert!(sim.write_register(Register::R3, 0x1357).is_applied());
    let memory_before = sim.memory().to_vec();

    let err = sim.step().expect_err("word must fault");

    assert_eq!(
        err,
        StepError {
            code: expected,
            pc: 0x10,
            opcode: Some(word),
        }
    );
    assert_eq!(sim.pc(), 0x10);
    assert_eq!(sim.flags(), Flags::default());
    assert_eq!(sim.memory(), memory_before.as_slice());
}

#[rstest]
fn step_error_display_names_fault_and_location(sim: Simulator) {
    let mut sim = loaded(sim, &[0x1000]);

    let err = sim.step().expect_err("class 0x02 is unimplemented");

    let text = err.to_string();
    assert!(text.contains("unimplemented instruction class"), "{text}");
    assert!(text.contains("0x0010"), "{text}");
}

#[rstest]
fn external_mutators_are_refused_inside_run_scope(sim: Simulator) {
    let mut sim = loaded(sim, &[encode_imm(ImmOp::Movl, 5, 0x42)]);
    assert!(sim.write_register(Register::R4, 0x0101).is_applied());
    let memory_before = sim.memory().to_vec();

    {
        let mut scope = sim.enter_run_scope();
        assert!(scope.is_active());

        assert_eq!(
            scope.write_register(Register::R4, 0xFFFF),
            WriteOutcome::Refused
        );
        assert_eq!(scope.set_pc(0x0200), WriteOutcome::Refused);
        assert_eq!(scope.set_window(0x20), Ok(WriteOutcome::Refused));
        assert_eq!(
            scope.load_program(&[0xDEAD, 0xBEEF], 0x40),
            Ok(WriteOutcome::Refused)
        );
        assert_eq!(
            scope.load_program_bytes(&[0x12, 0x34], 0x40),
            Ok(WriteOutcome::Refused)
        );
        assert_eq!(scope.rebind_io_hook(None), WriteOutcome::Refused);

        assert_eq!(scope.memory(), memory_before.as_slice());
        assert_eq!(scope.pc(), 0x10);
        assert_eq!(scope.window(), 0);

        scope.step().expect("MOVL decodes");
        assert_eq!(scope.read_register(Register::R5), 0x0042);
    }

    assert_eq!(sim.run_state(), RunState::Idle);
    assert!(sim.write_register(Register::R4, 0xFFFF).is_applied());
    assert_eq!(sim.read_register(Register::R4), 0xFFFF);
}

#[rstest]
fn run_scope_is_released_when_the_holder_panics(sim: Simulator) {
    let mut sim = sim;
    assert_eq!(sim.run_state(), RunState::Idle);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _scope = sim.enter_run_scope();
        panic!("host loop aborted");
    }));

    assert!(result.is_err());
    assert!(!sim.is_active());
    assert!(sim.set_pc(0x20).is_applied());
}

#[rstest]
fn run_releases_scope_after_fault(sim: Simulator) {
    let mut sim = loaded(
        sim,
        &[
            encode_imm(ImmOp::Movl, 1, 0x03),
            encode_imm(ImmOp::Movl, 2, 0x04),
            encode_alu(AluOp::Add, 0, 1, 2),
            0x1000,
        ],
    );

    let outcome = sim.run(100);

    assert_eq!(outcome.steps, 3);
    assert_eq!(
        outcome.stop,
        RunStop::Fault(StepError {
            code: FaultCode::UnimplementedInstruction,
            pc: 0x13,
            opcode: Some(0x1000),
        })
    );
    assert_eq!(sim.read_register(Register::R0), 0x0007);
    assert_eq!(sim.pc(), 0x13);
    assert!(!sim.is_active());
}

#[test]
fn run_stops_at_the_top_of_the_address_space() {
    init_tracing();
    let mut sim = Simulator::new(SimConfig {
        start_pc: 0xFFFE,
        memory_size: 0x1_0000,
    })
    .expect("full address space is a valid config");
    let last = encode_imm(ImmOp::Movl, 1, 0x22);
    assert!(sim
        .load_program(&[encode_imm(ImmOp::Movl, 0, 0x11), last], 0xFFFE)
        .expect("top two cells are in range")
        .is_applied());

    let outcome = sim.run(8);

    assert_eq!(outcome.steps, 1);
    assert_eq!(
        outcome.stop,
        RunStop::Fault(StepError {
            code: FaultCode::OutOfBounds,
            pc: 0xFFFF,
            opcode: Some(last),
        })
    );
    assert_eq!(sim.pc(), 0xFFFF);
    assert_eq!(sim.read_register(Register::R0), 0x0011);
    assert_eq!(sim.read_register(Register::R1), 0x0000);
}

#[rstest]
fn windowed_program_runs_against_moved_registers(sim: Simulator) {
    let mut sim = loaded(
        sim,
        &[
            encode_imm(ImmOp::Movl, 0, 0x11),
            encode_imm(ImmOp::Movh, 0, 0x22),
        ],
    );
    assert_eq!(sim.set_window(0x100), Ok(WriteOutcome::Applied));

    let outcome = sim.run(2);

    assert_eq!(outcome.stop, RunStop::StepLimit);
    assert_eq!(sim.read_memory(0x100), Ok(0x2211));
    assert_eq!(sim.read_memory(0x0000), Ok(0x0000));
}

#[rstest]
fn byte_programs_load_big_endian(sim: Simulator) {
    let mut sim = sim;
    let word = encode_imm(ImmOp::Movl, 6, 0x9C);
    let bytes = word.to_be_bytes();

    assert_eq!(
        sim.load_program_bytes(&bytes, 0x10),
        Ok(WriteOutcome::Applied)
    );
    sim.step().expect("MOVL decodes");

    assert_eq!(sim.read_register(Register::R6), 0x009C);
    assert_eq!(
        sim.load_program_bytes(&[0x00, 0x01, 0x02], 0x10),
        Err(FaultCode::InvalidEncoding)
    );
}

#[rstest]
fn io_hook_can_be_rebound_between_runs(sim: Simulator) {
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let mut sim = sim.with_io_hook(move |addr: u16, data: Option<u16>| {
        seen.fetch_add(1, Ordering::Relaxed);
        data.or(Some(addr))
    });

    assert_eq!(sim.io_access(0x0007, None), Some(0x0007));
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    let replacement: BoxedIoHook = Box::new(|_addr: u16, _data: Option<u16>| Some(0xAAAA));
    assert!(sim.rebind_io_hook(Some(replacement)).is_applied());
    assert_eq!(sim.io_access(0x0007, None), Some(0xAAAA));
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    assert!(sim.rebind_io_hook(None).is_applied());
    assert!(!sim.has_io_hook());
    assert_eq!(sim.io_access(0x0007, Some(1)), None);
}

#[rstest]
fn listing_around_pc_marks_the_fault(sim: Simulator) {
    let sim = loaded(
        sim,
        &[
            encode_imm(ImmOp::Movl, 1, 0x03),
            encode_alu(AluOp::Cmp, 0, 1, 2),
            0x1000,
        ],
    );

    let rows = disassemble_window(0x11, 1, 1, sim.memory());
    let text: Vec<String> = rows.iter().map(ToString::to_string).collect();

    assert_eq!(
        text,
        vec![
            "MOVL R1, 0x03".to_string(),
            "CMP R1, R2".to_string(),
            ".word 0x1000 ; unimplemented instruction class".to_string(),
        ]
    );
    assert!(rows[2].is_illegal);
}

proptest! {
    #[test]
    fn window_aliases_memory(
        window in 0_u16..=LAST_WINDOW,
        values in proptest::collection::vec(any::<u16>(), WINDOW_REGISTER_COUNT),
    ) {
        let mut sim = Simulator::new(SimConfig::default()).expect("default config");
        prop_assert!(sim.load_program(&values, window).expect("fits").is_applied());
        prop_assert_eq!(sim.set_window(window), Ok(WriteOutcome::Applied));

        for (offset, reg) in (0_u16..).zip(Register::ALL) {
            prop_assert_eq!(sim.read_register(reg), values[reg.index()]);
            prop_assert_eq!(sim.read_memory(window + offset), Ok(values[reg.index()]));
        }
        prop_assert_eq!(sim.regs(), values.as_slice());
    }

    #[test]
    fn window_past_end_is_rejected(window in (LAST_WINDOW + 1)..=u16::MAX) {
        let mut sim = Simulator::new(SimConfig::default()).expect("default config");
        prop_assert_eq!(sim.set_window(window), Err(FaultCode::OutOfBounds));
        prop_assert_eq!(sim.window(), 0);
    }

    #[test]
    fn immediate_loads_preserve_the_other_byte(
        initial in any::<u16>(),
        imm in any::<u8>(),
        reg in 0_u8..8,
        high in any::<bool>(),
    ) {
        let op = if high { ImmOp::Movh } else { ImmOp::Movl };
        let mut sim = Simulator::new(SimConfig::default()).expect("default config");
        prop_assert!(sim.load_program(&[encode_imm(op, reg, imm)], 0x10).expect("fits").is_applied());
        let target = Register::from_u3(reg);
        prop_assert!(sim.write_register(target, initial).is_applied());

        sim.step().expect("immediate load decodes");

        let value = sim.read_register(target);
        if high {
            prop_assert_eq!(value & 0x00FF, initial & 0x00FF);
            prop_assert_eq!(value >> 8, u16::from(imm));
        } else {
            prop_assert_eq!(value & 0xFF00, initial & 0xFF00);
            prop_assert_eq!(value & 0x00FF, u16::from(imm));
        }
        prop_assert_eq!(sim.flags(), Flags::default());
    }
}

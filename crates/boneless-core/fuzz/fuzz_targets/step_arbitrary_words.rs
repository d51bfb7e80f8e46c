#![no_main]

use boneless_core::{disassemble, Decoder, Register, SimConfig, Simulator};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let window = u16::from_be_bytes([data[0], data[1]]);
    let program = &data[2..data.len() & !1];

    let Ok(mut sim) = Simulator::new(SimConfig::default()) else {
        return;
    };
    let _ = sim.set_window(window);
    if sim.load_program_bytes(program, sim.pc()).is_err() {
        return;
    }

    for chunk in program.chunks_exact(2) {
        let word = u16::from_be_bytes([chunk[0], chunk[1]]);
        let _ = Decoder::decode(word);
        let _ = disassemble(word).to_string();
    }

    let pc_before = sim.pc();
    let window_before = sim.window();
    let outcome = sim.run(64);

    assert!(!sim.is_active());
    assert_eq!(sim.window(), window_before);
    assert_eq!(
        u32::from(sim.pc()),
        u32::from(pc_before) + outcome.steps,
        "every retired step advances pc by one"
    );
    for reg in Register::ALL {
        let _ = sim.read_register(reg);
    }
});

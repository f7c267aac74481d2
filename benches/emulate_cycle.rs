use criterion::{criterion_group, criterion_main, Criterion};
use dmg_core::{Emulator, EmulatorOptionsBuilder};

/// A self-contained ROM with a valid header and no external dependencies: the entry point
/// at 0x0100 jumps straight into a tight `JR -2` spin loop, so the benchmark measures raw
/// step throughput rather than any particular game's instruction mix.
fn spinning_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];

    // 0x0100: nop; jp 0x0150
    rom[0x0100] = 0x00;
    rom[0x0101] = 0xC3;
    rom[0x0102] = 0x50;
    rom[0x0103] = 0x01;

    // 0x0150: jr -2 (spin forever)
    rom[0x0150] = 0x18;
    rom[0x0151] = 0xFE;

    rom[0x0147] = 0x00; // ROM ONLY
    rom[0x0148] = 0x00; // 32KB
    rom[0x0149] = 0x00; // no RAM

    let checksum = rom[0x0134..=0x014C]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
    rom[0x014D] = checksum;

    rom
}

fn emulate_cycle_benchmark(c: &mut Criterion) {
    let mut emulator = Emulator::new(spinning_rom(), EmulatorOptionsBuilder::new().build())
        .expect("synthetic ROM should construct cleanly");

    c.bench_function("step", |b| b.iter(|| emulator.step()));
}

fn run_to_vblank_benchmark(c: &mut Criterion) {
    let mut emulator = Emulator::new(spinning_rom(), EmulatorOptionsBuilder::new().build())
        .expect("synthetic ROM should construct cleanly");

    c.bench_function("run_to_vblank", |b| b.iter(|| emulator.run_to_vblank()));
}

criterion_group!(benches, emulate_cycle_benchmark, run_to_vblank_benchmark);
criterion_main!(benches);

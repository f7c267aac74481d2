mod common;

use common::blank_rom;
use dmg_core::Emulator;

const TIMER_COUNTER: u16 = 0xFF05;
const TIMER_MODULO: u16 = 0xFF06;
const TIMER_CONTROL: u16 = 0xFF07;
const INTERRUPT_FLAG: u16 = 0xFF0F;

/// TAC=0x05 selects the 262144Hz input (falling edge of system-clock bit 3, a tick every 16
/// master cycles). The ROM is all zero (NOP, 4 cycles each) so every `step()` advances the
/// timer by exactly one machine cycle, letting the test land on exact cycle boundaries.
#[test]
fn tima_overflow_reloads_from_tma_one_machine_cycle_late_and_raises_the_timer_flag() {
    let mut emulator = Emulator::new(blank_rom(), Default::default()).unwrap();

    emulator.write_memory(TIMER_CONTROL, 0x05);
    emulator.write_memory(TIMER_MODULO, 0xFE);
    emulator.write_memory(TIMER_COUNTER, 0xFE);

    for _ in 0..4 {
        emulator.step();
    }
    assert_eq!(emulator.read_memory(TIMER_COUNTER), 0xFF, "first falling edge, 16 cycles in");

    for _ in 0..4 {
        emulator.step();
    }
    assert_eq!(
        emulator.read_memory(TIMER_COUNTER),
        0x00,
        "second falling edge overflows TIMA to 0 before the reload delay elapses"
    );

    emulator.step();
    assert_eq!(emulator.read_memory(TIMER_COUNTER), 0xFE, "TMA reloads one machine cycle after overflow");
    let (_, iflag) = emulator.interrupt_lines();
    assert_ne!(iflag & 0x04, 0, "timer interrupt flag should be set on reload");
}

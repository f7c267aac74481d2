mod common;

use common::emulator_with_program;

/// `LD SP,0xFFFE; XOR A; LDH (0x05),A; HALT` — by the time HALT retires, A and TIMA should
/// both be zero, SP should hold the freshly-loaded stack pointer, and the CPU should be
/// halted with PC still pointing at the HALT opcode itself.
#[test]
fn halt_leaves_cpu_parked_with_expected_register_state() {
    let program = [0x31, 0xFE, 0xFF, 0xAF, 0xE0, 0x05, 0x76, 0x00];
    let mut emulator = emulator_with_program(&program);

    for _ in 0..16 {
        if emulator.is_halted() {
            break;
        }
        emulator.step();
    }

    assert!(emulator.is_halted(), "CPU should have reached the HALT opcode");
    assert_eq!(emulator.registers().a, 0);
    assert_eq!(emulator.registers().sp, 0xFFFE);
    assert_eq!(emulator.read_memory(0xFF05), 0, "TIMA should have been cleared by LDH (0x05),A");
    // PC already advanced past the HALT opcode's own byte during fetch, the same as it
    // would for any other single-byte instruction; only further fetches are suppressed.
    assert_eq!(emulator.registers().pc, 0x0107);
}

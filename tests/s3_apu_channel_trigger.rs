mod common;

use common::emulator_with_program;

/// Power the APU off then back on, load channel 1 with a length of 1 (NR11=0x3F) and then
/// silence its DAC (NR12=0x00): the DAC-disable should immediately clear channel 1's status
/// bit in NR52, and the length counter itself should still read back the freshly-loaded
/// value of 1 since nothing has triggered or ticked it yet.
#[test]
fn dac_disable_clears_channel_status_while_length_load_is_preserved() {
    let program = [0x18, 0xFE]; // spin forever, nothing CPU-side is under test here
    let mut emulator = emulator_with_program(&program);

    emulator.write_memory(0xFF26, 0x00); // NR52: power off
    emulator.write_memory(0xFF26, 0x80); // NR52: power back on
    emulator.write_memory(0xFF11, 0x3F); // NR11: length load = 64 - 0x3F = 1
    emulator.write_memory(0xFF12, 0x00); // NR12: envelope volume 0, add mode 0 => DAC off

    let nr52 = emulator.read_memory(0xFF26);
    assert_eq!(nr52 & 0x01, 0, "channel 1 should read inactive once its DAC is disabled");
    assert_eq!(emulator.channel1_length_counter(), 1);
}

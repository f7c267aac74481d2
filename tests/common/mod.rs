use dmg_core::Emulator;

/// A 32KB ROM-only cartridge with a valid header checksum and nothing else; individual
/// scenarios patch in whatever code or data they need at 0x0100 before construction.
pub fn blank_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0147] = 0x00; // ROM ONLY
    rom[0x0148] = 0x00; // 32KB
    rom[0x0149] = 0x00; // no RAM
    fix_checksum(&mut rom);
    rom
}

pub fn fix_checksum(rom: &mut [u8]) {
    let checksum = rom[0x0134..=0x014C]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
    rom[0x014D] = checksum;
}

pub fn emulator_with_program(program: &[u8]) -> Emulator {
    let mut rom = blank_rom();
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    fix_checksum(&mut rom);
    Emulator::new(rom, Default::default()).expect("scenario ROM should construct cleanly")
}

mod common;

use common::blank_rom;
use dmg_core::Emulator;

const OAM_DMA_REGISTER: u16 = 0xFF46;

/// OAM DMA from 0xC000: each of the 160 source bytes in WRAM is its own index; after the
/// full 648-master-cycle transfer every OAM byte should read back the matching index, and
/// while the transfer is in flight a CPU read of an unrelated region (VRAM, since the DMA
/// source here is WRAM) should be blocked and return 0xFF.
#[test]
fn oam_dma_copies_source_bytes_and_blocks_unrelated_reads_while_active() {
    let mut emulator = Emulator::new(blank_rom(), Default::default()).unwrap();

    for i in 0u16..160 {
        emulator.write_memory(0xC000 + i, i as u8);
    }

    emulator.write_memory(OAM_DMA_REGISTER, 0xC0);

    assert_eq!(emulator.read_memory(0x8000), 0xFF, "VRAM is unrelated to a WRAM DMA source and should be blocked");

    for _ in 0..162 {
        emulator.step();
    }

    for i in 0u16..160 {
        assert_eq!(emulator.read_memory(0xFE00 + i), i as u8, "OAM byte {} should match its source index", i);
    }
}

//! Address decoder: the single point every CPU memory access, PPU/APU/timer register
//! access, and the OAM DMA engine goes through. Owns the cartridge, PPU, APU, timer,
//! joypad, work RAM, high RAM, and the IE/IF interrupt registers, and drives them all in
//! lockstep from [`Bus::advance`].

use std::fmt::Debug;

use crate::hardware::apu::Apu;
use crate::hardware::cartridge::Cartridge;
use crate::hardware::ppu::Ppu;
use crate::io::interrupts::InterruptFlags;
use crate::io::io_registers::IORegisters;
use crate::io::joypad::{InputKey, JoyPad, JOYPAD_REGISTER};
use crate::io::timer::{DIVIDER_REGISTER, TIMER_CONTROL, TIMER_COUNTER, TIMER_MODULO};

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

const ROM_END: u16 = 0x7FFF;
const VRAM_START: u16 = 0x8000;
const VRAM_END: u16 = 0x9FFF;
const EXTERNAL_RAM_START: u16 = 0xA000;
const EXTERNAL_RAM_END: u16 = 0xBFFF;
const WRAM_START: u16 = 0xC000;
const WRAM_END: u16 = 0xDFFF;
const ECHO_START: u16 = 0xE000;
const ECHO_END: u16 = 0xFDFF;
const OAM_START: u16 = 0xFE00;
const OAM_END: u16 = 0xFE9F;
const NOT_USABLE_START: u16 = 0xFEA0;
const NOT_USABLE_END: u16 = 0xFEFF;
const OAM_DMA_REGISTER: u16 = 0xFF46;
const APU_REG_START: u16 = crate::hardware::apu::APU_REG_START;
const WAVE_RAM_END: u16 = crate::hardware::apu::WAVE_RAM_END;
const HRAM_START: u16 = 0xFF80;
const HRAM_END: u16 = 0xFFFE;
const INTERRUPT_ENABLE: u16 = 0xFFFF;
const INTERRUPT_FLAG: u16 = 0xFF0F;

/// Coarse memory region used only to decide whether a CPU read during active DMA is
/// "connected" to the region DMA is copying from.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum DmaRegion {
    Rom,
    VideoRam,
    ExternalRam,
    WorkRam,
    Other,
}

fn dma_source_region(address: u16) -> DmaRegion {
    match address {
        0x0000..=ROM_END => DmaRegion::Rom,
        VRAM_START..=VRAM_END => DmaRegion::VideoRam,
        EXTERNAL_RAM_START..=EXTERNAL_RAM_END => DmaRegion::ExternalRam,
        WRAM_START..=WRAM_END | ECHO_START..=ECHO_END => DmaRegion::WorkRam,
        _ => DmaRegion::Other,
    }
}

/// OAM DMA copies 160 bytes from `source_base` into OAM, one byte every 4 master cycles,
/// but the transfer as a whole - and the CPU-read blocking that comes with it - spans 648
/// master cycles (160 bytes worth of copying plus the startup latency before the first
/// byte lands). While active the CPU can only see HRAM, and whatever region DMA is itself
/// reading from (the classic "DMA from VRAM" trick some ROMs rely on).
#[derive(Debug, Default)]
struct DmaState {
    active: bool,
    source_base: u16,
    index: u16,
    cycle_accumulator: u16,
    total_cycles: u16,
}

/// Total master cycles an OAM DMA transfer blocks the CPU for.
const DMA_DURATION_CYCLES: u16 = 648;

/// Contract the CPU's execution core is generic over. `advance` charges every subsystem
/// (DMA, PPU, timer, APU, in that order) for `cycles` master cycles and folds any
/// interrupts they raised into the IF register.
pub trait MemoryMapper: Debug {
    fn read_byte(&self, address: u16) -> u8;
    fn write_byte(&mut self, address: u16, value: u8);
    fn advance(&mut self, cycles: u8);
    /// `(interrupt_enable, interrupt_flag)`, both raw bitmasks matching `InterruptFlags`.
    fn interrupt_lines(&self) -> (u8, u8);
    fn clear_interrupt_flag(&mut self, bit: u8);
}

#[derive(Debug)]
pub struct Bus {
    cartridge: Cartridge,
    ppu: Ppu,
    apu: Apu,
    timer: crate::io::timer::TimerRegisters,
    joypad: JoyPad,
    io_registers: IORegisters,
    wram: [u8; WRAM_SIZE],
    hram: [u8; HRAM_SIZE],
    interrupt_enable: InterruptFlags,
    interrupt_flag: InterruptFlags,
    dma: DmaState,
}

impl Bus {
    pub fn new(cartridge: Cartridge) -> Self {
        Bus {
            cartridge,
            ppu: Ppu::new(),
            apu: Apu::new(),
            timer: crate::io::timer::TimerRegisters::default(),
            joypad: JoyPad::new(),
            io_registers: IORegisters::new(),
            wram: [0; WRAM_SIZE],
            hram: [0; HRAM_SIZE],
            interrupt_enable: InterruptFlags::empty(),
            interrupt_flag: InterruptFlags::VBLANK,
            dma: DmaState::default(),
        }
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn press_key(&mut self, input: InputKey) {
        self.interrupt_flag.insert(self.joypad.press_key(input));
    }

    pub fn release_key(&mut self, input: InputKey) {
        self.joypad.release_key(input);
    }

    fn dma_blocks_cpu_read(&self, address: u16) -> bool {
        if !self.dma.active {
            return false;
        }
        // HRAM stays readable throughout; so is whatever region DMA is itself reading
        // from (the bus being copied is still "connected" to that region's source).
        if (HRAM_START..=HRAM_END).contains(&address) {
            return false;
        }
        dma_source_region(address) != dma_source_region(self.dma.source_base)
    }

    fn start_dma(&mut self, value: u8) {
        self.dma = DmaState {
            active: true,
            source_base: (value as u16) << 8,
            index: 0,
            cycle_accumulator: 0,
            total_cycles: 0,
        };
    }

    fn advance_dma(&mut self, cycles: u8) {
        if !self.dma.active {
            return;
        }

        self.dma.cycle_accumulator += cycles as u16;
        self.dma.total_cycles += cycles as u16;

        while self.dma.cycle_accumulator >= 4 && self.dma.index < 160 {
            self.dma.cycle_accumulator -= 4;
            let source = self.dma.source_base + self.dma.index;
            let byte = self.read_byte_bypassing_dma(source);
            self.ppu.write_oam_dma(self.dma.index as u8, byte);
            self.dma.index += 1;
        }

        if self.dma.total_cycles >= DMA_DURATION_CYCLES {
            self.dma.active = false;
        }
    }

    fn read_byte_bypassing_dma(&self, address: u16) -> u8 {
        match address {
            0x0000..=ROM_END => self.cartridge.read_rom(address),
            VRAM_START..=VRAM_END => self.ppu.read_vram(address),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => self.cartridge.read_ram(address),
            WRAM_START..=WRAM_END => self.wram[(address - WRAM_START) as usize],
            ECHO_START..=ECHO_END => self.wram[(address - ECHO_START) as usize],
            OAM_START..=OAM_END => self.ppu.read_oam(address),
            _ => 0xFF,
        }
    }
}

impl MemoryMapper for Bus {
    fn read_byte(&self, address: u16) -> u8 {
        if self.dma_blocks_cpu_read(address) {
            return 0xFF;
        }

        match address {
            0x0000..=ROM_END => self.cartridge.read_rom(address),
            VRAM_START..=VRAM_END => self.ppu.read_vram(address),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => self.cartridge.read_ram(address),
            WRAM_START..=WRAM_END => self.wram[(address - WRAM_START) as usize],
            ECHO_START..=ECHO_END => self.wram[(address - ECHO_START) as usize],
            OAM_START..=OAM_END => self.ppu.read_oam(address),
            NOT_USABLE_START..=NOT_USABLE_END => 0xFF,
            JOYPAD_REGISTER => self.joypad.get_register(),
            DIVIDER_REGISTER => self.timer.divider_register(),
            TIMER_COUNTER => self.timer.timer_counter,
            TIMER_MODULO => self.timer.timer_modulo,
            TIMER_CONTROL => 0xF8 | self.timer.timer_control.to_bits(),
            INTERRUPT_FLAG => 0xE0 | self.interrupt_flag.bits(),
            APU_REG_START..=WAVE_RAM_END => self.apu.read_register(address),
            crate::hardware::ppu::LCD_CONTROL_REGISTER..=crate::hardware::ppu::WX_REGISTER => {
                self.ppu.read_register(address)
            }
            HRAM_START..=HRAM_END => self.hram[(address - HRAM_START) as usize],
            INTERRUPT_ENABLE => self.interrupt_enable.bits(),
            _ => self.io_registers.read_byte(address),
        }
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=ROM_END => self.cartridge.write_rom_control(address, value),
            VRAM_START..=VRAM_END => self.ppu.write_vram(address, value),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => self.cartridge.write_ram(address, value),
            WRAM_START..=WRAM_END => self.wram[(address - WRAM_START) as usize] = value,
            ECHO_START..=ECHO_END => self.wram[(address - ECHO_START) as usize] = value,
            OAM_START..=OAM_END => {
                if !self.dma.active {
                    self.ppu.write_oam(address, value);
                }
            }
            NOT_USABLE_START..=NOT_USABLE_END => {}
            JOYPAD_REGISTER => self.joypad.set_register(value),
            DIVIDER_REGISTER => self.timer.set_divider(),
            TIMER_COUNTER => self.timer.set_timer_counter(value),
            TIMER_MODULO => self.timer.set_tma(value),
            TIMER_CONTROL => self.timer.set_timer_control(value),
            INTERRUPT_FLAG => self.interrupt_flag = InterruptFlags::from_bits_truncate(value),
            OAM_DMA_REGISTER => self.start_dma(value),
            APU_REG_START..=WAVE_RAM_END => self.apu.write_register(address, value),
            crate::hardware::ppu::LCD_CONTROL_REGISTER..=crate::hardware::ppu::WX_REGISTER => {
                let mut pending = InterruptFlags::empty();
                self.ppu.write_register(address, value, &mut pending);
                self.interrupt_flag.insert(pending);
            }
            HRAM_START..=HRAM_END => self.hram[(address - HRAM_START) as usize] = value,
            INTERRUPT_ENABLE => self.interrupt_enable = InterruptFlags::from_bits_truncate(value),
            _ => self.io_registers.write_byte(address, value),
        }
    }

    /// Ordering matters here: DMA can change what the CPU will read next, PPU/timer can
    /// raise interrupts the CPU should see as soon as this call returns, and APU has no
    /// interrupt so it's ticked last.
    fn advance(&mut self, cycles: u8) {
        self.advance_dma(cycles);
        self.interrupt_flag.insert(self.ppu.advance(cycles as u16));
        self.interrupt_flag.insert(self.timer.advance(cycles as u16));
        self.apu.advance(cycles);
    }

    fn interrupt_lines(&self) -> (u8, u8) {
        (self.interrupt_enable.bits(), self.interrupt_flag.bits())
    }

    fn clear_interrupt_flag(&mut self, bit: u8) {
        self.interrupt_flag.remove(InterruptFlags::from_bits_truncate(1 << bit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::cartridge::Cartridge;

    fn test_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0147] = 0x00; // ROM ONLY
        rom[0x0148] = 0x00; // 32KB
        rom[0x0149] = 0x00; // no RAM
        let checksum = rom[0x0134..=0x014C]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        rom[0x014D] = checksum;
        rom
    }

    fn test_bus() -> Bus {
        Bus::new(Cartridge::new(test_rom(), None).unwrap())
    }

    #[test]
    fn hram_is_plain_rw_memory() {
        let mut bus = test_bus();
        bus.write_byte(0xFF81, 0x42);
        assert_eq!(bus.read_byte(0xFF81), 0x42);
    }

    #[test]
    fn echo_ram_mirrors_work_ram() {
        let mut bus = test_bus();
        bus.write_byte(0xC010, 0x7E);
        assert_eq!(bus.read_byte(0xE010), 0x7E);
    }

    #[test]
    fn oam_dma_copies_160_bytes_and_blocks_reads_outside_source_region() {
        let mut bus = test_bus();
        bus.write_byte(0xC000, 0xAB);
        // Source page 0x00 is ROM; reads into unrelated WRAM should miss while active,
        // HRAM should still be visible, and ROM itself (the DMA's own source) should not.
        bus.write_byte(OAM_DMA_REGISTER, 0x00);

        assert_eq!(bus.read_byte(0xC100), 0xFF);
        assert_eq!(bus.read_byte(0xFF81), 0x00);
        assert_eq!(bus.read_byte(0x0000), bus.cartridge.read_rom(0x0000));

        bus.advance(DMA_DURATION_CYCLES);

        assert!(!bus.dma.active);
    }

    #[test]
    fn oam_writes_are_blocked_while_dma_is_active() {
        let mut bus = test_bus();
        bus.write_byte(OAM_START, 0x11);
        bus.write_byte(OAM_DMA_REGISTER, 0x00);
        bus.write_byte(OAM_START, 0x22);
        assert_eq!(bus.ppu.read_oam(OAM_START), 0x11);

        bus.advance(DMA_DURATION_CYCLES);
        bus.write_byte(OAM_START, 0x33);
        assert_eq!(bus.ppu.read_oam(OAM_START), 0x33);
    }

    #[test]
    fn interrupt_flag_read_forces_top_bits_high() {
        let bus = test_bus();
        assert_eq!(bus.read_byte(INTERRUPT_FLAG) & 0xE0, 0xE0);
    }
}

pub mod header;
pub mod mbc;

use crate::error::EmulatorError;
use header::CartridgeHeader;
use mbc::Mbc;

#[derive(Debug)]
pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    mbc: Mbc,
    header: CartridgeHeader,
    has_battery: bool,
}

impl Cartridge {
    pub fn new(rom: Vec<u8>, saved_ram: Option<Vec<u8>>) -> Result<Self, EmulatorError> {
        let header = CartridgeHeader::parse(&rom)?;

        if !Mbc::is_supported(header.cartridge_type) {
            return Err(EmulatorError::UnsupportedCartridgeType { cartridge_type: header.cartridge_type });
        }

        let has_battery = matches!(
            header.cartridge_type,
            0x03 | 0x06 | 0x09 | 0x0D | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E | 0xFF
        );

        let rom_banks = (rom.len() / mbc::ROM_BANK_SIZE) as u16;
        let ram_size = if header.cartridge_type == 0x05 || header.cartridge_type == 0x06 {
            512 // MBC2's built-in nibble RAM, reported as a fixed size regardless of the header.
        } else {
            header.ram_size_bytes()
        };

        log::info!(
            "Loaded cartridge \"{}\", type {:#04x}, {} ROM banks, {} bytes RAM",
            header.title,
            header.cartridge_type,
            rom_banks,
            ram_size
        );

        let ram = match saved_ram {
            Some(saved) if saved.len() == ram_size => saved,
            Some(saved) => {
                log::warn!(
                    "Saved RAM size {} does not match expected {}, discarding",
                    saved.len(),
                    ram_size
                );
                vec![0xFF; ram_size]
            }
            None => vec![0xFF; ram_size],
        };

        Ok(Cartridge {
            mbc: Mbc::new(header.cartridge_type, rom_banks),
            rom,
            ram,
            header,
            has_battery,
        })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    pub fn read_rom(&self, address: u16) -> u8 {
        let offset = self.mbc.translate_rom_read(address);
        self.rom.get(offset).copied().unwrap_or(0xFF)
    }

    pub fn read_ram(&self, address: u16) -> u8 {
        match self.mbc.translate_ram_read(address) {
            Some(offset) => {
                let byte = self.ram.get(offset).copied().unwrap_or(0xFF);
                if self.mbc.is_mbc2_nibble_ram() {
                    byte | 0xF0
                } else {
                    byte
                }
            }
            None => 0xFF,
        }
    }

    pub fn write_rom_control(&mut self, address: u16, value: u8) {
        self.mbc.write_control(address, value);
    }

    pub fn write_ram(&mut self, address: u16, value: u8) {
        if let Some(offset) = self.mbc.translate_ram_read(address) {
            if let Some(slot) = self.ram.get_mut(offset) {
                *slot = if self.mbc.is_mbc2_nibble_ram() { value & 0x0F } else { value };
            }
        }
    }

    /// Persisted external RAM for cartridges with a battery, `None` otherwise.
    pub fn battery_ram(&self) -> Option<&[u8]> {
        if self.has_battery {
            Some(&self.ram)
        } else {
            None
        }
    }
}

use std::fmt;

/// Failures that can occur while constructing an emulator instance from a ROM image.
///
/// Anything past construction never fails: invalid reads return `0xFF`, invalid
/// writes are dropped, and unimplemented opcodes halt the core (see `Cpu::step`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmulatorError {
    /// The ROM is shorter than the minimum 32 KiB cartridge size.
    RomTooSmall { actual: usize },
    /// The ROM length isn't a power-of-two multiple of the 16 KiB bank size.
    RomSizeNotBankAligned { actual: usize },
    /// The header checksum at 0x014D didn't match the computed value.
    HeaderChecksumMismatch { expected: u8, computed: u8 },
    /// Cartridge type byte (0x0147) doesn't map to a supported MBC.
    UnsupportedCartridgeType { cartridge_type: u8 },
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorError::RomTooSmall { actual } => {
                write!(f, "ROM is too small to contain a header: {} bytes", actual)
            }
            EmulatorError::RomSizeNotBankAligned { actual } => {
                write!(f, "ROM size {} is not a power-of-two multiple of 16KiB", actual)
            }
            EmulatorError::HeaderChecksumMismatch { expected, computed } => write!(
                f,
                "header checksum mismatch: expected {:#04x}, computed {:#04x}",
                expected, computed
            ),
            EmulatorError::UnsupportedCartridgeType { cartridge_type } => {
                write!(f, "unsupported cartridge type: {:#04x}", cartridge_type)
            }
        }
    }
}

impl std::error::Error for EmulatorError {}

//! Cycle-accurate emulation core for the original monochrome handheld console
//! (Sharp LR35902). Given a ROM image it reproduces the CPU, memory map and memory-bank
//! controllers, the PPU, the APU, timers, interrupts, joypad and OAM DMA, producing a
//! stream of RGBA frames and a raw two-channel audio stream. Windowing, audio device
//! callbacks, wall-clock pacing and file I/O are a host's job, not this crate's; see
//! [`emulator::Emulator`] for the boundary.

pub mod emulator;
mod emulator_debug;
pub mod error;
pub mod hardware;
mod io;

pub use crate::emulator::{Emulator, EmulatorOptions, EmulatorOptionsBuilder, EventMask};
pub use crate::error::EmulatorError;
pub use crate::hardware::ppu::palette::DmgColor;
pub use crate::hardware::ppu::{FRAMEBUFFER_SIZE, RESOLUTION_HEIGHT, RESOLUTION_WIDTH};
pub use crate::io::joypad::InputKey;

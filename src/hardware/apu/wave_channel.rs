use crate::hardware::apu::channel_features::LengthFeature;
use crate::hardware::apu::no_length_tick_next_step;

/// Relevant for voice 3 for the DMG.
///
/// # Properties:
/// * Length Counter
#[derive(Default, Debug)]
pub struct WaveformChannel {
    length: LengthFeature,
    enabled: bool,
    output_volume: u8,
    frequency: u16,
    timer: u16,

    dac_power: bool,
    volume_load: u8,
    volume: u8,
    sample_buffer: [u8; 32],
    sample_pointer: usize,
    // Set for the one tick during which the frequency timer rolled over and the channel
    // actually latched a new sample. The CPU can only observe/replace wave RAM coincident
    // with such a tick; any other access during playback sees/affects nothing.
    just_clocked: bool,
}

impl WaveformChannel {
    pub fn new() -> Self {
        WaveformChannel {
            // The DMG initialisation values, the game R-Type relies on these.
            sample_buffer: [
                0x8, 0x4, 0x4, 0x0, 0x4, 0x3, 0xA, 0xA, 0x2, 0xD, 0x7, 0x8, 0x9, 0x2, 0x3, 0xC, 0x6, 0x0, 0x5, 0x9,
                0x5, 0x9, 0xB, 0x0, 0x3, 0x4, 0xB, 0x8, 0x2, 0xE, 0xD, 0xA,
            ],
            ..Default::default()
        }
    }

    pub fn output_volume(&self) -> u8 {
        self.output_volume
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn tick_timer(&mut self, cycles: u16) {
        let mut remaining = cycles;
        self.just_clocked = false;

        while remaining > 0 {
            let (new_val, overflowed) = self.timer.overflowing_sub(2);

            if overflowed {
                self.timer = (2048 - self.frequency) * 2;
                self.sample_pointer = (self.sample_pointer + 1) % 32;
                self.just_clocked = true;
            } else {
                self.timer = new_val;
            }

            remaining -= 2;
        }

        self.output_volume = if self.enabled && self.dac_power {
            self.sample_buffer[self.sample_pointer] >> self.volume
        } else {
            0
        };
    }

    pub fn tick_length(&mut self) {
        self.length.tick(&mut self.enabled);
    }

    pub fn read_register(&self, address: u16) -> u8 {
        // Expect the address to already have had an & 0xFF
        // The read values are taken from gbdev
        match address {
            0x1A => 0x7F | if self.dac_power { 0x80 } else { 0 },
            0x1B => 0xFF,
            0x1C => 0x9F | self.volume_load,
            0x1D => 0xFF, // Can't read NR33
            0x1E => 0xBF | if self.length.length_enable { 0x40 } else { 0x0 },
            0x30..=0x3F => self.read_wave_ram(address),
            _ => panic!("Invalid Voice3 register read: 0xFF{:02X}", address),
        }
    }

    pub fn write_register(&mut self, address: u16, value: u8, next_frame_sequencer_step: u8) {
        // Expect the address to already have had an & 0xFF
        match address {
            0x1A => {
                self.dac_power = (value & 0x80) == 0x80;
                if !self.dac_power {
                    self.enabled = false;
                }
            }
            0x1B => self.length.write_register_256(value),
            0x1C => self.set_volume_from_val(value),
            0x1D => self.frequency = (self.frequency & 0x0700) | value as u16,
            0x1E => {
                let old_length_enable = self.length.length_enable;
                let no_l_next = no_length_tick_next_step(next_frame_sequencer_step);

                self.length.length_enable = (value & 0x40) == 0x40;
                self.frequency = (self.frequency & 0xFF) | (((value & 0x07) as u16) << 8);

                if no_l_next {
                    self.length.second_half_enable_tick(&mut self.enabled, old_length_enable);
                }

                if (value & 0x80) != 0 {
                    self.enable();
                }
            }
            0x30..=0x3F => self.write_wave_ram(address, value),
            _ => panic!("Invalid Voice3 register write: 0xFF{:02X}", address),
        }
    }

    /// While the channel is enabled, the CPU can only see/touch the byte currently being
    /// played, and only on the cycle it was latched - otherwise the access misses entirely.
    fn read_wave_ram(&self, address: u16) -> u8 {
        if self.enabled {
            if self.just_clocked {
                self.current_byte()
            } else {
                0xFF
            }
        } else {
            let offset_address = ((address - 0x30) * 2) as usize;
            (self.sample_buffer[offset_address] << 4) | self.sample_buffer[offset_address + 1]
        }
    }

    fn write_wave_ram(&mut self, address: u16, value: u8) {
        if self.enabled {
            if self.just_clocked {
                let byte_index = (self.sample_pointer / 2) * 2;
                self.sample_buffer[byte_index] = value >> 4;
                self.sample_buffer[byte_index + 1] = value & 0xF;
            }
        } else {
            let offset_address = ((address - 0x30) * 2) as usize;
            self.sample_buffer[offset_address] = value >> 4;
            self.sample_buffer[offset_address + 1] = value & 0xF;
        }
    }

    fn current_byte(&self) -> u8 {
        let byte_index = (self.sample_pointer / 2) * 2;
        (self.sample_buffer[byte_index] << 4) | self.sample_buffer[byte_index + 1]
    }

    /// Should be called whenever the trigger bit in NR34 is written to.
    ///
    /// The values that are set are taken from [here](https://gist.github.com/drhelius/3652407)
    fn enable(&mut self) {
        if self.enabled && self.just_clocked {
            self.apply_trigger_corruption();
        }

        // Only if the dac has power should the channel be re-enabled.
        if self.dac_power {
            self.enabled = true;
        }
        self.length.trigger_256();
        self.timer = (2048 - self.frequency) * 2;
        self.sample_pointer = 0;
        self.set_volume_from_val(self.volume_load);
    }

    /// Retriggering the channel right as it reads wave RAM corrupts the buffer: the byte
    /// that was about to be read either overwrites byte 0 (if within the first 4 bytes) or
    /// the whole first 4 bytes get overwritten by the 4-byte-aligned block containing it.
    fn apply_trigger_corruption(&mut self) {
        let byte_position = (self.sample_pointer / 2) % 16;

        if byte_position < 4 {
            let src = byte_position * 2;
            self.sample_buffer[0] = self.sample_buffer[src];
            self.sample_buffer[1] = self.sample_buffer[src + 1];
        } else {
            let block = (byte_position / 4) * 4;
            for i in 0..4 {
                let src = (block + i) * 2;
                self.sample_buffer[i * 2] = self.sample_buffer[src];
                self.sample_buffer[i * 2 + 1] = self.sample_buffer[src + 1];
            }
        }
    }

    /// Behaviour on NR52 power-off: registers clear except the length counter (which keeps
    /// counting) and the wave RAM contents (which are plain memory, unaffected by power).
    pub fn reset(&mut self) {
        self.length.length_enable = false;
        let length = self.length;
        let sample_buffer = self.sample_buffer;

        *self = Self {
            length,
            sample_buffer,
            ..Default::default()
        };
    }

    fn set_volume_from_val(&mut self, value: u8) {
        self.volume_load = value & 0x60;
        // We'll shift right (thus divide by 2) by these amounts.
        self.volume = match self.volume_load {
            0b0_00_0_0000 => 4, // 0% volume
            0b0_01_0_0000 => 0, // 100% volume
            0b0_10_0_0000 => 1, // 50% volume
            0b0_11_0_0000 => 2, // 75% volume
            _ => unreachable!("only two bits are masked into volume_load"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_channel_allows_direct_wave_ram_access() {
        let mut channel = WaveformChannel::new();

        channel.write_register(0x30, 0xAB, 0);

        assert_eq!(channel.read_register(0x30), 0xAB);
    }

    #[test]
    fn enabled_channel_blocks_wave_ram_outside_coincidence() {
        let mut channel = WaveformChannel::new();
        channel.write_register(0x1A, 0x80, 0); // DAC on
        channel.write_register(0x1E, 0x80, 0); // trigger

        assert_eq!(channel.read_register(0x30), 0xFF);
    }
}

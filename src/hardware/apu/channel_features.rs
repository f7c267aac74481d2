//! Shared sub-units (envelope, length counter, frequency sweep) used by more than one
//! of the four voice channels.

#[derive(Default, Debug, Copy, Clone)]
pub struct EnvelopeFeature {
    pub volume: u8,
    pub volume_load: u8,
    pub envelope_add_mode: bool,
    envelope_enabled: bool,
    envelope_period_load_value: u8,
    envelope_period: u8,
}

impl EnvelopeFeature {
    /// A volume envelope has a volume counter and an internal timer clocked at 64 Hz by the
    /// frame sequencer. When the timer generates a clock and the envelope period is not zero,
    /// a new volume is calculated by adding or subtracting (as set by NRx2) one from the current
    /// volume. If the new volume is within 0..=15 the volume is updated, otherwise it is left
    /// unchanged and no further automatic adjustments are made until the channel retriggers.
    pub fn tick(&mut self) {
        if self.envelope_enabled && self.envelope_period > 0 {
            self.envelope_period = self.envelope_period.saturating_sub(1);

            if self.envelope_period == 0 {
                if self.envelope_add_mode {
                    let new_val = self.volume + 1;
                    if new_val <= 15 {
                        self.volume = new_val;
                        self.envelope_period = self.envelope_period_load_value;
                    } else {
                        self.envelope_enabled = false;
                    }
                } else {
                    let (new_val, overflow) = self.volume.overflowing_sub(1);
                    if !overflow {
                        self.volume = new_val;
                        self.envelope_period = self.envelope_period_load_value;
                    } else {
                        self.envelope_enabled = false;
                    }
                }
            }
        }
    }

    /// Behaviour on channel trigger: reload the live volume from NRx2, rearm the timer.
    ///
    /// `next_step_envelope` indicates the frame sequencer's next step would clock envelope;
    /// if so the reloaded period gets one extra clock immediately.
    pub fn trigger(&mut self, next_step_envelope: bool) {
        self.volume = self.volume_load;
        self.envelope_enabled = true;
        self.envelope_period = self.envelope_period_load_value + if next_step_envelope { 1 } else { 0 };
    }

    pub fn read_register(&self) -> u8 {
        (self.volume_load << 4) | self.envelope_period_load_value | if self.envelope_add_mode { 0x8 } else { 0 }
    }

    pub fn write_register(&mut self, value: u8) {
        self.volume_load = (value & 0xF0) >> 4;
        self.envelope_add_mode = (value & 0x8) == 0x8;
        self.envelope_period_load_value = value & 0x7;
        self.envelope_period = self.envelope_period_load_value;
    }
}

/// Length counter, shared by all four channels. Channel 3 (wave) uses the 256-value variant
/// (`*_256` methods); the other three use the 64-value variant.
#[derive(Default, Debug, Copy, Clone)]
pub struct LengthFeature {
    pub length_enable: bool,
    length: u16,
}

impl LengthFeature {
    /// Current countdown value; exposed for observability (tests, frontends), never
    /// consulted by the channels themselves outside of `tick`/`tick_256`.
    pub fn counter(&self) -> u16 {
        self.length
    }

    pub fn write_register(&mut self, value: u8) {
        self.length = 64 - (value & 0x3F) as u16;
    }

    pub fn write_register_256(&mut self, value: u8) {
        self.length = 256 - value as u16;
    }

    pub fn trigger(&mut self, _next_step_no_length: bool) {
        if self.length == 0 {
            self.length = 64;
        }
    }

    pub fn trigger_256(&mut self) {
        if self.length == 0 {
            self.length = 256;
        }
    }

    /// An extra length clock fires when a write to NRx4 enables the length counter during a
    /// frame-sequencer step that wouldn't otherwise clock length this cycle.
    pub fn second_half_enable_tick(&mut self, channel_enabled: &mut bool, old_length_enable: bool) {
        if !old_length_enable && self.length_enable && self.length > 0 {
            self.length -= 1;
            if self.length == 0 {
                *channel_enabled = false;
            }
        }
    }

    pub fn tick(&mut self, channel_enabled: &mut bool) {
        if self.length_enable && self.length > 0 {
            self.length -= 1;
            if self.length == 0 {
                *channel_enabled = false;
            }
        }
    }
}

/// Frequency sweep unit, channel 1 only.
#[derive(Default, Debug, Copy, Clone)]
pub struct SweepFeature {
    period: u8,
    negate: bool,
    shift: u8,
    enabled: bool,
    timer: u8,
    shadow_frequency: u16,
    used_negate_since_trigger: bool,
}

impl SweepFeature {
    pub fn read_register(&self) -> u8 {
        0x80 | (self.period << 4) | (if self.negate { 0x08 } else { 0 }) | self.shift
    }

    pub fn write_register(&mut self, value: u8, trigger: &mut bool) {
        let old_negate = self.negate;

        self.period = (value & 0x70) >> 4;
        self.negate = (value & 0x08) != 0;
        self.shift = value & 0x07;

        // Clearing negate mode after it was used in a calculation since the last trigger
        // disables the channel immediately (a documented hardware quirk).
        if old_negate && !self.negate && self.used_negate_since_trigger {
            *trigger = false;
        }
    }

    /// Should be called whenever the trigger bit in NR14 is written to.
    pub fn trigger_sweep(&mut self, trigger: &mut bool, frequency: u16) {
        self.shadow_frequency = frequency;
        self.timer = if self.period != 0 { self.period } else { 8 };
        self.enabled = self.period != 0 || self.shift != 0;
        self.used_negate_since_trigger = false;

        if self.shift != 0 {
            let (_, overflowed) = self.calculate();
            if overflowed {
                *trigger = false;
            }
        }
    }

    pub fn tick(&mut self, trigger: &mut bool, frequency: &mut u16) {
        if self.timer > 0 {
            self.timer -= 1;
        }

        if self.timer != 0 {
            return;
        }
        self.timer = if self.period != 0 { self.period } else { 8 };

        if !self.enabled || self.period == 0 {
            return;
        }

        let (new_frequency, overflowed) = self.calculate();
        if overflowed {
            *trigger = false;
        } else if self.shift != 0 {
            self.shadow_frequency = new_frequency;
            *frequency = new_frequency;

            let (_, overflowed_again) = self.calculate();
            if overflowed_again {
                *trigger = false;
            }
        }
    }

    fn calculate(&mut self) -> (u16, bool) {
        let delta = self.shadow_frequency >> self.shift;
        let new_frequency = if self.negate {
            self.used_negate_since_trigger = true;
            self.shadow_frequency.wrapping_sub(delta)
        } else {
            self.shadow_frequency.wrapping_add(delta)
        };

        (new_frequency, new_frequency > 2047)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decrements_on_tick() {
        let mut envelope = EnvelopeFeature::default();
        envelope.write_register(0xF1); // volume 15, subtract mode, period 1
        envelope.trigger(false);

        envelope.tick();

        assert_eq!(envelope.volume, 14);
    }

    #[test]
    fn length_disables_channel_on_zero() {
        let mut length = LengthFeature::default();
        length.length_enable = true;
        length.write_register(0x3F); // length = 1
        let mut enabled = true;

        length.tick(&mut enabled);

        assert!(!enabled);
    }

    #[test]
    fn sweep_disables_channel_on_overflow() {
        let mut sweep = SweepFeature::default();
        sweep.write_register(0b0_111_0_001, &mut true); // period 7, shift 1, add mode
        let mut trigger = true;
        let mut frequency = 2047;

        sweep.trigger_sweep(&mut trigger, frequency);

        assert!(!trigger);
        let _ = &mut frequency;
    }
}

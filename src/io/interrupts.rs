//! The five interrupt lines, in dispatch-priority order (lowest bit wins on simultaneous
//! pending interrupts): V-Blank, LCD STAT, Timer, Serial, Joypad.

use bitflags::*;

bitflags! {
    #[derive(Default)]
    pub struct InterruptFlags: u8 {
        /// V-Blank
        const VBLANK = 0b0000_0001;
        /// LCD Stat
        const LCD    = 0b0000_0010;
        /// Timer
        const TIMER  = 0b0000_0100;
        /// Serial
        const SERIAL = 0b0000_1000;
        /// Joypad
        const JOYPAD = 0b0001_0000;
        /// Top three bits of IF/IE always read back as 1.
        const UNUSED = 0b1110_0000;
    }
}

impl InterruptFlags {
    pub fn iter() -> impl Iterator<Item = InterruptFlags> {
        [
            InterruptFlags::VBLANK,
            InterruptFlags::LCD,
            InterruptFlags::TIMER,
            InterruptFlags::SERIAL,
            InterruptFlags::JOYPAD,
        ]
        .iter()
        .copied()
    }
}

#[cfg(test)]
mod test {
    use super::InterruptFlags;

    #[test]
    fn test_interrupt_order() {
        let ordered = [
            InterruptFlags::VBLANK,
            InterruptFlags::LCD,
            InterruptFlags::TIMER,
            InterruptFlags::SERIAL,
            InterruptFlags::JOYPAD,
        ];
        for (i, interrupt) in InterruptFlags::iter().enumerate() {
            assert_eq!(ordered[i], interrupt);
        }
    }
}

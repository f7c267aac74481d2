//! ALU helpers shared by every rotate/shift family, each implemented once and
//! reused across the plain (`RLCA`..) and CB-prefixed (`RLC r8`..) opcodes.
use crate::hardware::cpu::traits::{SetU8, ToU8};
use crate::hardware::cpu::Cpu;
use crate::hardware::bus::MemoryMapper;

impl<M: MemoryMapper> Cpu<M> {
    /// Rotate `target` left. `C <- [7 <- 0] <- [7]`. Flags: `Z00C`.
    pub(crate) fn rotate_left<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = value.rotate_left(1);
        self.set_rotate_flags(new_value, value & 0x80);
        self.set_value(target, new_value);
    }

    /// Rotate `target` left through carry. `C <- [7 <- 0] <- C`. Flags: `Z00C`.
    pub(crate) fn rotate_left_carry<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = (value.wrapping_shl(1)) | self.registers.cf() as u8;
        self.set_rotate_flags(new_value, value & 0x80);
        self.set_value(target, new_value);
    }

    /// Arithmetic shift left. `C <- [7 <- 0] <- 0`. Flags: `Z00C`.
    pub(crate) fn shift_left<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = value.wrapping_shl(1);
        self.set_rotate_flags(new_value, value & 0x80);
        self.set_value(target, new_value);
    }

    /// Rotate `target` right. `[0] -> [7 -> 0] -> C`. Flags: `Z00C`.
    pub(crate) fn rotate_right<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = value.rotate_right(1);
        self.set_rotate_flags(new_value, value & 0x01);
        self.set_value(target, new_value);
    }

    /// Rotate `target` right through carry. `C -> [7 -> 0] -> C`. Flags: `Z00C`.
    pub(crate) fn rotate_right_carry<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = ((self.registers.cf() as u8) << 7) | (value.wrapping_shr(1));
        self.set_rotate_flags(new_value, value & 0x01);
        self.set_value(target, new_value);
    }

    /// Arithmetic shift right, preserving bit 7. `[7] -> [7 -> 0] -> C`. Flags: `Z00C`.
    pub(crate) fn shift_right_arithmetic<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = (value >> 1) | (value & 0x80);
        self.set_rotate_flags(new_value, value & 0x01);
        self.set_value(target, new_value);
    }

    /// Logical shift right. `0 -> [7 -> 0] -> C`. Flags: `Z00C`.
    pub(crate) fn shift_right_logical<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = value.wrapping_shr(1);
        self.set_rotate_flags(new_value, value & 0x01);
        self.set_value(target, new_value);
    }

    /// Swap the high and low nibble. Flags: `Z000`.
    pub(crate) fn swap<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        let new_value = value.rotate_left(4);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(false);
        self.set_value(target, new_value);
    }

    /// Test bit `n` of `target`. Flags: `Z01-`.
    pub(crate) fn bit_test<T: Copy>(&mut self, n: u8, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.get_reg_value(target);
        self.registers.set_zf((value & (1 << n)) == 0);
        self.registers.set_n(false);
        self.registers.set_h(true);
    }

    /// Set bit `n` of `target`. No flags affected.
    pub(crate) fn bit_set<T: Copy>(&mut self, n: u8, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        self.set_value(target, value | (1 << n));
    }

    /// Reset (clear) bit `n` of `target`. No flags affected.
    pub(crate) fn bit_reset<T: Copy>(&mut self, n: u8, target: T)
    where
        Self: ToU8<T> + SetU8<T>,
    {
        let value = self.get_reg_value(target);
        self.set_value(target, value & !(1 << n));
    }

    #[inline]
    fn set_rotate_flags(&mut self, new_value: u8, cf_check: u8) {
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(cf_check != 0);
    }
}

//! Opcode decode tables. Every opcode boils down to one call into the
//! operand-generic instruction families in `mod.rs`/`alu.rs`; this file only
//! maps the byte to (family, operands) and the base cycle cost in master
//! cycles (conditional branches add 4 more when taken).
use crate::hardware::cpu::registers::{Reg16, Reg8};
use crate::hardware::cpu::{Cpu, JumpCondition, Operand16, Operand8};
use crate::hardware::bus::MemoryMapper;

impl<M: MemoryMapper> Cpu<M> {
    /// Decode and run the opcode fetched by `step()`. Returns the number of
    /// master cycles the instruction consumed, `0xCB` prefix included.
    pub fn execute(&mut self, opcode: u8) -> u8 {
        use Operand8::*;
        use Reg8::*;
        use Reg16::*;

        match opcode {
            0x00 => {
                self.nop();
                4
            }
            0x01 => {
                self.load_16bit(Operand16::Reg(BC), Operand16::Imm16);
                12
            }
            0x02 => {
                self.load_8bit(MemBC, Reg(A));
                8
            }
            0x03 => {
                self.increment_16bit(BC);
                8
            }
            0x04 => {
                self.increment(Reg(B));
                4
            }
            0x05 => {
                self.decrement(Reg(B));
                4
            }
            0x06 => {
                self.load_8bit(Reg(B), Imm8);
                8
            }
            0x07 => {
                self.rlca();
                4
            }
            0x08 => {
                self.store_sp_at_imm16();
                20
            }
            0x09 => {
                self.add_16bit(BC);
                8
            }
            0x0A => {
                self.load_8bit(Reg(A), MemBC);
                8
            }
            0x0B => {
                self.decrement_16bit(BC);
                8
            }
            0x0C => {
                self.increment(Reg(C));
                4
            }
            0x0D => {
                self.decrement(Reg(C));
                4
            }
            0x0E => {
                self.load_8bit(Reg(C), Imm8);
                8
            }
            0x0F => {
                self.rrca();
                4
            }

            0x10 => {
                self.stop();
                4
            }
            0x11 => {
                self.load_16bit(Operand16::Reg(DE), Operand16::Imm16);
                12
            }
            0x12 => {
                self.load_8bit(MemDE, Reg(A));
                8
            }
            0x13 => {
                self.increment_16bit(DE);
                8
            }
            0x14 => {
                self.increment(Reg(D));
                4
            }
            0x15 => {
                self.decrement(Reg(D));
                4
            }
            0x16 => {
                self.load_8bit(Reg(D), Imm8);
                8
            }
            0x17 => {
                self.rla();
                4
            }
            0x18 => {
                self.relative_jump(JumpCondition::Always);
                12
            }
            0x19 => {
                self.add_16bit(DE);
                8
            }
            0x1A => {
                self.load_8bit(Reg(A), MemDE);
                8
            }
            0x1B => {
                self.decrement_16bit(DE);
                8
            }
            0x1C => {
                self.increment(Reg(E));
                4
            }
            0x1D => {
                self.decrement(Reg(E));
                4
            }
            0x1E => {
                self.load_8bit(Reg(E), Imm8);
                8
            }
            0x1F => {
                self.rra();
                4
            }

            0x20 => self.cycles_for_jr(JumpCondition::NotZero),
            0x21 => {
                self.load_16bit(Operand16::Reg(HL), Operand16::Imm16);
                12
            }
            0x22 => {
                self.load_8bit(MemHLInc, Reg(A));
                8
            }
            0x23 => {
                self.increment_16bit(HL);
                8
            }
            0x24 => {
                self.increment(Reg(H));
                4
            }
            0x25 => {
                self.decrement(Reg(H));
                4
            }
            0x26 => {
                self.load_8bit(Reg(H), Imm8);
                8
            }
            0x27 => {
                self.daa();
                4
            }
            0x28 => self.cycles_for_jr(JumpCondition::Zero),
            0x29 => {
                self.add_16bit(HL);
                8
            }
            0x2A => {
                self.load_8bit(Reg(A), MemHLInc);
                8
            }
            0x2B => {
                self.decrement_16bit(HL);
                8
            }
            0x2C => {
                self.increment(Reg(L));
                4
            }
            0x2D => {
                self.decrement(Reg(L));
                4
            }
            0x2E => {
                self.load_8bit(Reg(L), Imm8);
                8
            }
            0x2F => {
                self.cpl();
                4
            }

            0x30 => self.cycles_for_jr(JumpCondition::NotCarry),
            0x31 => {
                self.load_16bit(Operand16::Reg(SP), Operand16::Imm16);
                12
            }
            0x32 => {
                self.load_8bit(MemHLDec, Reg(A));
                8
            }
            0x33 => {
                self.increment_16bit(SP);
                8
            }
            0x34 => {
                self.increment(MemHL);
                12
            }
            0x35 => {
                self.decrement(MemHL);
                12
            }
            0x36 => {
                self.load_8bit(MemHL, Imm8);
                12
            }
            0x37 => {
                self.scf();
                4
            }
            0x38 => self.cycles_for_jr(JumpCondition::Carry),
            0x39 => {
                self.add_16bit(SP);
                8
            }
            0x3A => {
                self.load_8bit(Reg(A), MemHLDec);
                8
            }
            0x3B => {
                self.decrement_16bit(SP);
                8
            }
            0x3C => {
                self.increment(Reg(A));
                4
            }
            0x3D => {
                self.decrement(Reg(A));
                4
            }
            0x3E => {
                self.load_8bit(Reg(A), Imm8);
                8
            }
            0x3F => {
                self.ccf();
                4
            }

            0x76 => {
                self.halt();
                4
            }
            0x40..=0x7F => {
                let dest = reg_code_to_operand8((opcode >> 3) & 7);
                let src = reg_code_to_operand8(opcode & 7);
                let touches_hl = matches!(dest, MemHL) || matches!(src, MemHL);
                self.load_8bit(dest, src);
                if touches_hl {
                    8
                } else {
                    4
                }
            }

            0x80..=0xBF => {
                let src = reg_code_to_operand8(opcode & 7);
                let cost = if matches!(src, MemHL) { 8 } else { 4 };
                self.dispatch_alu_family((opcode >> 3) & 7, src);
                cost
            }

            0xC0 => self.cycles_for_ret(JumpCondition::NotZero, 8),
            0xC1 => {
                self.pop(BC);
                12
            }
            0xC2 => self.cycles_for_jp(JumpCondition::NotZero),
            0xC3 => self.cycles_for_jp(JumpCondition::Always),
            0xC4 => self.cycles_for_call(JumpCondition::NotZero),
            0xC5 => {
                self.push(BC);
                16
            }
            0xC6 => {
                self.add(Imm8);
                8
            }
            0xC7 => {
                self.rst(0x00);
                16
            }
            0xC8 => self.cycles_for_ret(JumpCondition::Zero, 8),
            0xC9 => {
                self.ret(JumpCondition::Always);
                16
            }
            0xCA => self.cycles_for_jp(JumpCondition::Zero),
            0xCB => {
                let cb_opcode = self.fetch_u8();
                4 + self.execute_prefix(cb_opcode)
            }
            0xCC => self.cycles_for_call(JumpCondition::Zero),
            0xCD => self.cycles_for_call(JumpCondition::Always),
            0xCE => {
                self.adc(Imm8);
                8
            }
            0xCF => {
                self.rst(0x08);
                16
            }

            0xD0 => self.cycles_for_ret(JumpCondition::NotCarry, 8),
            0xD1 => {
                self.pop(DE);
                12
            }
            0xD2 => self.cycles_for_jp(JumpCondition::NotCarry),
            0xD4 => self.cycles_for_call(JumpCondition::NotCarry),
            0xD5 => {
                self.push(DE);
                16
            }
            0xD6 => {
                self.sub(Imm8);
                8
            }
            0xD7 => {
                self.rst(0x10);
                16
            }
            0xD8 => self.cycles_for_ret(JumpCondition::Carry, 8),
            0xD9 => {
                self.reti();
                16
            }
            0xDA => self.cycles_for_jp(JumpCondition::Carry),
            0xDC => self.cycles_for_call(JumpCondition::Carry),
            0xDE => {
                self.sbc(Imm8);
                8
            }
            0xDF => {
                self.rst(0x18);
                16
            }

            0xE0 => {
                self.load_8bit(HighImm8, Reg(A));
                12
            }
            0xE1 => {
                self.pop(HL);
                12
            }
            0xE2 => {
                self.load_8bit(HighC, Reg(A));
                8
            }
            0xE5 => {
                self.push(HL);
                16
            }
            0xE6 => {
                self.and(Imm8);
                8
            }
            0xE7 => {
                self.rst(0x20);
                16
            }
            0xE8 => {
                self.add_sp();
                16
            }
            0xE9 => {
                self.jump_hl();
                4
            }
            0xEA => {
                self.load_8bit(MemImm16, Reg(A));
                16
            }
            0xEE => {
                self.xor(Imm8);
                8
            }
            0xEF => {
                self.rst(0x28);
                16
            }

            0xF0 => {
                self.load_8bit(Reg(A), HighImm8);
                12
            }
            0xF1 => {
                self.pop(AF);
                12
            }
            0xF2 => {
                self.load_8bit(Reg(A), HighC);
                8
            }
            0xF3 => {
                self.di();
                4
            }
            0xF5 => {
                self.push(AF);
                16
            }
            0xF6 => {
                self.or(Imm8);
                8
            }
            0xF7 => {
                self.rst(0x30);
                16
            }
            0xF8 => {
                self.load_hl_sp_offset();
                12
            }
            0xF9 => {
                self.registers.sp = self.registers.hl();
                8
            }
            0xFA => {
                self.load_8bit(Reg(A), MemImm16);
                16
            }
            0xFB => {
                self.ei();
                4
            }
            0xFE => {
                self.compare(Imm8);
                8
            }
            0xFF => {
                self.rst(0x38);
                16
            }

            // No valid DMG encoding.
            0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => {
                self.unknown_opcode(opcode);
                4
            }
        }
    }

    /// `0xCB`-prefixed table: rotate/shift/swap, `BIT`, `RES`, `SET` over the
    /// standard 3-bit operand code (`B,C,D,E,H,L,(HL),A`). Returns the cost of
    /// just the suffix byte (the caller adds 4 for the prefix fetch).
    fn execute_prefix(&mut self, opcode: u8) -> u8 {
        let src = reg_code_to_operand8(opcode & 7);
        let touches_hl = matches!(src, Operand8::MemHL);

        match opcode >> 6 {
            0 => {
                match (opcode >> 3) & 7 {
                    0 => self.rotate_left(src),
                    1 => self.rotate_right(src),
                    2 => self.rotate_left_carry(src),
                    3 => self.rotate_right_carry(src),
                    4 => self.shift_left(src),
                    5 => self.shift_right_arithmetic(src),
                    6 => self.swap(src),
                    7 => self.shift_right_logical(src),
                    _ => unreachable!(),
                }
                if touches_hl {
                    16
                } else {
                    8
                }
            }
            1 => {
                self.bit_test((opcode >> 3) & 7, src);
                if touches_hl {
                    12
                } else {
                    8
                }
            }
            2 => {
                self.bit_reset((opcode >> 3) & 7, src);
                if touches_hl {
                    16
                } else {
                    8
                }
            }
            3 => {
                self.bit_set((opcode >> 3) & 7, src);
                if touches_hl {
                    16
                } else {
                    8
                }
            }
            _ => unreachable!(),
        }
    }

    fn dispatch_alu_family(&mut self, family: u8, src: Operand8) {
        match family {
            0 => self.add(src),
            1 => self.adc(src),
            2 => self.sub(src),
            3 => self.sbc(src),
            4 => self.and(src),
            5 => self.xor(src),
            6 => self.or(src),
            7 => self.compare(src),
            _ => unreachable!(),
        }
    }

    fn cycles_for_jr(&mut self, condition: JumpCondition) -> u8 {
        if self.relative_jump(condition) {
            12
        } else {
            8
        }
    }

    fn cycles_for_jp(&mut self, condition: JumpCondition) -> u8 {
        if self.jump(condition) {
            16
        } else {
            12
        }
    }

    fn cycles_for_call(&mut self, condition: JumpCondition) -> u8 {
        if self.call(condition) {
            24
        } else {
            12
        }
    }

    fn cycles_for_ret(&mut self, condition: JumpCondition, not_taken: u8) -> u8 {
        if self.ret(condition) {
            20
        } else {
            not_taken
        }
    }

    /// `LD (a16), SP`: the only instruction that stores a 16-bit register to an
    /// immediate address, so it does not fit the `Operand16` write family.
    pub(crate) fn store_sp_at_imm16(&mut self) {
        let addr = self.fetch_u16();
        self.memory.write_byte(addr, self.registers.sp as u8);
        self.memory.write_byte(addr.wrapping_add(1), (self.registers.sp >> 8) as u8);
    }
}

/// The standard 3-bit register/operand code shared by `LD r,r'`, the ALU block,
/// and every `0xCB`-prefixed family: `B,C,D,E,H,L,(HL),A`.
fn reg_code_to_operand8(code: u8) -> Operand8 {
    match code & 7 {
        0 => Operand8::Reg(Reg8::B),
        1 => Operand8::Reg(Reg8::C),
        2 => Operand8::Reg(Reg8::D),
        3 => Operand8::Reg(Reg8::E),
        4 => Operand8::Reg(Reg8::H),
        5 => Operand8::Reg(Reg8::L),
        6 => Operand8::MemHL,
        7 => Operand8::Reg(Reg8::A),
        _ => unreachable!(),
    }
}

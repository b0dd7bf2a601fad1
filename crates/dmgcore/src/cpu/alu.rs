use super::table::{AluOp, ShiftOp};
use super::{Cpu, Flags};

impl Cpu {
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.alu_add(value, false),
            AluOp::Adc => self.alu_add(value, true),
            AluOp::Sub => self.regs.a = self.alu_sub(value, false),
            AluOp::Sbc => self.regs.a = self.alu_sub(value, true),
            AluOp::And => self.alu_logic(self.regs.a & value, true),
            AluOp::Xor => self.alu_logic(self.regs.a ^ value, false),
            AluOp::Or => self.alu_logic(self.regs.a | value, false),
            AluOp::Cp => {
                // Flags as for SUB, accumulator untouched.
                self.alu_sub(value, false);
            }
        }
    }

    /// ADD/ADC into A.
    fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = u8::from(use_carry && self.flag(Flags::C));

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = a as u16 + value as u16 + carry_in as u16;
        let result = full as u8;

        self.regs.a = result;
        self.regs.f = Flags::empty();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, half > 0x0F);
        self.set_flag(Flags::C, full > 0xFF);
    }

    /// SUB/SBC/CP flag computation; returns the difference and leaves the
    /// caller to decide whether it lands in A.
    fn alu_sub(&mut self, value: u8, use_carry: bool) -> u8 {
        let a = self.regs.a;
        let carry_in = i16::from(use_carry && self.flag(Flags::C));

        let half = (a & 0x0F) as i16 - (value & 0x0F) as i16 - carry_in;
        let full = a as i16 - value as i16 - carry_in;
        let result = full as u8;

        self.regs.f = Flags::N;
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, half < 0);
        self.set_flag(Flags::C, full < 0);
        result
    }

    fn alu_logic(&mut self, result: u8, half_carry: bool) {
        self.regs.a = result;
        self.regs.f = Flags::empty();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, half_carry);
    }

    /// Decimal-adjust A after a BCD add or subtract.
    ///
    /// N picks the direction. H and C (plus the digit ranges after an
    /// add) pick the 0x06/0x60 corrections. N is preserved, H cleared.
    pub(super) fn alu_daa(&mut self) {
        let mut a = self.regs.a;
        let mut adjust = 0u8;
        if self.flag(Flags::C) {
            adjust |= 0x60;
        }
        if self.flag(Flags::H) {
            adjust |= 0x06;
        }

        if self.flag(Flags::N) {
            a = a.wrapping_sub(adjust);
        } else {
            if (a & 0x0F) > 0x09 {
                adjust |= 0x06;
            }
            if a > 0x99 {
                adjust |= 0x60;
            }
            a = a.wrapping_add(adjust);
        }

        self.set_flag(Flags::C, adjust >= 0x60);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::Z, a == 0);
        self.regs.a = a;
    }

    /// INC r / INC (HL). C is untouched.
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, (value & 0x0F) == 0x0F);
        result
    }

    /// DEC r / DEC (HL). C is untouched.
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, (value & 0x0F) == 0);
        result
    }

    /// ADD HL,rr: half-carry out of bit 11, carry out of bit 15, Z kept.
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.set_flag(Flags::C, hl as u32 + value as u32 > 0xFFFF);
        self.regs.set_hl(hl.wrapping_add(value));
    }

    /// SP plus a signed byte, shared by ADD SP,r8 and LD HL,SP+r8.
    ///
    /// H and C come from the unsigned low-byte sum; Z and N are cleared.
    pub(super) fn alu_add_sp_signed(&mut self, offset: i8) -> u16 {
        let sp = self.regs.sp;
        let raw = offset as u8 as u16;
        self.regs.f = Flags::empty();
        self.set_flag(Flags::H, (sp & 0x000F) + (raw & 0x000F) > 0x000F);
        self.set_flag(Flags::C, (sp & 0x00FF) + (raw & 0x00FF) > 0x00FF);
        sp.wrapping_add(offset as i16 as u16)
    }

    /// Rotate/shift one byte, setting Z from the result and C from the
    /// bit shifted out. N and H are cleared.
    pub(super) fn alu_shift(&mut self, op: ShiftOp, value: u8) -> u8 {
        let carry_in = self.flag(Flags::C);
        let (result, carry) = match op {
            ShiftOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            ShiftOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            ShiftOp::Rl => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
            ShiftOp::Rr => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
            ShiftOp::Sla => (value << 1, value & 0x80 != 0),
            ShiftOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            ShiftOp::Swap => (value.rotate_left(4), false),
            ShiftOp::Srl => (value >> 1, value & 0x01 != 0),
        };
        self.regs.f = Flags::empty();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::C, carry);
        result
    }

    /// BIT b: Z is the inverse of the tested bit, H set, C kept.
    pub(super) fn alu_bit(&mut self, bit: u8, value: u8) {
        self.set_flag(Flags::Z, value & (1 << bit) == 0);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, true);
    }
}

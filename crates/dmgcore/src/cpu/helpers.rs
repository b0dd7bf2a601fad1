use crate::error::MemoryError;

use super::table::{Cond, R16, R8, StackPair};
use super::{Bus, Cpu, Flags};

impl Cpu {
    pub(super) fn read_r8<B: Bus>(&mut self, bus: &mut B, reg: R8) -> Result<u8, MemoryError> {
        Ok(match reg {
            R8::B => self.regs.b,
            R8::C => self.regs.c,
            R8::D => self.regs.d,
            R8::E => self.regs.e,
            R8::H => self.regs.h,
            R8::L => self.regs.l,
            R8::MemHl => bus.read8(self.regs.hl())?,
            R8::A => self.regs.a,
        })
    }

    pub(super) fn write_r8<B: Bus>(
        &mut self,
        bus: &mut B,
        reg: R8,
        value: u8,
    ) -> Result<(), MemoryError> {
        match reg {
            R8::B => self.regs.b = value,
            R8::C => self.regs.c = value,
            R8::D => self.regs.d = value,
            R8::E => self.regs.e = value,
            R8::H => self.regs.h = value,
            R8::L => self.regs.l = value,
            R8::MemHl => bus.write8(self.regs.hl(), value)?,
            R8::A => self.regs.a = value,
        }
        Ok(())
    }

    pub(super) fn read_r16(&self, reg: R16) -> u16 {
        match reg {
            R16::Bc => self.regs.bc(),
            R16::De => self.regs.de(),
            R16::Hl => self.regs.hl(),
            R16::Sp => self.regs.sp,
        }
    }

    pub(super) fn write_r16(&mut self, reg: R16, value: u16) {
        match reg {
            R16::Bc => self.regs.set_bc(value),
            R16::De => self.regs.set_de(value),
            R16::Hl => self.regs.set_hl(value),
            R16::Sp => self.regs.sp = value,
        }
    }

    pub(super) fn read_pair(&self, pair: StackPair) -> u16 {
        match pair {
            StackPair::Bc => self.regs.bc(),
            StackPair::De => self.regs.de(),
            StackPair::Hl => self.regs.hl(),
            StackPair::Af => self.regs.af(),
        }
    }

    pub(super) fn write_pair(&mut self, pair: StackPair, value: u16) {
        match pair {
            StackPair::Bc => self.regs.set_bc(value),
            StackPair::De => self.regs.set_de(value),
            StackPair::Hl => self.regs.set_hl(value),
            StackPair::Af => self.regs.set_af(value),
        }
    }

    pub(super) fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::Nz => !self.flag(Flags::Z),
            Cond::Z => self.flag(Flags::Z),
            Cond::Nc => !self.flag(Flags::C),
            Cond::C => self.flag(Flags::C),
        }
    }

    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> Result<u8, MemoryError> {
        let value = bus.read8(self.regs.pc)?;
        if self.halt_bug {
            // The byte after HALT is read twice.
            self.halt_bug = false;
        } else {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
        Ok(value)
    }

    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> Result<u16, MemoryError> {
        let lo = self.fetch8(bus)?;
        let hi = self.fetch8(bus)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Push with the high byte landing at the higher address.
    pub(super) fn push16<B: Bus>(&mut self, bus: &mut B, value: u16) -> Result<(), MemoryError> {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo)
    }

    pub(super) fn pop16<B: Bus>(&mut self, bus: &mut B) -> Result<u16, MemoryError> {
        let lo = bus.read8(self.regs.sp)?;
        let hi = bus.read8(self.regs.sp.wrapping_add(1))?;
        self.regs.sp = self.regs.sp.wrapping_add(2);
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

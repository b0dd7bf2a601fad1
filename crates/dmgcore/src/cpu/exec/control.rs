use crate::error::MemoryError;

use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// JR / JR cc. The displacement is relative to the address after the
    /// operand, which is where PC already points.
    pub(super) fn jr(&mut self, offset: i8, taken: bool) -> u32 {
        if taken {
            self.regs.pc = self.regs.pc.wrapping_add(offset as i16 as u16);
            12
        } else {
            8
        }
    }

    pub(super) fn jp(&mut self, addr: u16, taken: bool) -> u32 {
        if taken {
            self.regs.pc = addr;
            16
        } else {
            12
        }
    }

    pub(super) fn call<B: Bus>(&mut self, bus: &mut B, addr: u16, taken: bool) -> Result<u32, MemoryError> {
        if !taken {
            return Ok(12);
        }
        self.push16(bus, self.regs.pc)?;
        self.regs.pc = addr;
        Ok(24)
    }

    pub(super) fn ret<B: Bus>(&mut self, bus: &mut B, taken: bool) -> Result<u32, MemoryError> {
        if !taken {
            return Ok(8);
        }
        self.regs.pc = self.pop16(bus)?;
        Ok(20)
    }
}

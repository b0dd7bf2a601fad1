use crate::error::Error;

use super::{Bus, Cpu};

/// Cycles charged for one idle slice in HALT or STOP.
const IDLE_CYCLES: u32 = 4;

impl Cpu {
    /// Advance the CPU by one scheduling quantum and return its T-cycles.
    ///
    /// In order: service a pending enabled interrupt (20 cycles), idle
    /// while stopped until a joypad line goes low, idle while halted,
    /// otherwise execute one instruction.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Error> {
        if let Some(err) = self.locked {
            return Err(err.into());
        }

        if self.regs.stopped {
            let p1 = bus.read8(0xFF00)?;
            if p1 & 0x0F == 0x0F {
                return Ok(IDLE_CYCLES);
            }
            self.regs.stopped = false;
        }

        if let Some(cycles) = self.service_interrupt(bus)? {
            return Ok(cycles);
        }

        if self.regs.halted {
            return Ok(IDLE_CYCLES);
        }

        self.execute(bus)
    }
}

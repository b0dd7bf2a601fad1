use crate::diagnostics::Event;
use crate::error::MemoryError;
use crate::interrupts::{self, IE_ADDR, IF_ADDR};

use super::{Bus, Cpu};

impl Cpu {
    /// Divert to an interrupt vector if IME is set and a line is pending.
    ///
    /// A pending line also ends HALT when IME is clear, without being
    /// serviced. Returns the cycles spent when an interrupt was taken.
    pub(super) fn service_interrupt<B: Bus>(&mut self, bus: &mut B) -> Result<Option<u32>, MemoryError> {
        let ie = bus.read8(IE_ADDR)?;
        let iflags = bus.read8(IF_ADDR)?;
        let Some(interrupt) = interrupts::highest_priority(ie, iflags) else {
            return Ok(None);
        };

        self.regs.halted = false;
        if !self.regs.ime {
            return Ok(None);
        }

        self.regs.ime = false;
        self.ime_pending = false;
        self.ime_delay = false;

        let return_pc = self.regs.pc;
        self.push16(bus, return_pc)?;
        bus.write8(IF_ADDR, iflags & !interrupt.bits())?;
        self.regs.pc = interrupt.vector();

        bus.report(&Event::InterruptServiced {
            interrupt,
            return_pc,
        });
        Ok(Some(20))
    }
}

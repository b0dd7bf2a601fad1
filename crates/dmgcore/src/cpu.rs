//! The LR35902 instruction engine.
//!
//! [`Cpu::execute`] runs exactly one instruction through the 512-slot
//! [`table`]; [`Cpu::step`] wraps it with interrupt dispatch and the HALT and
//! STOP low-power states and is what a driving loop normally calls.

mod alu;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod regs;
mod step;
pub mod table;

pub use regs::{Flags, Registers};
pub use table::{Instruction, OperandShape};

use crate::diagnostics::Event;
use crate::error::{DecodeError, MemoryError};

/// Everything the CPU can see of the machine.
///
/// Accesses are fallible so routing bugs surface as errors at the
/// instruction that caused them.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> Result<u8, MemoryError>;
    fn write8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError>;

    /// Little-endian 16-bit read.
    fn read16(&mut self, addr: u16) -> Result<u16, MemoryError> {
        let lo = self.read8(addr)?;
        let hi = self.read8(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Little-endian 16-bit write.
    fn write16(&mut self, addr: u16, value: u16) -> Result<(), MemoryError> {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo)?;
        self.write8(addr.wrapping_add(1), hi)
    }

    /// Drain cycles the CPU spent stalled by bus activity it triggered,
    /// such as an OAM DMA transfer. The engine adds them to the cost of
    /// the instruction that caused them.
    fn take_stall_cycles(&mut self) -> u32 {
        0
    }

    /// Forward a diagnostic event to whatever sink the bus carries.
    fn report(&mut self, _event: &Event) {}
}

/// CPU core: register file plus the latches that live beside it.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    /// EI was executed by the current instruction.
    ime_pending: bool,
    /// EI was executed by the previous instruction; IME turns on after
    /// the current one.
    ime_delay: bool,
    /// HALT was executed with IME clear and an interrupt already pending;
    /// the next opcode fetch does not advance PC.
    halt_bug: bool,
    /// Set once an illegal opcode has been hit. The DMG hangs until
    /// power-off, so every later `execute` repeats the failure.
    locked: Option<DecodeError>,
}

impl Cpu {
    #[inline]
    pub(crate) fn flag(&self, flag: Flags) -> bool {
        self.regs.f.contains(flag)
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: Flags, value: bool) {
        self.regs.f.set(flag, value);
    }

    /// The decode error that locked the CPU, if any.
    pub fn locked(&self) -> Option<DecodeError> {
        self.locked
    }
}

#[cfg(test)]
mod tests;

//! Diagnostic events and the sinks that receive them.
//!
//! The core never reaches for a global logger on its own. Components hand
//! [`Event`]s to the [`DiagnosticSink`] owned by the memory bus; the default
//! [`LogSink`] forwards them to the `log` facade, [`RecordingSink`] keeps
//! them around for inspection.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cpu::Registers;
use crate::error::{DecodeError, MemoryError};
use crate::interrupts::Interrupt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The CPU locked up on an opcode hole. `registers` is the state right
    /// after the opcode bytes were fetched.
    IllegalOpcode {
        error: DecodeError,
        registers: Registers,
    },
    InterruptServiced {
        interrupt: Interrupt,
        return_pc: u16,
    },
    /// A bus access failed and the error is on its way to the caller.
    MemoryFault(MemoryError),
    /// ROM write on a cartridge with no bank controller.
    RomWriteIgnored { addr: u16, value: u8 },
    RomBankSelected { bank: usize },
    OamDma { source: u16 },
    LcdPower { enabled: bool },
    SerialByte(u8),
}

pub trait DiagnosticSink {
    fn record(&mut self, event: &Event);
}

/// Forwards events to the `log` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, event: &Event) {
        match event {
            Event::IllegalOpcode { error, registers } => log::error!(
                "GB CPU locked: {error} (SP=0x{:04X} AF=0x{:04X} BC=0x{:04X} DE=0x{:04X} HL=0x{:04X})",
                registers.sp,
                registers.af(),
                registers.bc(),
                registers.de(),
                registers.hl(),
            ),
            Event::InterruptServiced {
                interrupt,
                return_pc,
            } => log::debug!(
                "GB CPU interrupt {:?}: vector=0x{:04X} return=0x{return_pc:04X}",
                interrupt,
                interrupt.vector(),
            ),
            Event::MemoryFault(err) => log::error!("GB bus fault: {err}"),
            Event::RomWriteIgnored { addr, value } => {
                log::trace!("GB cart: ignored ROM write 0x{value:02X} -> 0x{addr:04X}")
            }
            Event::RomBankSelected { bank } => log::trace!("GB cart: ROM bank {bank} selected"),
            Event::OamDma { source } => log::trace!("GB DMA: OAM copy from 0x{source:04X}"),
            Event::LcdPower { enabled } => log::debug!("GB PPU: LCD enabled={enabled}"),
            Event::SerialByte(byte) => log::trace!("GB serial: 0x{byte:02X}"),
        }
    }
}

/// Drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _event: &Event) {}
}

/// Keeps every event in a shared buffer.
///
/// Clones share the buffer, so a test can hand one clone to the bus and
/// read events back through the other.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<Event>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&mut self, event: &Event) {
        self.events.borrow_mut().push(event.clone());
    }
}

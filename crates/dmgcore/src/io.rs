//! Peripheral register models living in the 0xFF00 I/O window.

mod joypad;
mod serial;
mod sound;
mod timer;

pub use joypad::{Button, Joypad};
pub use serial::Serial;
pub use sound::Sound;
pub use timer::Timer;

use crate::interrupts::Interrupt;

/// A memory-mapped peripheral.
///
/// `read` and `write` see absolute addresses; the bus only forwards the
/// addresses a device owns. Interrupt requests raised by register writes
/// or by the passage of time accumulate in the device until the bus drains
/// them with `take_interrupts`.
pub trait IoDevice {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    fn take_interrupts(&mut self) -> Interrupt {
        Interrupt::empty()
    }
}

//! Cycle-accurate core of the original Game Boy (DMG).
//!
//! The crate is split along the hardware's own seams: the [`cpu`] executes
//! instructions against anything implementing [`cpu::Bus`], the [`bus`]
//! routes the 16-bit address space to the [`cartridge`], the [`ppu`] and the
//! [`io`] peripherals, and [`machine::GameBoy`] ties them together into a
//! driving loop that feeds every subsystem from one clock.

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod diagnostics;
pub mod error;
pub mod interrupts;
pub mod io;
pub mod loader;
pub mod machine;
pub mod ppu;

pub use bus::{MemoryBus, Region};
pub use cartridge::Cartridge;
pub use config::{BootState, CoreConfig};
pub use cpu::{Bus, Cpu, Flags, Registers};
pub use error::{ConfigError, DecodeError, Error, MemoryError, Result};
pub use interrupts::Interrupt;
pub use loader::{LoadError, RomImage};
pub use machine::{FrameEnd, GameBoy};
pub use ppu::{LineContext, LineRenderer, NullRenderer};

/// Visible screen width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Visible screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// T-cycles in one full frame (154 scanlines of 456 cycles).
pub const CYCLES_PER_FRAME: u32 = 70_224;

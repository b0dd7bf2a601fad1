use crate::bus::MemoryBus;
use crate::cartridge::Cartridge;
use crate::config::CoreConfig;
use crate::cpu::{Bus, Cpu};
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::interrupts::{self, IE_ADDR, IF_ADDR};
use crate::io::Button;
use crate::loader::{LoadError, RomImage};
use crate::ppu::LineRenderer;
use crate::CYCLES_PER_FRAME;

/// `LD B,B`, which test ROMs execute as a software breakpoint.
pub const SOFTWARE_BREAKPOINT: u8 = 0x40;

/// Why [`GameBoy::run_frame_until_breakpoint`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEnd {
    Completed,
    /// A software breakpoint was just executed. Registers hold whatever the
    /// ROM left in them for the host to inspect.
    Breakpoint,
}

/// CPU plus bus, driven from a single clock.
///
/// Each [`step`](GameBoy::step) runs one CPU quantum and then advances the
/// timer and PPU by exactly the cycles it took.
pub struct GameBoy {
    pub cpu: Cpu,
    bus: MemoryBus,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, config: &CoreConfig) -> Self {
        Self {
            cpu: Cpu::with_boot_state(config.boot_state),
            bus: MemoryBus::new(cartridge, config),
        }
    }

    pub fn with_sink(cartridge: Cartridge, config: &CoreConfig, sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            cpu: Cpu::with_boot_state(config.boot_state),
            bus: MemoryBus::with_sink(cartridge, config, sink),
        }
    }

    /// Parse a cartridge image and power on.
    pub fn from_rom(bytes: &[u8], config: &CoreConfig) -> std::result::Result<Self, LoadError> {
        let image = RomImage::parse(bytes)?;
        let cartridge = Cartridge::from_image(image)?;
        Ok(Self::new(cartridge, config))
    }

    pub fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MemoryBus {
        &mut self.bus
    }

    /// Run one CPU quantum and let the rest of the machine catch up.
    pub fn step<R: LineRenderer + ?Sized>(&mut self, renderer: &mut R) -> Result<u32> {
        let cycles = self.cpu.step(&mut self.bus)?;
        self.bus.tick(cycles, renderer);
        Ok(cycles)
    }

    /// Run for at least one frame's worth of cycles and return how many
    /// were actually spent.
    pub fn run_frame<R: LineRenderer + ?Sized>(&mut self, renderer: &mut R) -> Result<u32> {
        let mut elapsed = 0;
        while elapsed < CYCLES_PER_FRAME {
            elapsed += self.step(renderer)?;
        }
        Ok(elapsed)
    }

    /// Like [`run_frame`](GameBoy::run_frame), but stop right after a
    /// software breakpoint executes.
    pub fn run_frame_until_breakpoint<R: LineRenderer + ?Sized>(&mut self, renderer: &mut R) -> Result<FrameEnd> {
        let mut elapsed = 0;
        while elapsed < CYCLES_PER_FRAME {
            let at_breakpoint = self.next_opcode()? == Some(SOFTWARE_BREAKPOINT);
            elapsed += self.step(renderer)?;
            if at_breakpoint {
                return Ok(FrameEnd::Breakpoint);
            }
        }
        Ok(FrameEnd::Completed)
    }

    /// Opcode the next `step` will execute, or `None` when it will idle or
    /// divert to an interrupt instead.
    fn next_opcode(&mut self) -> Result<Option<u8>> {
        let regs = &self.cpu.regs;
        if regs.halted || regs.stopped || self.cpu.locked().is_some() {
            return Ok(None);
        }
        if regs.ime {
            let ie = self.bus.read8(IE_ADDR)?;
            let iflags = self.bus.read8(IF_ADDR)?;
            if interrupts::highest_priority(ie, iflags).is_some() {
                return Ok(None);
            }
        }
        let pc = self.cpu.regs.pc;
        Ok(Some(self.bus.read8(pc)?))
    }

    pub fn run_frames<R: LineRenderer + ?Sized>(&mut self, frames: u32, renderer: &mut R) -> Result<u64> {
        let mut elapsed = 0u64;
        for _ in 0..frames {
            elapsed += self.run_frame(renderer)? as u64;
        }
        Ok(elapsed)
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.bus.set_button(button, pressed);
    }

    /// Everything written to the serial port so far.
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial().output()
    }
}

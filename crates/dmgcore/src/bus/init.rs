use crate::cartridge::Cartridge;
use crate::config::{BootState, CoreConfig};
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::io::{Joypad, Serial, Sound, Timer};
use crate::ppu::Ppu;

use super::{MemoryBus, HRAM_SIZE, WRAM_SIZE};

impl MemoryBus {
    /// Bus over `cartridge`, reporting through the `log` crate.
    pub fn new(cartridge: Cartridge, config: &CoreConfig) -> Self {
        Self::with_sink(cartridge, config, Box::new(LogSink))
    }

    pub fn with_sink(cartridge: Cartridge, config: &CoreConfig, sink: Box<dyn DiagnosticSink>) -> Self {
        let mut bus = Self {
            cartridge,
            wram: Box::new([0; WRAM_SIZE]),
            hram: [0; HRAM_SIZE],
            ppu: Ppu::default(),
            joypad: Joypad::default(),
            serial: Serial::new(config.capture_serial),
            timer: Timer::default(),
            sound: Sound::default(),
            if_reg: 0,
            ie_reg: 0,
            boot_rom_disable: 0,
            dma_reg: 0,
            stall_cycles: 0,
            strict_rom_writes: config.strict_rom_writes,
            sink,
        };
        if config.boot_state == BootState::PostBoot {
            bus.apply_post_boot_io();
        }
        bus
    }

    /// I/O state the DMG boot ROM leaves behind on its way out.
    fn apply_post_boot_io(&mut self) {
        self.ppu = Ppu::post_boot();
        self.timer = Timer::post_boot();
        self.sound = Sound::post_boot();
        self.serial.set_control(0x00, 0x7E);
        self.if_reg = 0x01;
        self.ie_reg = 0x00;
        self.boot_rom_disable = 0x01;
        self.dma_reg = 0xFF;
    }
}

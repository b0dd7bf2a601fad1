//! The DMG memory bus.
//!
//! Every 16-bit address belongs to exactly one [`Region`], and every region
//! to exactly one owned subsystem. The bus also owns the diagnostics sink,
//! so the CPU reports through it via [`Bus::report`](crate::cpu::Bus::report).

mod dma;
mod init;
mod mmio;

use std::ops::RangeInclusive;

use crate::cartridge::Cartridge;
use crate::diagnostics::{DiagnosticSink, Event};
use crate::interrupts::Interrupt;
use crate::io::{Button, IoDevice, Joypad, Serial, Sound, Timer};
use crate::ppu::{LineRenderer, Ppu};

pub const WRAM_SIZE: usize = 0x2000;
pub const HRAM_SIZE: usize = 0x7F;

/// Memory map of the DMG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    RomBank0,
    RomBankN,
    Vram,
    ExternalRam,
    WorkRam0,
    WorkRamN,
    Echo,
    Oam,
    Unusable,
    Io,
    HighRam,
    InterruptEnable,
}

impl Region {
    /// Every region in address order.
    pub const ALL: [Region; 12] = [
        Region::RomBank0,
        Region::RomBankN,
        Region::Vram,
        Region::ExternalRam,
        Region::WorkRam0,
        Region::WorkRamN,
        Region::Echo,
        Region::Oam,
        Region::Unusable,
        Region::Io,
        Region::HighRam,
        Region::InterruptEnable,
    ];

    pub const fn of(addr: u16) -> Region {
        match addr {
            0x0000..=0x3FFF => Region::RomBank0,
            0x4000..=0x7FFF => Region::RomBankN,
            0x8000..=0x9FFF => Region::Vram,
            0xA000..=0xBFFF => Region::ExternalRam,
            0xC000..=0xCFFF => Region::WorkRam0,
            0xD000..=0xDFFF => Region::WorkRamN,
            0xE000..=0xFDFF => Region::Echo,
            0xFE00..=0xFE9F => Region::Oam,
            0xFEA0..=0xFEFF => Region::Unusable,
            0xFF00..=0xFF7F => Region::Io,
            0xFF80..=0xFFFE => Region::HighRam,
            0xFFFF => Region::InterruptEnable,
        }
    }

    pub const fn range(self) -> RangeInclusive<u16> {
        match self {
            Region::RomBank0 => 0x0000..=0x3FFF,
            Region::RomBankN => 0x4000..=0x7FFF,
            Region::Vram => 0x8000..=0x9FFF,
            Region::ExternalRam => 0xA000..=0xBFFF,
            Region::WorkRam0 => 0xC000..=0xCFFF,
            Region::WorkRamN => 0xD000..=0xDFFF,
            Region::Echo => 0xE000..=0xFDFF,
            Region::Oam => 0xFE00..=0xFE9F,
            Region::Unusable => 0xFEA0..=0xFEFF,
            Region::Io => 0xFF00..=0xFF7F,
            Region::HighRam => 0xFF80..=0xFFFE,
            Region::InterruptEnable => 0xFFFF..=0xFFFF,
        }
    }
}

pub struct MemoryBus {
    cartridge: Cartridge,
    wram: Box<[u8; WRAM_SIZE]>,
    hram: [u8; HRAM_SIZE],
    ppu: Ppu,
    joypad: Joypad,
    serial: Serial,
    timer: Timer,
    sound: Sound,
    /// IF bits 0-4.
    if_reg: u8,
    ie_reg: u8,
    boot_rom_disable: u8,
    /// Last value written to the OAM DMA trigger.
    dma_reg: u8,
    /// Cycles the CPU is stalled by DMA it started, not yet collected.
    stall_cycles: u32,
    strict_rom_writes: bool,
    sink: Box<dyn DiagnosticSink>,
}

impl MemoryBus {
    /// Advance the timer and PPU by `cycles` T-cycles and latch whatever
    /// interrupts they raised.
    pub fn tick<R: LineRenderer + ?Sized>(&mut self, cycles: u32, renderer: &mut R) {
        self.timer.tick(cycles);
        self.ppu.tick(cycles, renderer);
        self.collect_interrupts();
    }

    /// Move interrupt requests raised by the peripherals into IF.
    fn collect_interrupts(&mut self) {
        let raised = self.timer.take_interrupts()
            | self.ppu.take_interrupts()
            | self.serial.take_interrupts()
            | self.joypad.take_interrupts();
        self.if_reg |= raised.bits();

        if raised.contains(Interrupt::SERIAL) {
            if let Some(byte) = self.serial.take_sent() {
                self.sink.record(&Event::SerialByte(byte));
            }
        }
    }

    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.if_reg |= interrupt.bits();
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.joypad.set_button(button, pressed);
        self.collect_interrupts();
    }

    pub fn replace_sink(&mut self, sink: Box<dyn DiagnosticSink>) -> Box<dyn DiagnosticSink> {
        std::mem::replace(&mut self.sink, sink)
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn serial(&self) -> &Serial {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut Serial {
        &mut self.serial
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn sound(&self) -> &Sound {
        &self.sound
    }

    pub fn boot_rom_disabled(&self) -> bool {
        self.boot_rom_disable != 0
    }
}

#[cfg(test)]
mod tests;

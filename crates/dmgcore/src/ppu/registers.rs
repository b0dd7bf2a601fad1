use crate::interrupts::Interrupt;
use crate::io::IoDevice;

use super::{stat, Ppu};

/// LCD registers 0xFF40-0xFF4B. The DMA trigger at 0xFF46 belongs to the
/// bus and never reaches the PPU.
impl IoDevice for Ppu {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF40 => self.lcdc,
            0xFF41 => self.stat_value(),
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF40 => self.set_lcdc(value),
            0xFF41 => self.stat = value & stat::ENABLES,
            0xFF42 => self.scy = value,
            0xFF43 => self.scx = value,
            // LY is read-only.
            0xFF44 => {}
            0xFF45 => {
                self.lyc = value;
                if self.lcd_enabled() {
                    self.compare_line();
                }
            }
            0xFF47 => self.bgp = value,
            0xFF48 => self.obp0 = value,
            0xFF49 => self.obp1 = value,
            0xFF4A => self.wy = value,
            0xFF4B => self.wx = value,
            _ => {}
        }
    }

    fn take_interrupts(&mut self) -> Interrupt {
        std::mem::take(&mut self.requested)
    }
}

use crate::cpu::Bus;
use crate::diagnostics::Event;
use crate::error::MemoryError;
use crate::interrupts::IF_ADDR;
use crate::io::IoDevice;

use super::{MemoryBus, Region};

const DMA_ADDR: u16 = 0xFF46;
const BOOT_ROM_DISABLE: u16 = 0xFF50;
const LCDC_ADDR: u16 = 0xFF40;

impl MemoryBus {
    fn read_region(&mut self, addr: u16) -> Result<u8, MemoryError> {
        let value = match Region::of(addr) {
            Region::RomBank0 | Region::RomBankN => self.cartridge.read_rom(addr)?,
            Region::Vram => self.ppu.read_vram(addr),
            Region::ExternalRam => self.cartridge.read_ram(addr)?,
            Region::WorkRam0 | Region::WorkRamN => self.wram[(addr - 0xC000) as usize],
            Region::Echo => self.wram[(addr - 0xE000) as usize],
            Region::Oam => self.ppu.read_oam(addr),
            Region::Unusable => 0xFF,
            Region::Io => self.read_io(addr)?,
            Region::HighRam => self.hram[(addr - 0xFF80) as usize],
            Region::InterruptEnable => self.ie_reg,
        };
        Ok(value)
    }

    fn write_region(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        match Region::of(addr) {
            Region::RomBank0 | Region::RomBankN => self.write_rom(addr, value)?,
            Region::Vram => self.ppu.write_vram(addr, value),
            Region::ExternalRam => self.cartridge.write_ram(addr, value)?,
            Region::WorkRam0 | Region::WorkRamN => self.wram[(addr - 0xC000) as usize] = value,
            Region::Echo => self.wram[(addr - 0xE000) as usize] = value,
            Region::Oam => self.ppu.write_oam(addr, value),
            Region::Unusable => return Err(MemoryError::Unusable { addr, value }),
            Region::Io => self.write_io(addr, value)?,
            Region::HighRam => self.hram[(addr - 0xFF80) as usize] = value,
            Region::InterruptEnable => self.ie_reg = value,
        }
        Ok(())
    }

    fn write_rom(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        if self.cartridge.write_control(addr, value) {
            if let 0x2000..=0x3FFF = addr {
                let bank = self.cartridge.selected_rom_bank();
                self.sink.record(&Event::RomBankSelected { bank });
            }
            return Ok(());
        }
        if self.strict_rom_writes {
            return Err(MemoryError::ReadOnly { addr, value });
        }
        self.sink.record(&Event::RomWriteIgnored { addr, value });
        Ok(())
    }

    fn read_io(&mut self, addr: u16) -> Result<u8, MemoryError> {
        let value = match addr {
            0xFF00 => self.joypad.read(addr),
            0xFF01..=0xFF02 => self.serial.read(addr),
            0xFF04..=0xFF07 => self.timer.read(addr),
            IF_ADDR => self.if_reg | 0xE0,
            0xFF10..=0xFF3F => self.sound.read(addr),
            DMA_ADDR => self.dma_reg,
            0xFF40..=0xFF4B => self.ppu.read(addr),
            BOOT_ROM_DISABLE => self.boot_rom_disable,
            0xFF51..=0xFF55 => return Err(MemoryError::VramDmaRead { addr }),
            _ => 0xFF,
        };
        Ok(value)
    }

    fn write_io(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        match addr {
            0xFF00 => self.joypad.write(addr, value),
            0xFF01..=0xFF02 => self.serial.write(addr, value),
            0xFF04..=0xFF07 => self.timer.write(addr, value),
            IF_ADDR => self.if_reg = value & 0x1F,
            0xFF10..=0xFF3F => self.sound.write(addr, value),
            DMA_ADDR => self.oam_dma(value)?,
            LCDC_ADDR => {
                let was_on = self.ppu.lcd_enabled();
                self.ppu.write(addr, value);
                let enabled = self.ppu.lcd_enabled();
                if was_on != enabled {
                    self.sink.record(&Event::LcdPower { enabled });
                }
            }
            0xFF41..=0xFF4B => self.ppu.write(addr, value),
            BOOT_ROM_DISABLE => self.boot_rom_disable = value,
            // VRAM DMA does not exist on DMG.
            0xFF51..=0xFF55 => {}
            _ => {}
        }
        self.collect_interrupts();
        Ok(())
    }
}

impl Bus for MemoryBus {
    fn read8(&mut self, addr: u16) -> Result<u8, MemoryError> {
        self.read_region(addr)
            .inspect_err(|err| self.sink.record(&Event::MemoryFault(*err)))
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        self.write_region(addr, value)
            .inspect_err(|err| self.sink.record(&Event::MemoryFault(*err)))
    }

    fn take_stall_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.stall_cycles)
    }

    fn report(&mut self, event: &Event) {
        self.sink.record(event);
    }
}

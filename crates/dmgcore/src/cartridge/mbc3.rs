/// MBC3 bank registers.
///
/// The real-time clock is not modelled: selecting one of its registers
/// (0x08-0x0C) maps open bus into 0xA000-0xBFFF, and latch writes are
/// accepted and dropped.
#[derive(Clone, Debug)]
pub(super) struct Mbc3 {
    ram_enabled: bool,
    rom_bank: u8,
    ram_select: u8,
}

impl Default for Mbc3 {
    fn default() -> Self {
        Self {
            ram_enabled: false,
            rom_bank: 1,
            ram_select: 0,
        }
    }
}

impl Mbc3 {
    pub(super) fn rom_bank(&self, window: usize) -> usize {
        match window {
            0 => 0,
            _ => self.rom_bank as usize,
        }
    }

    pub(super) fn ram_bank(&self) -> Option<usize> {
        match self.ram_select {
            0x00..=0x03 if self.ram_enabled => Some(self.ram_select as usize),
            _ => None,
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.rom_bank = (value & 0x7F).max(1),
            0x4000..=0x5FFF => self.ram_select = value & 0x0F,
            _ => {}
        }
    }
}

/// MBC5 bank registers: a 9-bit ROM bank where bank 0 is selectable, and a
/// 4-bit RAM bank. On rumble carts bit 3 of the RAM bank drives the motor.
#[derive(Clone, Debug)]
pub(super) struct Mbc5 {
    ram_enabled: bool,
    rom_bank: u16,
    ram_bank: u8,
    rumble: bool,
}

impl Mbc5 {
    pub(super) fn new(rumble: bool) -> Self {
        Self {
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
            rumble,
        }
    }

    pub(super) fn rom_bank(&self, window: usize) -> usize {
        match window {
            0 => 0,
            _ => self.rom_bank as usize,
        }
    }

    pub(super) fn ram_bank(&self) -> Option<usize> {
        self.ram_enabled.then_some(self.ram_bank as usize)
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value == 0x0A,
            0x2000..=0x2FFF => self.rom_bank = (self.rom_bank & 0x100) | value as u16,
            0x3000..=0x3FFF => self.rom_bank = (self.rom_bank & 0xFF) | ((value as u16 & 0x01) << 8),
            0x4000..=0x5FFF => {
                let mask = if self.rumble { 0x07 } else { 0x0F };
                self.ram_bank = value & mask;
            }
            _ => {}
        }
    }
}

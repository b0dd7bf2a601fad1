/// MBC1 bank registers.
///
/// A 5-bit low register selects the switchable ROM bank (0 reads as 1), a
/// 2-bit high register supplies ROM bank bits 5-6 or the RAM bank, and the
/// mode bit decides whether those high bits also apply to the 0x0000 window
/// and to external RAM.
#[derive(Clone, Debug)]
pub(super) struct Mbc1 {
    ram_enabled: bool,
    bank_low: u8,
    bank_high: u8,
    advanced: bool,
}

impl Default for Mbc1 {
    fn default() -> Self {
        Self {
            ram_enabled: false,
            bank_low: 1,
            bank_high: 0,
            advanced: false,
        }
    }
}

impl Mbc1 {
    /// Unmasked bank backing ROM window 0 (0x0000) or 1 (0x4000).
    pub(super) fn rom_bank(&self, window: usize) -> usize {
        let high = (self.bank_high as usize) << 5;
        match window {
            0 if self.advanced => high,
            0 => 0,
            _ => high | self.bank_low as usize,
        }
    }

    pub(super) fn ram_bank(&self) -> Option<usize> {
        if !self.ram_enabled {
            return None;
        }
        Some(if self.advanced { self.bank_high as usize } else { 0 })
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.bank_low = (value & 0x1F).max(1),
            0x4000..=0x5FFF => self.bank_high = value & 0x03,
            _ => self.advanced = value & 0x01 != 0,
        }
    }
}

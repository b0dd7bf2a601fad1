use std::fmt;

use crate::error::ConfigError;

use super::RomBank;

pub const TITLE: usize = 0x134;
pub const TITLE_LEN: usize = 16;
pub const CGB_FLAG: usize = 0x143;
pub const CARTRIDGE_TYPE: usize = 0x147;
pub const ROM_SIZE: usize = 0x148;
pub const RAM_SIZE: usize = 0x149;
pub const DESTINATION: usize = 0x14A;
pub const HEADER_CHECKSUM: usize = 0x14D;
/// First byte past the header.
pub const HEADER_END: usize = 0x150;

/// Bank controller fitted to a cartridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Controller {
    None,
    Mbc1,
    Mbc2,
    Mmm01,
    Mbc3,
    Mbc4,
    Mbc5,
}

/// Decoded cartridge-type byte (0x147).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartridgeType {
    pub code: u8,
    pub controller: Controller,
    pub ram: bool,
    pub battery: bool,
    pub rtc: bool,
    pub rumble: bool,
}

impl CartridgeType {
    pub const ROM_ONLY: CartridgeType = CartridgeType::new(0x00, Controller::None);

    const fn new(code: u8, controller: Controller) -> Self {
        Self {
            code,
            controller,
            ram: false,
            battery: false,
            rtc: false,
            rumble: false,
        }
    }

    const fn ram(mut self) -> Self {
        self.ram = true;
        self
    }

    const fn battery(mut self) -> Self {
        self.battery = true;
        self
    }

    const fn rtc(mut self) -> Self {
        self.rtc = true;
        self
    }

    const fn rumble(mut self) -> Self {
        self.rumble = true;
        self
    }

    pub fn from_code(code: u8) -> Result<Self, ConfigError> {
        use Controller::*;

        let kind = match code {
            0x00 => Self::new(code, None),
            0x01 => Self::new(code, Mbc1),
            0x02 => Self::new(code, Mbc1).ram(),
            0x03 => Self::new(code, Mbc1).ram().battery(),
            0x05 => Self::new(code, Mbc2),
            0x06 => Self::new(code, Mbc2).battery(),
            0x08 => Self::new(code, None).ram(),
            0x09 => Self::new(code, None).ram().battery(),
            0x0B => Self::new(code, Mmm01),
            0x0C => Self::new(code, Mmm01).ram(),
            0x0D => Self::new(code, Mmm01).ram().battery(),
            0x0F => Self::new(code, Mbc3).rtc().battery(),
            0x10 => Self::new(code, Mbc3).rtc().ram().battery(),
            0x11 => Self::new(code, Mbc3),
            0x12 => Self::new(code, Mbc3).ram(),
            0x13 => Self::new(code, Mbc3).ram().battery(),
            0x15 => Self::new(code, Mbc4),
            0x16 => Self::new(code, Mbc4).ram(),
            0x17 => Self::new(code, Mbc4).ram().battery(),
            0x19 => Self::new(code, Mbc5),
            0x1A => Self::new(code, Mbc5).ram(),
            0x1B => Self::new(code, Mbc5).ram().battery(),
            0x1C => Self::new(code, Mbc5).rumble(),
            0x1D => Self::new(code, Mbc5).rumble().ram(),
            0x1E => Self::new(code, Mbc5).rumble().ram().battery(),
            other => return Err(ConfigError::UnknownCartridgeType(other)),
        };
        Ok(kind)
    }
}

/// ROM size code (0x148) to a count of 16 KiB banks.
pub fn rom_banks(code: u8) -> Result<usize, ConfigError> {
    match code {
        0x00..=0x08 => Ok(2 << code),
        0x52 => Ok(72),
        0x53 => Ok(80),
        0x54 => Ok(96),
        other => Err(ConfigError::UnknownRomSize(other)),
    }
}

/// RAM size code (0x149) to a count of 8 KiB banks. A 2 KiB chip still
/// occupies one bank.
pub fn ram_banks(code: u8) -> Result<usize, ConfigError> {
    match code {
        0x00 => Ok(0),
        0x01 | 0x02 => Ok(1),
        0x03 => Ok(4),
        0x04 => Ok(16),
        0x05 => Ok(8),
        other => Err(ConfigError::UnknownRamSize(other)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Japan,
    Overseas,
}

/// The header stored in bank 0 at 0x0134-0x014F.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub cgb_flag: u8,
    pub cartridge_type: CartridgeType,
    pub rom_banks: usize,
    pub ram_banks: usize,
    pub destination: Destination,
    pub checksum: u8,
    /// Checksum computed over 0x0134-0x014C.
    pub computed_checksum: u8,
}

impl Header {
    pub fn parse(bank0: &RomBank) -> Result<Self, ConfigError> {
        let bytes = bank0.as_slice();
        let title_bytes = &bytes[TITLE..TITLE + TITLE_LEN];
        let title_len = title_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TITLE_LEN);
        let title = String::from_utf8_lossy(&title_bytes[..title_len])
            .trim_end()
            .to_string();

        Ok(Self {
            title,
            cgb_flag: bytes[CGB_FLAG],
            cartridge_type: CartridgeType::from_code(bytes[CARTRIDGE_TYPE])?,
            rom_banks: rom_banks(bytes[ROM_SIZE])?,
            ram_banks: ram_banks(bytes[RAM_SIZE])?,
            destination: if bytes[DESTINATION] == 0x00 {
                Destination::Japan
            } else {
                Destination::Overseas
            },
            checksum: bytes[HEADER_CHECKSUM],
            computed_checksum: checksum(bytes),
        })
    }

    pub fn checksum_valid(&self) -> bool {
        self.checksum == self.computed_checksum
    }
}

/// Header checksum as the boot ROM verifies it.
pub fn checksum(bank0: &[u8]) -> u8 {
    bank0[TITLE..HEADER_CHECKSUM]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" type=0x{:02X} ({:?}) rom={}x16K ram={}x8K",
            self.title,
            self.cartridge_type.code,
            self.cartridge_type.controller,
            self.rom_banks,
            self.ram_banks,
        )
    }
}

//! Cartridge storage and bank controllers.
//!
//! A [`Cartridge`] owns its ROM and RAM banks. Every access goes through the
//! same two steps: the controller picks a bank for the address window, then
//! the cartridge-relative address is split into (bank, offset) against the
//! fixed bank size. Only the bank pick differs between controller kinds.

mod header;
mod mbc1;
mod mbc3;
mod mbc5;

pub use header::{checksum, CartridgeType, Controller, Destination, Header, HEADER_END};

use std::fmt;

use crate::error::{ConfigError, MemoryError};
use crate::loader::RomImage;

use mbc1::Mbc1;
use mbc3::Mbc3;
use mbc5::Mbc5;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;

/// Fixed-size bank of cartridge memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Bank<const N: usize>(Box<[u8; N]>);

pub type RomBank = Bank<ROM_BANK_SIZE>;
pub type RamBank = Bank<RAM_BANK_SIZE>;

impl<const N: usize> Bank<N> {
    pub fn filled(value: u8) -> Self {
        Self(Box::new([value; N]))
    }

    /// Copy `bytes` into a new bank, padding with 0xFF when short.
    /// Anything past `N` bytes is dropped.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut bank = Self::filled(0xFF);
        let len = bytes.len().min(N);
        bank.0[..len].copy_from_slice(&bytes[..len]);
        bank
    }

    #[inline]
    pub fn read(&self, offset: usize) -> u8 {
        self.0[offset % N]
    }

    #[inline]
    pub fn write(&mut self, offset: usize, value: u8) {
        self.0[offset % N] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0[..]
    }
}

impl<const N: usize> fmt::Debug for Bank<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bank<{N:#X}>")
    }
}

/// Bank-select state of the fitted controller.
#[derive(Clone, Debug)]
enum Mapper {
    None,
    Mbc1(Mbc1),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Mapper {
    /// Unmasked ROM bank backing window 0 (0x0000-0x3FFF) or 1
    /// (0x4000-0x7FFF).
    fn rom_bank(&self, window: usize) -> usize {
        match self {
            Mapper::None => window,
            Mapper::Mbc1(m) => m.rom_bank(window),
            Mapper::Mbc3(m) => m.rom_bank(window),
            Mapper::Mbc5(m) => m.rom_bank(window),
        }
    }

    /// Unmasked RAM bank, or `None` while external RAM is disabled or
    /// unmapped.
    fn ram_bank(&self) -> Option<usize> {
        match self {
            Mapper::None => Some(0),
            Mapper::Mbc1(m) => m.ram_bank(),
            Mapper::Mbc3(m) => m.ram_bank(),
            Mapper::Mbc5(m) => m.ram_bank(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Cartridge {
    kind: CartridgeType,
    rom: Vec<RomBank>,
    ram: Vec<RamBank>,
    mapper: Mapper,
}

impl Cartridge {
    /// Build a cartridge from its ROM banks, the number of 8 KiB RAM banks
    /// to allocate and the decoded cartridge type.
    pub fn new(rom: Vec<RomBank>, ram_banks: usize, kind: CartridgeType) -> Result<Self, ConfigError> {
        if rom.len() < 2 {
            return Err(ConfigError::RomBankCount(rom.len()));
        }

        let mapper = match kind.controller {
            Controller::None => {
                if ram_banks > 1 {
                    return Err(ConfigError::TooManyRamBanks(ram_banks));
                }
                if ram_banks > 0 && !kind.ram {
                    return Err(ConfigError::UnexpectedRam(ram_banks));
                }
                Mapper::None
            }
            Controller::Mbc1 => Mapper::Mbc1(Mbc1::default()),
            Controller::Mbc3 => Mapper::Mbc3(Mbc3::default()),
            Controller::Mbc5 => Mapper::Mbc5(Mbc5::new(kind.rumble)),
            other @ (Controller::Mbc2 | Controller::Mmm01 | Controller::Mbc4) => {
                return Err(ConfigError::UnsupportedController(other));
            }
        };

        log::debug!(
            "GB cart: {:?} rom_banks={} ram_banks={ram_banks}",
            kind.controller,
            rom.len()
        );

        Ok(Self {
            kind,
            rom,
            ram: (0..ram_banks).map(|_| RamBank::filled(0xFF)).collect(),
            mapper,
        })
    }

    /// A 32 KiB cartridge with no controller and no RAM.
    pub fn rom_only(bank0: RomBank, bank1: RomBank) -> Self {
        Self {
            kind: CartridgeType::ROM_ONLY,
            rom: vec![bank0, bank1],
            ram: Vec::new(),
            mapper: Mapper::None,
        }
    }

    pub fn from_image(image: RomImage) -> Result<Self, ConfigError> {
        let (rom, ram_banks, kind) = image.into_parts();
        Self::new(rom, ram_banks, kind)
    }

    pub fn kind(&self) -> CartridgeType {
        self.kind
    }

    pub fn rom_bank_count(&self) -> usize {
        self.rom.len()
    }

    pub fn ram_bank_count(&self) -> usize {
        self.ram.len()
    }

    /// Resolve a ROM address (0x0000-0x7FFF) to (bank, offset).
    pub fn resolve_rom(&self, addr: u16) -> (usize, usize) {
        let addr = addr as usize & 0x7FFF;
        let bank = self.mapper.rom_bank(addr / ROM_BANK_SIZE) % self.rom.len();
        (bank, addr % ROM_BANK_SIZE)
    }

    /// Resolve an external RAM address (0xA000-0xBFFF) to (bank, offset),
    /// or `None` when nothing is mapped there.
    pub fn resolve_ram(&self, addr: u16) -> Option<(usize, usize)> {
        if self.ram.is_empty() {
            return None;
        }
        let bank = self.mapper.ram_bank()? % self.ram.len();
        Some((bank, (addr as usize).wrapping_sub(0xA000) % RAM_BANK_SIZE))
    }

    /// The bank currently mapped at 0x4000-0x7FFF.
    pub fn selected_rom_bank(&self) -> usize {
        self.resolve_rom(0x4000).0
    }

    pub fn read_rom(&self, addr: u16) -> Result<u8, MemoryError> {
        let (bank, offset) = self.resolve_rom(addr);
        let count = self.rom.len();
        self.rom
            .get(bank)
            .map(|b| b.read(offset))
            .ok_or(MemoryError::BankOutOfRange { bank, count })
    }

    pub fn read_ram(&self, addr: u16) -> Result<u8, MemoryError> {
        let Some((bank, offset)) = self.resolve_ram(addr) else {
            return Ok(0xFF);
        };
        let count = self.ram.len();
        self.ram
            .get(bank)
            .map(|b| b.read(offset))
            .ok_or(MemoryError::BankOutOfRange { bank, count })
    }

    pub fn write_ram(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        let Some((bank, offset)) = self.resolve_ram(addr) else {
            return Ok(());
        };
        let count = self.ram.len();
        let target = self
            .ram
            .get_mut(bank)
            .ok_or(MemoryError::BankOutOfRange { bank, count })?;
        target.write(offset, value);
        Ok(())
    }

    /// Forward a write into the ROM window to the bank controller.
    ///
    /// Returns `false` when there is no controller to take it.
    pub fn write_control(&mut self, addr: u16, value: u8) -> bool {
        match &mut self.mapper {
            Mapper::None => return false,
            Mapper::Mbc1(m) => m.write(addr, value),
            Mapper::Mbc3(m) => m.write(addr, value),
            Mapper::Mbc5(m) => m.write(addr, value),
        }
        true
    }

    pub fn ram_banks(&self) -> &[RamBank] {
        &self.ram
    }
}

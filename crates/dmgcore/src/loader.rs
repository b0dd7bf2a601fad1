//! Cartridge image parsing.
//!
//! Turns a raw image (a concatenation of 16 KiB ROM banks) into the pieces
//! [`Cartridge::new`](crate::Cartridge::new) takes. File access stays with
//! the caller.

use thiserror::Error;

use crate::cartridge::{CartridgeType, Header, RomBank, HEADER_END, ROM_BANK_SIZE};
use crate::error::ConfigError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("image is {0} bytes, too short to hold a cartridge header")]
    TooShort(usize),
    #[error("header declares {declared} ROM banks but the image holds {actual}")]
    Truncated { declared: usize, actual: usize },
    #[error("invalid cartridge header: {0}")]
    Header(#[from] ConfigError),
}

/// A parsed cartridge image.
#[derive(Clone, Debug)]
pub struct RomImage {
    header: Header,
    banks: Vec<RomBank>,
}

impl RomImage {
    pub fn parse(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.len() < HEADER_END {
            return Err(LoadError::TooShort(bytes.len()));
        }

        let header = Header::parse(&RomBank::from_slice(bytes))?;

        if !header.checksum_valid() {
            log::warn!(
                "GB cart: header checksum mismatch (stored 0x{:02X}, computed 0x{:02X})",
                header.checksum,
                header.computed_checksum
            );
        }

        let declared_len = header.rom_banks * ROM_BANK_SIZE;
        if bytes.len() < declared_len {
            return Err(LoadError::Truncated {
                declared: header.rom_banks,
                actual: bytes.len() / ROM_BANK_SIZE,
            });
        }

        let mut banks: Vec<RomBank> = bytes.chunks(ROM_BANK_SIZE).map(RomBank::from_slice).collect();
        if banks.len() > header.rom_banks {
            log::warn!(
                "GB cart: image holds {} banks, header declares {}; extra banks dropped",
                banks.len(),
                header.rom_banks
            );
            banks.truncate(header.rom_banks);
        }

        log::info!("GB cart: {header}");
        Ok(Self { header, banks })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// ROM banks, RAM bank count and cartridge type.
    pub fn into_parts(self) -> (Vec<RomBank>, usize, CartridgeType) {
        (self.banks, self.header.ram_banks, self.header.cartridge_type)
    }
}

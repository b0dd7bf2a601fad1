use thiserror::Error;

use crate::cartridge::Controller;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while decoding the instruction stream.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// One of the hardware-reserved opcode holes. `opcode` is the table
    /// index, so CB-prefixed slots are reported as `0x100 + byte`.
    #[error("illegal opcode 0x{opcode:03X} at PC=0x{pc:04X}")]
    IllegalOpcode { opcode: u16, pc: u16 },
    /// The prefix slot itself was dispatched without its second byte.
    #[error("malformed 0xCB escape at PC=0x{pc:04X}")]
    MalformedPrefix { pc: u16 },
}

/// Bus routing failures. None of these occur against a well-formed guest
/// running on a correct core.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("write of 0x{value:02X} into unusable region at 0x{addr:04X}")]
    Unusable { addr: u16, value: u8 },
    #[error("read from VRAM-DMA register 0x{addr:04X}")]
    VramDmaRead { addr: u16 },
    #[error("write of 0x{value:02X} into read-only ROM at 0x{addr:04X}")]
    ReadOnly { addr: u16, value: u8 },
    #[error("bank {bank} out of range ({count} banks present)")]
    BankOutOfRange { bank: usize, count: usize },
}

/// Cartridge construction failures, raised before any instruction runs.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown cartridge type byte 0x{0:02X}")]
    UnknownCartridgeType(u8),
    #[error("unknown ROM size code 0x{0:02X}")]
    UnknownRomSize(u8),
    #[error("unknown RAM size code 0x{0:02X}")]
    UnknownRamSize(u8),
    #[error("unsupported bank controller {0:?}")]
    UnsupportedController(Controller),
    #[error("cartridge without a bank controller cannot carry {0} RAM banks")]
    TooManyRamBanks(usize),
    #[error("cartridge type declares no external RAM but {0} RAM banks were supplied")]
    UnexpectedRam(usize),
    #[error("cartridge needs at least 2 ROM banks, got {0}")]
    RomBankCount(usize),
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

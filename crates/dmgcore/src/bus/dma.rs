use crate::cpu::Bus;
use crate::diagnostics::Event;
use crate::error::MemoryError;

use super::MemoryBus;

/// Bytes moved by one OAM DMA transfer.
const OAM_DMA_LEN: u16 = 0xA0;
/// CPU stall charged per transfer: 160 M-cycles.
pub(crate) const OAM_DMA_CYCLES: u32 = 640;

impl MemoryBus {
    /// OAM DMA started by a write to 0xFF46.
    ///
    /// The transfer runs to completion inside the triggering write. Sources
    /// in 0xE000-0xFFFF read work RAM 0x2000 lower, so the copy never sees
    /// I/O space and cannot trigger itself.
    pub(super) fn oam_dma(&mut self, value: u8) -> Result<(), MemoryError> {
        self.dma_reg = value;
        let mut source = (value as u16) << 8;
        if source >= 0xE000 {
            source -= 0x2000;
        }
        self.sink.record(&Event::OamDma { source });

        for i in 0..OAM_DMA_LEN {
            let byte = self.read8(source + i)?;
            self.write8(0xFE00 + i, byte)?;
        }
        self.stall_cycles += OAM_DMA_CYCLES;
        Ok(())
    }
}

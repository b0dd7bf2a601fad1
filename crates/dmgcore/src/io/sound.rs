use super::IoDevice;

const BASE: u16 = 0xFF10;
const NR52: u16 = 0xFF26;

/// Bits that always read back as 1, indexed from 0xFF10 to 0xFF2F.
const READ_MASK: [u8; 0x20] = [
    0x80, 0x3F, 0x00, 0xFF, 0xBF, // NR10-NR14
    0xFF, 0x3F, 0x00, 0xFF, 0xBF, // unused, NR21-NR24
    0x7F, 0xFF, 0x9F, 0xFF, 0xBF, // NR30-NR34
    0xFF, 0xFF, 0x00, 0x00, 0xBF, // unused, NR41-NR44
    0x00, 0x00, 0x70, // NR50-NR52
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // unused
];

/// Sound register file and wave RAM, without synthesis.
///
/// Registers hold what the guest wrote and read back through the hardware
/// masks. Clearing the NR52 power bit zeroes 0xFF10-0xFF25 and ignores
/// writes there until power returns. Triggering a channel sets its status
/// bit in NR52.
#[derive(Clone, Debug)]
pub struct Sound {
    regs: [u8; 0x20],
    wave: [u8; 0x10],
    powered: bool,
    /// NR52 bits 0-3.
    active: u8,
}

impl Default for Sound {
    fn default() -> Self {
        Self {
            regs: [0; 0x20],
            wave: [0; 0x10],
            powered: false,
            active: 0,
        }
    }
}

impl Sound {
    /// Register values the DMG boot ROM leaves behind.
    pub fn post_boot() -> Self {
        let mut sound = Self::default();
        sound.write(NR52, 0x80);
        let values: [(u16, u8); 19] = [
            (0xFF10, 0x80),
            (0xFF11, 0xBF),
            (0xFF12, 0xF3),
            (0xFF13, 0xFF),
            (0xFF16, 0x3F),
            (0xFF17, 0x00),
            (0xFF18, 0xFF),
            (0xFF1A, 0x7F),
            (0xFF1B, 0xFF),
            (0xFF1C, 0x9F),
            (0xFF1D, 0xFF),
            (0xFF20, 0xFF),
            (0xFF21, 0x00),
            (0xFF22, 0x00),
            (0xFF24, 0x77),
            (0xFF25, 0xF3),
            (0xFF14, 0x3F),
            (0xFF19, 0x3F),
            (0xFF1E, 0x3F),
        ];
        for (addr, value) in values {
            sound.write(addr, value);
        }
        sound.write(0xFF23, 0x3F);
        // Only channel 1 is still playing the boot chime.
        sound.active = 0x01;
        sound
    }

    pub fn powered(&self) -> bool {
        self.powered
    }
}

impl IoDevice for Sound {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF30..=0xFF3F => self.wave[(addr - 0xFF30) as usize],
            NR52 => 0x70 | (u8::from(self.powered) << 7) | self.active,
            _ => {
                let index = (addr - BASE) as usize;
                self.regs[index] | READ_MASK[index]
            }
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF30..=0xFF3F => self.wave[(addr - 0xFF30) as usize] = value,
            NR52 => {
                let on = value & 0x80 != 0;
                if self.powered && !on {
                    self.regs[..0x16].fill(0);
                    self.active = 0;
                }
                self.powered = on;
            }
            0xFF27..=0xFF2F => {}
            _ if !self.powered => {}
            _ => {
                let index = (addr - BASE) as usize;
                self.regs[index] = value;
                // NR14/NR24/NR34/NR44 trigger bit.
                if value & 0x80 != 0 {
                    match addr {
                        0xFF14 => self.active |= 0x01,
                        0xFF19 => self.active |= 0x02,
                        0xFF1E => self.active |= 0x04,
                        0xFF23 => self.active |= 0x08,
                        _ => {}
                    }
                }
            }
        }
    }
}

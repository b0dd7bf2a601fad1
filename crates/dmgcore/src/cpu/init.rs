use crate::config::BootState;

use super::{Cpu, Flags, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// CPU in the state the DMG boot ROM hands over to the cartridge.
    pub fn new() -> Self {
        Self::with_boot_state(BootState::PostBoot)
    }

    pub fn with_boot_state(state: BootState) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime_pending: false,
            ime_delay: false,
            halt_bug: false,
            locked: None,
        };
        cpu.reset(state);
        cpu
    }

    pub fn reset(&mut self, state: BootState) {
        self.regs = Registers::default();
        self.ime_pending = false;
        self.ime_delay = false;
        self.halt_bug = false;
        self.locked = None;
        if state == BootState::PostBoot {
            self.apply_dmg_boot_state();
        }
    }

    /// Register values after the DMG boot ROM, as documented in Pan Docs.
    fn apply_dmg_boot_state(&mut self) {
        self.regs.a = 0x01;
        self.regs.f = Flags::Z | Flags::H | Flags::C;
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
    }
}

use crate::cpu::table::Indirect;
use crate::cpu::Cpu;

impl Cpu {
    /// Resolve a `(rr)` pointer, applying the HL post-increment or
    /// post-decrement of the `(HL+)`/`(HL-)` forms.
    pub(super) fn indirect_addr(&mut self, ind: Indirect) -> u16 {
        match ind {
            Indirect::Bc => self.regs.bc(),
            Indirect::De => self.regs.de(),
            Indirect::HlInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Indirect::HlDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }
}

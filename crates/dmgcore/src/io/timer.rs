use crate::interrupts::Interrupt;

use super::IoDevice;

/// DIV/TIMA/TMA/TAC.
///
/// A 16-bit system counter runs once per T-cycle and DIV exposes bits
/// 8-15 of it. TIMA counts falling edges of the counter bit TAC selects
/// (ANDed with the enable bit), so register writes that pull that signal
/// low also count. An overflow leaves TIMA at zero for one M-cycle before
/// it reloads from TMA and raises the timer interrupt.
#[derive(Clone, Debug, Default)]
pub struct Timer {
    counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    /// T-cycles left until a pending overflow reloads TIMA.
    reload_in: Option<u8>,
    requested: Interrupt,
}

impl Timer {
    /// Counter value that makes DIV read 0xAB at the cartridge entry
    /// point.
    const POST_BOOT_COUNTER: u16 = 0xABCC;

    pub fn post_boot() -> Self {
        Self {
            counter: Self::POST_BOOT_COUNTER,
            tac: 0xF8,
            ..Self::default()
        }
    }

    fn input(&self) -> bool {
        let bit = match self.tac & 0x03 {
            0x00 => 9,
            0x01 => 3,
            0x02 => 5,
            _ => 7,
        };
        self.tac & 0x04 != 0 && self.counter & (1 << bit) != 0
    }

    fn increment_tima(&mut self) {
        let (next, overflow) = self.tima.overflowing_add(1);
        self.tima = next;
        if overflow {
            self.reload_in = Some(4);
        }
    }

    /// Apply a change to the counter or TAC, counting a falling edge of
    /// the timer input if the change produced one.
    fn update(&mut self, change: impl FnOnce(&mut Self)) {
        let before = self.input();
        change(self);
        if before && !self.input() {
            self.increment_tima();
        }
    }

    pub fn tick(&mut self, cycles: u32) {
        for _ in 0..cycles {
            if let Some(left) = self.reload_in {
                if left <= 1 {
                    self.reload_in = None;
                    self.tima = self.tma;
                    self.requested |= Interrupt::TIMER;
                } else {
                    self.reload_in = Some(left - 1);
                }
            }
            self.update(|timer| timer.counter = timer.counter.wrapping_add(1));
        }
    }

    pub fn div(&self) -> u8 {
        (self.counter >> 8) as u8
    }
}

impl IoDevice for Timer {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF04 => self.div(),
            0xFF05 => self.tima,
            0xFF06 => self.tma,
            _ => self.tac | 0xF8,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF04 => self.update(|timer| timer.counter = 0),
            0xFF05 => {
                // Writing during the overflow delay cancels the reload.
                self.reload_in = None;
                self.tima = value;
            }
            0xFF06 => self.tma = value,
            _ => self.update(|timer| timer.tac = value & 0x07),
        }
    }

    fn take_interrupts(&mut self) -> Interrupt {
        std::mem::take(&mut self.requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_counts_every_256_cycles() {
        let mut timer = Timer::default();
        timer.tick(255);
        assert_eq!(timer.read(0xFF04), 0);
        timer.tick(1);
        assert_eq!(timer.read(0xFF04), 1);
        timer.write(0xFF04, 0x55);
        assert_eq!(timer.read(0xFF04), 0);
    }

    #[test]
    fn div_is_the_upper_counter_byte() {
        let mut timer = Timer::default();
        timer.tick(0xFF00);
        assert_eq!(timer.div(), 0xFF);
        timer.tick(0x100);
        assert_eq!(timer.div(), 0x00);
    }

    #[test]
    fn post_boot_div_reads_ab() {
        assert_eq!(Timer::post_boot().read(0xFF04), 0xAB);
        assert_eq!(Timer::post_boot().read(0xFF07), 0xF8);
    }

    #[test]
    fn fastest_rate_increments_every_16_cycles() {
        let mut timer = Timer::default();
        timer.write(0xFF07, 0x05);
        timer.tick(16 * 10);
        assert_eq!(timer.read(0xFF05), 10);
    }

    #[test]
    fn overflow_reloads_from_tma_one_mcycle_later() {
        let mut timer = Timer::default();
        timer.write(0xFF06, 0xF0);
        timer.write(0xFF05, 0xFF);
        timer.write(0xFF07, 0x05);

        timer.tick(16);
        assert_eq!(timer.read(0xFF05), 0x00);
        assert_eq!(timer.take_interrupts(), Interrupt::empty());

        timer.tick(4);
        assert_eq!(timer.read(0xFF05), 0xF0);
        assert_eq!(timer.take_interrupts(), Interrupt::TIMER);
    }

    #[test]
    fn div_reset_with_input_high_counts_an_edge() {
        let mut timer = Timer::default();
        timer.write(0xFF07, 0x05);
        timer.tick(8);
        assert_eq!(timer.read(0xFF05), 0);
        timer.write(0xFF04, 0);
        assert_eq!(timer.read(0xFF05), 1);
    }
}

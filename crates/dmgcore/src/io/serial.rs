use crate::interrupts::Interrupt;

use super::IoDevice;

/// Bytes of serial output kept. Once full, the older half is dropped.
pub const OUTPUT_LIMIT: usize = 0x10000;

/// SB/SC serial port with no link partner attached.
///
/// Starting a transfer on the internal clock completes it at once: the
/// outgoing byte is captured, SB reads back 0xFF (an idle line) and the
/// serial interrupt is raised. Test ROMs report their results this way.
#[derive(Clone, Debug)]
pub struct Serial {
    sb: u8,
    sc: u8,
    capture: bool,
    output: Vec<u8>,
    last_sent: Option<u8>,
    requested: Interrupt,
}

impl Serial {
    pub fn new(capture: bool) -> Self {
        Self {
            sb: 0,
            sc: 0,
            capture,
            output: Vec::new(),
            last_sent: None,
            requested: Interrupt::empty(),
        }
    }

    /// Bytes shifted out so far, at most the last [`OUTPUT_LIMIT`].
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// The byte sent by the most recent completed transfer, if it has not
    /// been taken yet.
    pub fn take_sent(&mut self) -> Option<u8> {
        self.last_sent.take()
    }

    pub(crate) fn set_control(&mut self, sb: u8, sc: u8) {
        self.sb = sb;
        self.sc = sc;
    }
}

impl IoDevice for Serial {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF01 => self.sb,
            _ => self.sc | 0x7E,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if addr == 0xFF01 {
            self.sb = value;
            return;
        }
        self.sc = value & 0x81;
        if self.sc == 0x81 {
            if self.capture {
                if self.output.len() >= OUTPUT_LIMIT {
                    self.output.drain(..OUTPUT_LIMIT / 2);
                }
                self.output.push(self.sb);
            }
            self.last_sent = Some(self.sb);
            self.sb = 0xFF;
            self.sc &= !0x80;
            self.requested |= Interrupt::SERIAL;
        }
    }

    fn take_interrupts(&mut self) -> Interrupt {
        std::mem::take(&mut self.requested)
    }
}

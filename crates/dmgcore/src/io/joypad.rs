use crate::interrupts::Interrupt;

use super::IoDevice;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    /// (is action button, bit in the low nibble of P1)
    fn line(self) -> (bool, u8) {
        match self {
            Button::Right => (false, 0),
            Button::Left => (false, 1),
            Button::Up => (false, 2),
            Button::Down => (false, 3),
            Button::A => (true, 0),
            Button::B => (true, 1),
            Button::Select => (true, 2),
            Button::Start => (true, 3),
        }
    }
}

/// P1/JOYP (0xFF00).
///
/// Pressed buttons are stored as set bits and reported to the guest as
/// cleared bits of whichever group is selected.
#[derive(Clone, Debug)]
pub struct Joypad {
    select: u8,
    buttons: u8,
    dpad: u8,
    requested: Interrupt,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            select: 0x30,
            buttons: 0,
            dpad: 0,
            requested: Interrupt::empty(),
        }
    }
}

impl Joypad {
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let (action, bit) = button.line();
        let group = if action { &mut self.buttons } else { &mut self.dpad };
        let mask = 1u8 << bit;
        if pressed {
            if *group & mask == 0 {
                self.requested |= Interrupt::JOYPAD;
            }
            *group |= mask;
        } else {
            *group &= !mask;
        }
    }
}

impl IoDevice for Joypad {
    fn read(&self, _addr: u16) -> u8 {
        let mut low = 0x0F;
        if self.select & 0x10 == 0 {
            low &= !self.dpad;
        }
        if self.select & 0x20 == 0 {
            low &= !self.buttons;
        }
        0xC0 | self.select | (low & 0x0F)
    }

    fn write(&mut self, _addr: u16, value: u8) {
        self.select = value & 0x30;
    }

    fn take_interrupts(&mut self) -> Interrupt {
        std::mem::take(&mut self.requested)
    }
}

use bitflags::bitflags;

/// Address of the interrupt flag register (IF).
pub const IF_ADDR: u16 = 0xFF0F;
/// Address of the interrupt enable register (IE).
pub const IE_ADDR: u16 = 0xFFFF;

bitflags! {
    /// Interrupt request lines as laid out in IF and IE.
    ///
    /// Lower bits have higher priority.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 0x01;
        const STAT = 0x02;
        const TIMER = 0x04;
        const SERIAL = 0x08;
        const JOYPAD = 0x10;
    }
}

impl Interrupt {
    /// Entry address the CPU jumps to when servicing a single line.
    ///
    /// Only meaningful for a value with exactly one bit set.
    pub fn vector(self) -> u16 {
        0x0040 + (self.bits().trailing_zeros() as u16) * 8
    }
}

/// Pick the line the CPU would service next given raw IE and IF bytes.
///
/// The master enable is not considered here; callers decide whether a
/// pending line diverts execution or only wakes the CPU from HALT.
pub fn highest_priority(ie: u8, iflags: u8) -> Option<Interrupt> {
    let pending = ie & iflags & Interrupt::all().bits();
    if pending == 0 {
        return None;
    }
    Interrupt::from_bits(1 << pending.trailing_zeros())
}

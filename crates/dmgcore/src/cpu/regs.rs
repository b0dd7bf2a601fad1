use bitflags::bitflags;

bitflags! {
    /// Condition flags held in the upper nibble of F.
    ///
    /// The lower nibble has no flags defined, so any value built through
    /// `from_bits_truncate` keeps it at zero.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const Z = 0x80;
        const N = 0x40;
        const H = 0x20;
        const C = 0x10;
    }
}

/// LR35902 register file.
///
/// The eight 8-bit registers pair up as AF, BC, DE and HL. The three mode
/// flags describe the CPU's execution state rather than any guest-visible
/// register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    pub halted: bool,
    pub stopped: bool,
    /// Interrupt master enable.
    pub ime: bool,
}

impl Registers {
    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f.bits()])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.f = Flags::from_bits_truncate(f);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        [self.b, self.c] = value.to_be_bytes();
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        [self.d, self.e] = value.to_be_bytes();
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        [self.h, self.l] = value.to_be_bytes();
    }

    pub fn zero(&self) -> bool {
        self.f.contains(Flags::Z)
    }

    pub fn subtract(&self) -> bool {
        self.f.contains(Flags::N)
    }

    pub fn half_carry(&self) -> bool {
        self.f.contains(Flags::H)
    }

    pub fn carry(&self) -> bool {
        self.f.contains(Flags::C)
    }
}

//! PPU timing state machine.
//!
//! The PPU walks every scanline through OAM search (80 T-cycles), pixel
//! transfer (172) and H-blank (204); lines 144-153 are V-blank, 456 cycles
//! each. Pixels are not produced here: at every transfer-to-H-blank edge the
//! current line is handed to a [`LineRenderer`].

mod registers;

use crate::interrupts::Interrupt;

pub const VRAM_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0xA0;

/// T-cycles per scanline.
pub const LINE_CYCLES: u32 = 456;
/// First V-blank scanline.
pub const VBLANK_LINE: u8 = 144;
/// Scanlines per frame, V-blank included.
pub const LINES_PER_FRAME: u8 = 154;

mod lcdc {
    pub const ENABLE: u8 = 0x80;
}

mod stat {
    pub const COINCIDENCE: u8 = 0x04;
    pub const HBLANK_INT: u8 = 0x08;
    pub const VBLANK_INT: u8 = 0x10;
    pub const OAM_INT: u8 = 0x20;
    pub const LYC_INT: u8 = 0x40;
    /// Writable interrupt-select bits.
    pub const ENABLES: u8 = 0x78;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HBlank,
    VBlank,
    OamSearch,
    PixelTransfer,
}

impl Mode {
    /// Value reported in STAT bits 0-1.
    pub const fn bits(self) -> u8 {
        match self {
            Mode::HBlank => 0,
            Mode::VBlank => 1,
            Mode::OamSearch => 2,
            Mode::PixelTransfer => 3,
        }
    }

    /// T-cycles spent in this mode before the next transition.
    pub const fn budget(self) -> u32 {
        match self {
            Mode::OamSearch => 80,
            Mode::PixelTransfer => 172,
            Mode::HBlank => 204,
            Mode::VBlank => LINE_CYCLES,
        }
    }
}

/// Everything a renderer needs to draw one scanline.
#[derive(Clone, Copy, Debug)]
pub struct LineContext<'a> {
    pub line: u8,
    pub vram: &'a [u8; VRAM_SIZE],
    pub oam: &'a [u8; OAM_SIZE],
    pub lcdc: u8,
    pub stat: u8,
    pub scy: u8,
    pub scx: u8,
    pub bgp: u8,
    pub obp0: u8,
    pub obp1: u8,
    pub wy: u8,
    pub wx: u8,
}

pub trait LineRenderer {
    fn render_line(&mut self, ctx: &LineContext<'_>);
}

impl<F> LineRenderer for F
where
    F: FnMut(&LineContext<'_>),
{
    fn render_line(&mut self, ctx: &LineContext<'_>) {
        self(ctx)
    }
}

/// Renderer that discards every line.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl LineRenderer for NullRenderer {
    fn render_line(&mut self, _ctx: &LineContext<'_>) {}
}

#[derive(Clone, Debug)]
pub struct Ppu {
    vram: Box<[u8; VRAM_SIZE]>,
    oam: Box<[u8; OAM_SIZE]>,
    lcdc: u8,
    /// Interrupt-select bits of STAT only; mode and coincidence are
    /// derived on read.
    stat: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,
    mode: Mode,
    /// Cycles spent in the current mode.
    dots: u32,
    coincidence: bool,
    frames: u64,
    requested: Interrupt,
}

impl Default for Ppu {
    fn default() -> Self {
        Self {
            vram: Box::new([0; VRAM_SIZE]),
            oam: Box::new([0; OAM_SIZE]),
            lcdc: 0,
            stat: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            wy: 0,
            wx: 0,
            mode: Mode::HBlank,
            dots: 0,
            coincidence: false,
            frames: 0,
            requested: Interrupt::empty(),
        }
    }
}

impl Ppu {
    /// PPU as the boot ROM leaves it: LCD on, background enabled, at the
    /// start of line 0.
    pub fn post_boot() -> Self {
        let mut ppu = Self {
            bgp: 0xFC,
            ..Self::default()
        };
        ppu.set_lcdc(0x91);
        ppu.requested = Interrupt::empty();
        ppu
    }

    pub fn lcd_enabled(&self) -> bool {
        self.lcdc & lcdc::ENABLE != 0
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn line(&self) -> u8 {
        self.ly
    }

    /// Cycles spent in the current mode.
    pub fn dots(&self) -> u32 {
        self.dots
    }

    /// Number of V-blank periods entered since power-on.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn vram(&self) -> &[u8; VRAM_SIZE] {
        &self.vram
    }

    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    pub fn read_vram(&self, addr: u16) -> u8 {
        self.vram[(addr as usize - 0x8000) % VRAM_SIZE]
    }

    pub fn write_vram(&mut self, addr: u16, value: u8) {
        self.vram[(addr as usize - 0x8000) % VRAM_SIZE] = value;
    }

    pub fn read_oam(&self, addr: u16) -> u8 {
        self.oam[(addr as usize - 0xFE00) % OAM_SIZE]
    }

    pub fn write_oam(&mut self, addr: u16, value: u8) {
        self.oam[(addr as usize - 0xFE00) % OAM_SIZE] = value;
    }

    /// Advance by `cycles` T-cycles, processing every mode boundary crossed
    /// on the way. Does nothing while the LCD is off.
    pub fn tick<R: LineRenderer + ?Sized>(&mut self, cycles: u32, renderer: &mut R) {
        if !self.lcd_enabled() {
            return;
        }
        self.dots += cycles;
        while self.dots >= self.mode.budget() {
            self.dots -= self.mode.budget();
            self.advance(renderer);
        }
    }

    fn advance<R: LineRenderer + ?Sized>(&mut self, renderer: &mut R) {
        match self.mode {
            Mode::OamSearch => self.mode = Mode::PixelTransfer,
            Mode::PixelTransfer => {
                renderer.render_line(&self.line_context());
                self.enter(Mode::HBlank);
            }
            Mode::HBlank => {
                self.set_line(self.ly + 1);
                if self.ly == VBLANK_LINE {
                    self.frames += 1;
                    self.requested |= Interrupt::VBLANK;
                    self.enter(Mode::VBlank);
                } else {
                    self.enter(Mode::OamSearch);
                }
            }
            Mode::VBlank => {
                if self.ly + 1 == LINES_PER_FRAME {
                    self.set_line(0);
                    self.enter(Mode::OamSearch);
                } else {
                    self.set_line(self.ly + 1);
                }
            }
        }
    }

    fn enter(&mut self, mode: Mode) {
        self.mode = mode;
        let select = match mode {
            Mode::HBlank => stat::HBLANK_INT,
            Mode::VBlank => stat::VBLANK_INT,
            Mode::OamSearch => stat::OAM_INT,
            Mode::PixelTransfer => 0,
        };
        if self.stat & select != 0 {
            self.requested |= Interrupt::STAT;
        }
    }

    fn set_line(&mut self, line: u8) {
        self.ly = line;
        self.compare_line();
    }

    /// Recompute LY==LYC, raising STAT on a fresh match when selected.
    fn compare_line(&mut self) {
        let matched = self.ly == self.lyc;
        if matched && !self.coincidence && self.stat & stat::LYC_INT != 0 {
            self.requested |= Interrupt::STAT;
        }
        self.coincidence = matched;
    }

    fn set_lcdc(&mut self, value: u8) {
        let was_on = self.lcd_enabled();
        self.lcdc = value;
        match (was_on, self.lcd_enabled()) {
            (true, false) => {
                self.mode = Mode::HBlank;
                self.dots = 0;
                self.ly = 0;
            }
            (false, true) => {
                self.mode = Mode::OamSearch;
                self.dots = 0;
                self.coincidence = false;
                self.set_line(0);
            }
            _ => {}
        }
    }

    fn stat_value(&self) -> u8 {
        let mode = if self.lcd_enabled() { self.mode.bits() } else { 0 };
        let coincidence = if self.coincidence { stat::COINCIDENCE } else { 0 };
        0x80 | self.stat | coincidence | mode
    }

    pub fn line_context(&self) -> LineContext<'_> {
        LineContext {
            line: self.ly,
            vram: &self.vram,
            oam: &self.oam,
            lcdc: self.lcdc,
            stat: self.stat_value(),
            scy: self.scy,
            scx: self.scx,
            bgp: self.bgp,
            obp0: self.obp0,
            obp1: self.obp1,
            wy: self.wy,
            wx: self.wx,
        }
    }
}

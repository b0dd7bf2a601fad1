use std::path::Path;

use anyhow::{Context, Result};
use dmgcore::{CoreConfig, FrameEnd, GameBoy, NullRenderer, Registers};

/// Frames to run when neither the command line nor `DMGCORE_FRAMES` says
/// otherwise. About 30 seconds of emulated time.
pub const DEFAULT_FRAMES: u32 = 1800;

pub const FRAMES_ENV: &str = "DMGCORE_FRAMES";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    /// The frame budget ran out before the ROM reported.
    Timeout,
}

/// Register and serial signature of a passing Mooneye test ROM.
pub const MOONEYE_PASS: [u8; 6] = [3, 5, 8, 13, 21, 34];
/// Signature of a failing one.
pub const MOONEYE_FAIL: [u8; 6] = [0x42; 6];

impl Verdict {
    /// Look for a test-ROM verdict in its serial output: Blargg's
    /// "Passed"/"Failed" text or Mooneye's Fibonacci bytes.
    pub fn from_serial(output: &[u8]) -> Option<Verdict> {
        let contains = |needle: &[u8]| output.windows(needle.len()).any(|w| w == needle);
        if contains(b"Passed") || contains(&MOONEYE_PASS) {
            Some(Verdict::Passed)
        } else if contains(b"Failed") || contains(&MOONEYE_FAIL) {
            Some(Verdict::Failed)
        } else {
            None
        }
    }

    /// Mooneye verdict held in B, C, D, E, H and L at the `LD B,B`
    /// breakpoint.
    pub fn from_registers(regs: &Registers) -> Option<Verdict> {
        match [regs.b, regs.c, regs.d, regs.e, regs.h, regs.l] {
            MOONEYE_PASS => Some(Verdict::Passed),
            MOONEYE_FAIL => Some(Verdict::Failed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub verdict: Verdict,
    pub frames: u32,
    pub serial: String,
}

/// Frame budget from the command line, then the environment, then the
/// default.
pub fn frame_budget(arg: Option<&str>) -> Result<u32> {
    if let Some(arg) = arg {
        return arg
            .parse()
            .with_context(|| format!("invalid frame count '{arg}'"));
    }
    match std::env::var(FRAMES_ENV) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid {FRAMES_ENV} value '{value}'")),
        Err(_) => Ok(DEFAULT_FRAMES),
    }
}

pub fn run_path(path: &Path, frames: u32) -> Result<RunOutcome> {
    let rom = std::fs::read(path).with_context(|| format!("failed to read ROM '{}'", path.display()))?;
    log::info!("Running '{}' for up to {frames} frames", path.display());
    run(&rom, frames)
}

/// Run a cartridge image until it reports a verdict, over serial or at a
/// software breakpoint, or the frame budget is spent.
pub fn run(rom: &[u8], frames: u32) -> Result<RunOutcome> {
    let config = CoreConfig::default();
    let mut gb = GameBoy::from_rom(rom, &config).context("failed to load cartridge")?;

    let mut renderer = NullRenderer;
    for frame in 1..=frames {
        let end = gb
            .run_frame_until_breakpoint(&mut renderer)
            .with_context(|| format!("emulation stopped in frame {frame}"))?;

        let at_breakpoint = match end {
            FrameEnd::Breakpoint => Verdict::from_registers(&gb.cpu.regs),
            FrameEnd::Completed => None,
        };
        if let Some(verdict) = at_breakpoint.or_else(|| Verdict::from_serial(gb.serial_output())) {
            let serial = String::from_utf8_lossy(gb.serial_output());
            log::info!("Verdict {verdict:?} after {frame} frames");
            return Ok(RunOutcome {
                verdict,
                frames: frame,
                serial: serial.into_owned(),
            });
        }
    }

    log::warn!("No verdict after {frames} frames");
    Ok(RunOutcome {
        verdict: Verdict::Timeout,
        frames,
        serial: String::from_utf8_lossy(gb.serial_output()).into_owned(),
    })
}

use typed_builder::TypedBuilder;

/// Register and I/O state the machine starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BootState {
    /// The state the DMG boot ROM leaves behind when it jumps to 0x0100.
    #[default]
    PostBoot,
    /// Every register and I/O latch cleared, PC at 0x0000.
    Zeroed,
}

/// Knobs for a single emulation session.
///
/// ```
/// use dmgcore::{BootState, CoreConfig};
///
/// let config = CoreConfig::builder()
///     .boot_state(BootState::Zeroed)
///     .strict_rom_writes(true)
///     .build();
/// assert!(config.capture_serial);
/// ```
#[derive(Clone, Debug, TypedBuilder)]
pub struct CoreConfig {
    #[builder(default)]
    pub boot_state: BootState,
    /// Fail ROM writes on cartridges without a bank controller instead of
    /// dropping them.
    #[builder(default = false)]
    pub strict_rom_writes: bool,
    /// Keep every byte shifted out of the serial port.
    #[builder(default = true)]
    pub capture_serial: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

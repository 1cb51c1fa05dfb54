//! The complete hardware-model contract and the collaborators it is built
//! from.

use std::sync::Arc;

use crate::{
    AudioPort, Bus, FlatRam, InputTarget, InterruptSource, LogicalKey, MainRam, Modifiers,
    NullAudio, Observable, RamInit, ResetLevel, RomCache, RomLoader, SpeedControl, Tickable,
    VideoSource,
};

/// One emulated machine as driven by a CPU engine and a host UI.
///
/// The emulation thread owns the model and calls the [`Bus`], [`Tickable`]
/// and [`InterruptSource`] methods. The UI feeds input through
/// [`input_handle`](Self::input_handle) and changes the clock through
/// [`speed_control`](Self::speed_control); both handles may be moved to
/// other threads.
pub trait HardwareModel: Bus + Tickable + VideoSource + InterruptSource + Observable + Send {
    /// Human-readable machine name.
    fn title(&self) -> &'static str;

    /// CPU clock the model is designed for.
    fn default_speed_khz(&self) -> u32;

    /// Reset the machine.
    ///
    /// `PowerOn` additionally reloads ROM images and re-initialises RAM;
    /// `ColdReset` and `WarmReset` only reset peripheral and bank state.
    /// The caller must not interleave a reset with bus accesses.
    fn reset(&mut self, level: ResetLevel);

    /// Input target of this machine, borrowed.
    fn input(&self) -> &dyn InputTarget;

    /// Owned input handle for use from another thread.
    fn input_handle(&self) -> Box<dyn InputTarget>;

    /// Cloneable handle to the emulated CPU clock.
    fn speed_control(&self) -> SpeedControl;

    /// Character shown at text cell `(col, row)`, if it can be recognised.
    fn screen_char(&self, col: usize, row: usize) -> Option<char>;

    /// Text screen size in cells `(columns, rows)`.
    fn screen_text_size(&self) -> (usize, usize);

    fn apply_key(&self, key: LogicalKey, mods: Modifiers) -> bool {
        self.input().apply_key(key, mods)
    }

    fn apply_char(&self, ch: char) -> bool {
        self.input().apply_char(ch)
    }

    fn release_keys(&self) {
        self.input().release_keys();
    }

    fn apply_joystick(&self, mask: u8) {
        self.input().apply_joystick(mask);
    }

    /// Whole screen as text lines with trailing blanks removed. Cells that
    /// cannot be recognised become spaces.
    fn screen_text(&self) -> String {
        let (cols, rows) = self.screen_text_size();
        let mut text = String::new();
        for row in 0..rows {
            let line: String = (0..cols)
                .map(|col| self.screen_char(col, row).unwrap_or(' '))
                .collect();
            text.push_str(line.trim_end());
            text.push('\n');
        }
        text
    }
}

/// Collaborators a hardware model is constructed with, plus the power-on
/// policy it applies to them.
///
/// The ROM cache outlives any single machine; pass the same `Arc` to every
/// machine created in a session.
pub struct Host {
    pub roms: Arc<dyn RomLoader>,
    pub rom_cache: Arc<RomCache>,
    pub ram: Box<dyn MainRam>,
    pub audio: Box<dyn AudioPort>,
    /// RAM content after `PowerOn`.
    pub ram_init: RamInit,
    /// Re-read user ROM files on every `PowerOn`.
    pub reload_roms_on_power_on: bool,
}

impl Host {
    /// Host with flat zeroed RAM and no audio.
    #[must_use]
    pub fn new(roms: Arc<dyn RomLoader>, rom_cache: Arc<RomCache>) -> Self {
        Self {
            roms,
            rom_cache,
            ram: Box::new(FlatRam::new()),
            audio: Box::new(NullAudio),
            ram_init: RamInit::default(),
            reload_roms_on_power_on: true,
        }
    }

    #[must_use]
    pub fn with_ram(mut self, ram: Box<dyn MainRam>) -> Self {
        self.ram = ram;
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: Box<dyn AudioPort>) -> Self {
        self.audio = audio;
        self
    }

    #[must_use]
    pub fn with_ram_init(mut self, init: RamInit) -> Self {
        self.ram_init = init;
        self
    }

    #[must_use]
    pub fn with_rom_reload(mut self, reload: bool) -> Self {
        self.reload_roms_on_power_on = reload;
        self
    }
}

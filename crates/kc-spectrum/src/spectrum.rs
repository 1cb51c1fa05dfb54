//! Top-level Spectrum system.
//!
//! The CPU engine owns the instruction stream; this type owns everything
//! else. Each executed instruction reports its T-states through
//! [`Tickable`], which advances the ULA raster and the EAR line. The ULA
//! raises the frame interrupt when its line counter wraps (312 lines of
//! `round(khz / 15.625)` T-states each, 69,888 T-states at 3.5 MHz).

use std::sync::Arc;

use kc_core::rom::load_slot;
use kc_core::{
    Bus, HardwareModel, Host, InputTarget, InterruptSource, Observable, RamInit, ReadResult,
    ResetLevel, RomCache, RomLoader, SpeedControl, SpeedTracker, Tickable, Ticks, Value,
    VideoSource, parse_address,
};
use log::debug;
use sinclair_ula::{DEFAULT_KHZ, SCREEN_HEIGHT, SCREEN_WIDTH, SPECTRUM_48K, Ula, palette};

use crate::bus::SpectrumBus;
use crate::config::{ROM_SLOT, SpectrumConfig};
use crate::keyboard::SpectrumInput;
use crate::memory::{Memory48K, ROM_SIZE};
use crate::screen_text;

/// ZX Spectrum 48K system.
pub struct Spectrum {
    bus: SpectrumBus,
    input: SpectrumInput,
    speed: SpeedTracker,
    palette: [u32; 16],
    config: SpectrumConfig,
    roms: Arc<dyn RomLoader>,
    rom_cache: Arc<RomCache>,
    ram_init: RamInit,
    reload_roms_on_power_on: bool,
}

impl Spectrum {
    /// Create a new Spectrum from the given configuration.
    ///
    /// The OS ROM is loaded immediately; an unreadable user ROM falls back
    /// to the host's built-in image.
    #[must_use]
    pub fn new(config: SpectrumConfig, host: Host) -> Self {
        let input = SpectrumInput::new();
        let mut memory = Memory48K::new(host.ram);
        memory.set_rom(load_slot(
            host.roms.as_ref(),
            &host.rom_cache,
            config.rom_file.as_deref(),
            ROM_SLOT,
            ROM_SIZE,
        ));
        let bus = SpectrumBus::new(
            memory,
            Ula::new(SPECTRUM_48K, DEFAULT_KHZ),
            input.matrix().clone(),
            host.audio,
        );

        Self {
            bus,
            input,
            speed: SpeedTracker::new(SpeedControl::new(DEFAULT_KHZ), DEFAULT_KHZ),
            palette: palette(config.brightness),
            config,
            roms: host.roms,
            rom_cache: host.rom_cache,
            ram_init: host.ram_init,
            reload_roms_on_power_on: host.reload_roms_on_power_on,
        }
    }

    #[must_use]
    pub fn bus(&self) -> &SpectrumBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SpectrumBus {
        &mut self.bus
    }

    /// ARGB colours for the 16 palette indices.
    #[must_use]
    pub fn palette(&self) -> &[u32; 16] {
        &self.palette
    }

    #[must_use]
    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    fn reload_rom(&mut self) {
        let rom = load_slot(
            self.roms.as_ref(),
            &self.rom_cache,
            self.config.rom_file.as_deref(),
            ROM_SLOT,
            ROM_SIZE,
        );
        self.bus.memory.set_rom(rom);
    }
}

impl Bus for Spectrum {
    fn read(&mut self, addr: u16, fetch: bool) -> ReadResult {
        self.bus.read(addr, fetch)
    }

    fn write(&mut self, addr: u16, value: u8) -> u8 {
        self.bus.write(addr, value)
    }

    fn peek(&self, addr: u16, fetch: bool) -> u8 {
        self.bus.peek(addr, fetch)
    }

    fn io_read(&mut self, port: u16) -> ReadResult {
        self.bus.io_read(port)
    }

    fn io_write(&mut self, port: u16, value: u8) -> u8 {
        self.bus.io_write(port, value)
    }
}

impl Tickable for Spectrum {
    fn tick_n(&mut self, ticks: Ticks) {
        if let Some(khz) = self.speed.poll() {
            debug!("Spectrum clock set to {khz} kHz");
            self.bus.ula.set_speed_khz(khz);
        }
        self.bus.tick(ticks.get());
    }
}

impl VideoSource for Spectrum {
    fn screen_width(&self) -> u32 {
        SCREEN_WIDTH
    }

    fn screen_height(&self) -> u32 {
        SCREEN_HEIGHT
    }

    fn color_count(&self) -> usize {
        self.palette.len()
    }

    fn color_index(&self, x: i32, y: i32) -> u8 {
        self.bus.ula.color_index(x, y)
    }

    fn border_color(&self) -> u8 {
        self.bus.ula.border_colour()
    }

    fn border_color_at_line(&self, line: i32) -> Option<u8> {
        Some(self.bus.ula.border_colour_at_line(line))
    }
}

impl InterruptSource for Spectrum {
    fn is_interrupt_requested(&self) -> bool {
        self.bus.ula.is_interrupt_requested()
    }

    fn interrupt_accept(&mut self) -> u8 {
        self.bus.ula.interrupt_accept()
    }
}

impl Observable for Spectrum {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ula.") {
            match rest {
                "line" => Some(self.bus.ula.line().into()),
                "line_tstate" => Some(self.bus.ula.line_tstate().into()),
                "border" => Some(self.bus.ula.border_colour().into()),
                "blink" => Some(self.bus.ula.flash_state().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|addr| Value::U8(self.bus.memory.peek(addr)))
        } else {
            match path {
                "interrupt.requested" => Some(self.bus.ula.is_interrupt_requested().into()),
                "ear.phase" => Some(self.bus.ear.phase().into()),
                "speed.khz" => Some(self.speed.control().khz().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ula.line",
            "ula.line_tstate",
            "ula.border",
            "ula.blink",
            "memory.<address>",
            "interrupt.requested",
            "ear.phase",
            "speed.khz",
        ]
    }
}

impl HardwareModel for Spectrum {
    fn title(&self) -> &'static str {
        "ZX Spectrum"
    }

    fn default_speed_khz(&self) -> u32 {
        DEFAULT_KHZ
    }

    fn reset(&mut self, level: ResetLevel) {
        debug!("Spectrum reset: {level:?}");
        if level == ResetLevel::PowerOn {
            if self.reload_roms_on_power_on {
                self.reload_rom();
            }
            self.bus.memory.fill_ram(self.ram_init);
        }
        self.bus.ula.reset();
        self.bus.ear.reset();
        self.input.reset();
    }

    fn input(&self) -> &dyn InputTarget {
        &self.input
    }

    fn input_handle(&self) -> Box<dyn InputTarget> {
        Box::new(self.input.clone())
    }

    fn speed_control(&self) -> SpeedControl {
        self.speed.control().clone()
    }

    fn screen_char(&self, col: usize, row: usize) -> Option<char> {
        screen_text::char_at(&self.bus.memory, col, row)
    }

    fn screen_text_size(&self) -> (usize, usize) {
        (screen_text::COLUMNS, screen_text::ROWS)
    }
}

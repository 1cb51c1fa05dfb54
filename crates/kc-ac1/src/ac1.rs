//! Top-level AC1 system.
//!
//! # I/O map
//!
//! | Port      | Device                                              |
//! |-----------|-----------------------------------------------------|
//! | $00-$03   | CTC channels 0-3                                    |
//! | $04       | PIO A data: keyboard                                |
//! | $05       | PIO B data: bit 7 cassette in, bit 0 loudspeaker, bit 6 cassette out |
//! | $06/$07   | PIO A/B control                                     |
//! | $14       | SCCH ROM control                                    |
//! | $15       | SCCH extended RAM control                           |
//! | $1C-$1F   | lower DRAM switch                                   |
//! | $E0-$E7   | RAM floppy                                          |
//!
//! CTC channel 0's zero-count output drives channel 1's trigger input.

use std::sync::Arc;

use kc_core::rom::{load_optional, load_slot};
use kc_core::{
    AudioPort, Bus, HardwareModel, Host, InputTarget, InterruptSource, IoDevice, OPEN_BUS,
    Observable, RamInit, ReadResult, ResetLevel, RomCache, RomLoader, SpeedControl, SpeedTracker,
    Tickable, Ticks, Value, VideoSource, accept_first, any_requested, finish_first, parse_address,
};
use log::{debug, trace};
use zilog_ctc::Ctc;
use zilog_pio::{Pio, PortId};

use crate::banking::BankState;
use crate::config::{Ac1Config, slots};
use crate::keyboard::Ac1Input;
use crate::memory::{Ac1Memory, RomImages};
use crate::video::{COLUMNS, Geometry, SCREEN_WIDTH};

/// Default CPU clock.
pub const DEFAULT_KHZ: u32 = 2000;

const LOWER_BLOCK: usize = 0x2000;
const MINI_BASIC_LEN: usize = 0x1800;
const OVERLAY_LEN: usize = 0x2000;
const ROMDISK_LEN: usize = 0x1_0000;
const FONT_LEN: usize = 0x800;

/// AC1 system.
pub struct Ac1 {
    memory: Ac1Memory,
    ctc: Ctc,
    pio: Pio,
    input: Ac1Input,
    /// Port A has been read since reset.
    keyboard_used: bool,
    font: Option<Arc<[u8]>>,
    geometry: Geometry,
    ram_floppy: Option<Box<dyn IoDevice>>,
    audio: Box<dyn AudioPort>,
    speed: SpeedTracker,
    config: Ac1Config,
    roms: Arc<dyn RomLoader>,
    rom_cache: Arc<RomCache>,
    ram_init: RamInit,
    reload_roms_on_power_on: bool,
}

impl Ac1 {
    /// Create a new AC1 in its power-on state.
    #[must_use]
    pub fn new(config: Ac1Config, host: Host) -> Self {
        let monitor = config.monitor;
        let mut ac1 = Self {
            memory: Ac1Memory::new(monitor, host.ram),
            ctc: Ctc::new(),
            pio: Pio::new(),
            input: Ac1Input::new(),
            keyboard_used: false,
            font: None,
            geometry: Geometry {
                tall_rows: monitor.is_64x16(),
            },
            ram_floppy: None,
            audio: host.audio,
            speed: SpeedTracker::new(SpeedControl::new(DEFAULT_KHZ), DEFAULT_KHZ),
            config,
            roms: host.roms,
            rom_cache: host.rom_cache,
            ram_init: host.ram_init,
            reload_roms_on_power_on: host.reload_roms_on_power_on,
        };
        ac1.load_roms();
        ac1.power_on();
        ac1
    }

    /// Attach a RAM floppy to ports $E0-$E7. The 64×16 board has no
    /// connector for it.
    pub fn attach_ram_floppy(&mut self, device: Box<dyn IoDevice>) {
        if self.config.monitor.is_64x16() {
            debug!("AC1 64x16 has no RAM floppy port, device ignored");
        } else {
            self.ram_floppy = Some(device);
        }
    }

    #[must_use]
    pub fn memory(&self) -> &Ac1Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Ac1Memory {
        &mut self.memory
    }

    #[must_use]
    pub fn ctc(&self) -> &Ctc {
        &self.ctc
    }

    #[must_use]
    pub fn pio(&self) -> &Pio {
        &self.pio
    }

    #[must_use]
    pub fn config(&self) -> &Ac1Config {
        &self.config
    }

    fn load_roms(&mut self) {
        let loader = self.roms.as_ref();
        let cache = &self.rom_cache;
        let monitor = self.config.monitor;
        let mut images = RomImages {
            monitor: load_slot(loader, cache, None, monitor.rom_slot(), LOWER_BLOCK),
            ..RomImages::default()
        };
        if monitor.is_scch() {
            images.gs_basic = load_slot(loader, cache, None, slots::GS_BASIC, OVERLAY_LEN);
            images.program_x =
                load_optional(loader, self.config.program_x_file.as_deref(), OVERLAY_LEN);
            images.romdisk =
                load_optional(loader, self.config.romdisk_file.as_deref(), ROMDISK_LEN);
        } else {
            images.mini_basic = load_slot(loader, cache, None, slots::MINI_BASIC, MINI_BASIC_LEN);
        }
        self.font = load_slot(
            loader,
            cache,
            self.config.font_file.as_deref(),
            monitor.font_slot(),
            FONT_LEN,
        );
        self.memory.set_roms(images);
    }

    fn power_on(&mut self) {
        self.memory.power_on(self.ram_init);
        self.reset_peripherals(true);
    }

    fn reset_peripherals(&mut self, cold: bool) {
        self.ctc.reset(cold);
        self.pio.reset(cold);
        self.input.reset();
        self.keyboard_used = false;
        self.memory.banks = BankState::default();
    }

    /// Hand a changed keyboard latch to PIO port A.
    fn sync_keyboard(&mut self) {
        if let Some(value) = self.input.take_latch() {
            self.pio.put_in_value(PortId::A, value, 0xFF);
        }
    }

    fn read_keyboard(&mut self) -> u8 {
        if self.keyboard_used {
            self.sync_keyboard();
        } else {
            // First read after reset drops whatever the port latched before
            self.input.take_latch();
            self.pio.put_in_value(PortId::A, self.input.value(), 0xFF);
            self.keyboard_used = true;
        }
        self.pio.read_port(PortId::A)
    }

    fn read_cassette(&mut self) -> u8 {
        let phase = self.audio.read_phase().unwrap_or(false);
        self.pio
            .put_in_value(PortId::B, if phase { 0x80 } else { 0x00 }, 0x80);
        self.pio.read_port(PortId::B)
    }

    fn write_port_b(&mut self, value: u8) {
        self.pio.write_port(PortId::B, value);
        let mask = if self.audio.loudspeaker_enabled() { 0x01 } else { 0x40 };
        self.audio
            .write_phase(self.pio.output_value(PortId::B) & mask != 0);
    }
}

impl Bus for Ac1 {
    fn read(&mut self, addr: u16, fetch: bool) -> ReadResult {
        ReadResult::new(self.memory.read(addr, fetch))
    }

    fn write(&mut self, addr: u16, value: u8) -> u8 {
        self.memory.write(addr, value);
        0
    }

    fn peek(&self, addr: u16, fetch: bool) -> u8 {
        self.memory.read(addr, fetch)
    }

    fn io_read(&mut self, port: u16) -> ReadResult {
        let port = port as u8;
        let data = match port {
            0xE0..=0xE7 => self
                .ram_floppy
                .as_mut()
                .map_or(OPEN_BUS, |floppy| floppy.read_register(port & 0x07)),
            0x00..=0x03 => self.ctc.read(port),
            0x04 => self.read_keyboard(),
            0x05 => self.read_cassette(),
            0x06 => self.pio.read_control(PortId::A),
            0x07 => self.pio.read_control(PortId::B),
            _ => {
                trace!("AC1 read from unmapped port {port:02X}h");
                OPEN_BUS
            }
        };
        ReadResult::new(data)
    }

    fn io_write(&mut self, port: u16, value: u8) -> u8 {
        let port = port as u8;
        let scch = self.config.monitor.is_scch();
        match port {
            0xE0..=0xE7 => {
                if let Some(floppy) = self.ram_floppy.as_mut() {
                    floppy.write_register(port & 0x07, value);
                }
            }
            0x00..=0x03 => self.ctc.write(port, value),
            0x04 => self.pio.write_port(PortId::A, value),
            0x05 => self.write_port_b(value),
            0x06 => self.pio.write_control(PortId::A, value),
            0x07 => self.pio.write_control(PortId::B, value),
            0x14 if scch => self.memory.banks.write_rom_control(value),
            0x15 if scch => self.memory.banks.write_ram_control(value),
            0x1C..=0x1F if !self.config.monitor.is_64x16() => {
                self.memory.banks.set_lower_dram(value & 0x01 != 0);
            }
            _ => trace!("AC1 write {value:02X}h to unmapped port {port:02X}h"),
        }
        0
    }
}

impl Tickable for Ac1 {
    fn tick_n(&mut self, ticks: Ticks) {
        if let Some(khz) = self.speed.poll() {
            debug!("AC1 clock set to {khz} kHz");
        }
        let mut remaining = ticks.get();
        while remaining > 0 {
            let clocks = remaining.min(u64::from(u32::MAX)) as u32;
            remaining -= u64::from(clocks);
            let [zero_count, _, _] = self.ctc.tick_n(clocks);
            if zero_count > 0 {
                self.ctc.external_update(1, zero_count);
            }
        }
        self.sync_keyboard();
    }
}

impl VideoSource for Ac1 {
    fn screen_width(&self) -> u32 {
        SCREEN_WIDTH
    }

    fn screen_height(&self) -> u32 {
        self.geometry.screen_height()
    }

    fn color_count(&self) -> usize {
        2
    }

    fn color_index(&self, x: i32, y: i32) -> u8 {
        let font = self.font.as_deref().unwrap_or_default();
        self.geometry
            .color_index(self.memory.video_ram(), font, x, y)
    }
}

impl InterruptSource for Ac1 {
    fn is_interrupt_requested(&self) -> bool {
        any_requested(&[&self.ctc, &self.pio])
    }

    fn is_interrupt_accepted(&self) -> bool {
        self.ctc.is_interrupt_accepted() || self.pio.is_interrupt_accepted()
    }

    fn interrupt_accept(&mut self) -> u8 {
        accept_first(&mut [&mut self.ctc, &mut self.pio]).unwrap_or(OPEN_BUS)
    }

    fn interrupt_finish(&mut self) {
        finish_first(&mut [&mut self.ctc, &mut self.pio]);
    }
}

impl Observable for Ac1 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ctc.") {
            self.ctc.query(rest)
        } else if let Some(rest) = path.strip_prefix("pio.") {
            self.pio.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|addr| Value::U8(self.memory.read(addr, false)))
        } else if let Some(rest) = path.strip_prefix("bank.") {
            let banks = &self.memory.banks;
            match rest {
                "lower_dram" => Some(banks.lower_dram.into()),
                "romdisk" => Some(banks.romdisk.into()),
                "program_x" => Some(banks.program_x.into()),
                "gs_basic" => Some(banks.gs_basic.into()),
                "extended_page" => Some(((banks.ext_page >> 16) as u8).into()),
                "extended_32k" => Some(banks.ext_32k.into()),
                _ => None,
            }
        } else {
            match path {
                "keyboard" => Some(self.input.value().into()),
                "speed.khz" => Some(self.speed.control().khz().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ctc.channel<n>.<field>",
            "pio.<a|b>.<field>",
            "memory.<address>",
            "bank.lower_dram",
            "bank.romdisk",
            "bank.program_x",
            "bank.gs_basic",
            "bank.extended_page",
            "bank.extended_32k",
            "keyboard",
            "speed.khz",
        ]
    }
}

impl HardwareModel for Ac1 {
    fn title(&self) -> &'static str {
        "AC1"
    }

    fn default_speed_khz(&self) -> u32 {
        DEFAULT_KHZ
    }

    fn reset(&mut self, level: ResetLevel) {
        debug!("AC1 reset: {level:?}");
        if level == ResetLevel::PowerOn {
            if self.reload_roms_on_power_on {
                self.load_roms();
            }
            self.power_on();
        } else {
            self.reset_peripherals(level.is_cold());
        }
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
        self.geometry
            .screen_char(self.memory.video_ram(), col, row)
    }

    fn screen_text_size(&self) -> (usize, usize) {
        (COLUMNS, self.geometry.rows())
    }
}

//! Integration tests for the AC1 hardware model.
//!
//! Everything goes through the `kc-core` contracts, as a CPU engine and a
//! host UI would drive the machine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use kc_ac1::{Ac1, Ac1Config, Monitor, slots};
use kc_core::rom::MapRomLoader;
use kc_core::{
    AudioPort, Bus, HardwareModel, Host, InterruptSource, IoDevice, LogicalKey, Modifiers,
    Observable, RamInit, ResetLevel, RomCache, RomError, RomLoader, Tickable, Ticks, Value,
    VideoSource,
};

/// Loader that serves `prgx.rom` and counts every request.
struct CountingLoader {
    loads: AtomicUsize,
}

impl RomLoader for CountingLoader {
    fn load(&self, name: &str) -> Result<Vec<u8>, RomError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if name == "prgx.rom" {
            Ok(vec![0xC3; 0x2000])
        } else {
            Err(RomError::NotFound {
                name: name.to_string(),
            })
        }
    }
}

/// Audio port with a fixed input phase that records every output phase.
#[derive(Default)]
struct ScriptedAudio {
    input: Option<bool>,
    written: Arc<Mutex<Vec<bool>>>,
}

impl AudioPort for ScriptedAudio {
    fn read_phase(&mut self) -> Option<bool> {
        self.input
    }

    fn write_phase(&mut self, phase: bool) {
        self.written.lock().unwrap().push(phase);
    }
}

/// Eight plain registers.
#[derive(Default)]
struct RegisterFile([u8; 8]);

impl IoDevice for RegisterFile {
    fn read_register(&mut self, reg: u8) -> u8 {
        self.0[usize::from(reg)]
    }

    fn write_register(&mut self, reg: u8, value: u8) {
        self.0[usize::from(reg)] = value;
    }
}

fn builtin_cache() -> Arc<RomCache> {
    let cache = Arc::new(RomCache::new());
    for slot in [
        slots::MONITOR_31_64X16,
        slots::MONITOR_31_64X32,
        slots::MONITOR_SCCH_80,
        slots::MONITOR_SCCH_1088,
    ] {
        cache.insert_builtin(slot, vec![0x31; 0x1000]);
    }
    cache.insert_builtin(slots::MINI_BASIC, vec![0xBA; 0x800]);
    cache.insert_builtin(slots::GS_BASIC, vec![0x65; 0x2000]);
    cache
}

fn make_host() -> Host {
    Host::new(Arc::new(MapRomLoader::new()), builtin_cache()).with_ram_init(RamInit::Zero)
}

fn make_ac1(monitor: Monitor) -> Ac1 {
    Ac1::new(
        Ac1Config {
            monitor,
            ..Ac1Config::default()
        },
        make_host(),
    )
}

// ---------------------------------------------------------------------------
// Memory map
// ---------------------------------------------------------------------------

#[test]
fn lower_dram_switch() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    assert_eq!(ac1.read(0x0000, true).data, 0x31);
    assert_eq!(ac1.read(0x0800, false).data, 0xBA, "mini-BASIC");

    ac1.io_write(0x1C, 0x01);
    assert_eq!(ac1.query("bank.lower_dram"), Some(Value::Bool(true)));
    ac1.write(0x0000, 0x77);
    assert_eq!(ac1.read(0x0000, true).data, 0x77);

    ac1.io_write(0x1F, 0x00);
    assert_eq!(ac1.read(0x0000, true).data, 0x31);
}

#[test]
fn no_wait_states() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    assert_eq!(ac1.read(0x1000, false).wait, 0);
    assert_eq!(ac1.io_read(0x04).wait, 0);
}

#[test]
fn original_board_has_no_dram() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x16);
    ac1.write(0x8000, 0x12);
    assert_eq!(ac1.read(0x8000, false).data, 0xFF);

    ac1.io_write(0x1C, 0x01);
    assert_eq!(ac1.read(0x0000, true).data, 0x31, "switch not fitted");

    ac1.attach_ram_floppy(Box::new(RegisterFile::default()));
    ac1.io_write(0xE0, 0x42);
    assert_eq!(ac1.io_read(0xE0).data, 0xFF);

    assert_eq!(ac1.screen_text_size(), (64, 16));
    assert_eq!(ac1.screen_height(), 248);
}

#[test]
fn ram_floppy_ports() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    ac1.attach_ram_floppy(Box::new(RegisterFile::default()));
    ac1.io_write(0xE3, 0x42);
    assert_eq!(ac1.io_read(0xE3).data, 0x42);
    assert_eq!(ac1.io_read(0xE4).data, 0x00);
}

#[test]
fn scch_banking_through_ports() {
    let mut ac1 = make_ac1(Monitor::Scch80);
    assert_eq!(ac1.read(0x4000, false).data, 0x00, "main RAM");

    ac1.io_write(0x14, 0x02);
    assert_eq!(ac1.query("bank.gs_basic"), Some(Value::Bool(true)));
    assert_eq!(ac1.read(0x4000, false).data, 0x65);
    ac1.io_write(0x14, 0x00);

    // Writes go to extended RAM page 3, reads still come from main RAM
    ac1.io_write(0x15, 0x83);
    ac1.write(0x3000, 0x11);
    assert_eq!(ac1.read(0x3000, false).data, 0x00);
    assert_eq!(ac1.query("bank.extended_page"), Some(Value::U8(3)));

    ac1.io_write(0x15, 0x43);
    assert_eq!(ac1.read(0x3000, false).data, 0x11);
    assert_eq!(ac1.read(0x0000, true).data, 0x31, "fetches bypass the full window");

    ac1.io_write(0x15, 0x42);
    assert_eq!(ac1.read(0x3000, false).data, 0x00, "other page");
}

#[test]
fn screen_text_reads_video_ram_backwards() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    for addr in 0x1000..0x1800 {
        ac1.write(addr, b' ');
    }
    ac1.write(0x17FF, b'O');
    ac1.write(0x17FE, b'K');
    assert_eq!(ac1.screen_char(0, 0), Some('O'));
    assert!(ac1.screen_text().starts_with("OK\n"));
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[test]
fn power_on_reloads_roms_and_clears_ram() {
    let loader = Arc::new(CountingLoader {
        loads: AtomicUsize::new(0),
    });
    let host = Host::new(loader.clone(), builtin_cache()).with_ram_init(RamInit::Zero);
    let config = Ac1Config {
        monitor: Monitor::Scch1088,
        program_x_file: Some("prgx.rom".into()),
        ..Ac1Config::default()
    };
    let mut ac1 = Ac1::new(config, host);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

    ac1.io_write(0x14, 0x01);
    assert_eq!(ac1.read(0xE000, true).data, 0xC3);
    ac1.write(0x8000, 0x55);

    ac1.reset(ResetLevel::ColdReset);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(ac1.query("bank.program_x"), Some(Value::Bool(false)));
    assert_eq!(ac1.read(0xE000, true).data, 0x00, "main RAM again");
    assert_eq!(ac1.read(0x8000, false).data, 0x55);

    ac1.reset(ResetLevel::PowerOn);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    assert_eq!(ac1.read(0x8000, false).data, 0x00);
}

#[test]
fn warm_reset_keeps_rom_and_ram() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    ac1.write(0x1800, 0x99);
    ac1.io_write(0x1C, 0x01);
    ac1.reset(ResetLevel::WarmReset);
    assert_eq!(ac1.query("bank.lower_dram"), Some(Value::Bool(false)));
    assert_eq!(ac1.read(0x1800, false).data, 0x99);
}

// ---------------------------------------------------------------------------
// Peripherals
// ---------------------------------------------------------------------------

#[test]
fn keyboard_reaches_pio_port_a() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    assert!(ac1.apply_char('A'));
    assert_eq!(ac1.io_read(0x04).data, 0xC1);

    ac1.release_keys();
    ac1.tick_n(Ticks::new(4));
    assert_eq!(ac1.io_read(0x04).data, 0x00);

    assert!(ac1.apply_key(LogicalKey::Enter, Modifiers::NONE));
    assert_eq!(ac1.io_read(0x04).data, 0x8D);
}

#[test]
fn keyboard_from_another_thread() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    assert_eq!(ac1.io_read(0x04).data, 0x00);

    let handle = ac1.input_handle();
    thread::spawn(move || {
        handle.apply_char('b');
    })
    .join()
    .unwrap();

    ac1.tick_n(Ticks::new(4));
    assert_eq!(ac1.io_read(0x04).data, 0xE2);
}

#[test]
fn keyboard_strobe_interrupts_through_pio() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    ac1.io_write(0x06, 0x20); // vector
    ac1.io_write(0x06, 0x4F); // input mode
    ac1.io_write(0x06, 0x83); // interrupts on
    assert!(!ac1.is_interrupt_requested());

    ac1.apply_char('X');
    ac1.tick_n(Ticks::new(4));
    assert!(ac1.is_interrupt_requested());
    assert_eq!(ac1.interrupt_accept(), 0x20);
    assert!(ac1.is_interrupt_accepted());
    ac1.interrupt_finish();
    assert!(!ac1.is_interrupt_accepted());
}

#[test]
fn ctc_has_priority_over_pio() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    ac1.io_write(0x06, 0x20);
    ac1.io_write(0x06, 0x83);
    ac1.io_write(0x00, 0x40); // CTC vector
    ac1.io_write(0x00, 0x85); // timer, prescaler 16, interrupts on
    ac1.io_write(0x00, 0x01);

    ac1.apply_char('X');
    ac1.tick_n(Ticks::new(16));
    assert_eq!(ac1.interrupt_accept(), 0x40);
    assert!(!ac1.is_interrupt_requested(), "PIO blocked while CTC in service");
    ac1.interrupt_finish();
    assert_eq!(ac1.interrupt_accept(), 0x20);
}

#[test]
fn ctc_channel_0_clocks_channel_1() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    ac1.io_write(0x01, 0x45); // counter mode
    ac1.io_write(0x01, 0x03);
    ac1.io_write(0x00, 0x05); // timer, prescaler 16
    ac1.io_write(0x00, 0x02);

    ac1.tick_n(Ticks::new(32 * 3));
    assert_eq!(ac1.query("ctc.channel1.counter"), Some(Value::U8(3)));
    ac1.tick_n(Ticks::new(32));
    assert_eq!(ac1.query("ctc.channel1.counter"), Some(Value::U8(2)));
}

#[test]
fn cassette_and_loudspeaker_on_port_b() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let audio = ScriptedAudio {
        input: Some(true),
        written: written.clone(),
    };
    let host = make_host().with_audio(Box::new(audio));
    let mut ac1 = Ac1::new(Ac1Config::default(), host);

    assert_eq!(ac1.io_read(0x05).data & 0x80, 0x80);

    ac1.io_write(0x05, 0x40);
    ac1.io_write(0x05, 0x01);
    assert_eq!(*written.lock().unwrap(), vec![true, false]);
}

#[test]
fn speed_control_is_shared() {
    let mut ac1 = make_ac1(Monitor::Mon31_64x32);
    assert_eq!(ac1.query("speed.khz"), Some(Value::U32(2000)));
    ac1.speed_control().set_khz(4000);
    ac1.tick();
    assert_eq!(ac1.query("speed.khz"), Some(Value::U32(4000)));
}

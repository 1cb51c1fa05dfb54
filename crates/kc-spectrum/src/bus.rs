//! Spectrum bus: memory and I/O routing.
//!
//! The bus connects the Z80 CPU to memory, video, keyboard and the EAR
//! line. Every port with A0 clear addresses the ULA (port $FE); port $1F
//! is the Kempston joystick. Anything else reads as open bus.
//!
//! # Contention
//!
//! Memory contention is delegated to the ULA via `ula.contention()`.
//! Opcode fetches are contended at the start of the access, data reads and
//! writes one machine cycle later. I/O contention goes through
//! `ula.io_contention()`.

use kc_core::{AudioPort, Bus, InputMatrix, OPEN_BUS, ReadResult};
use log::trace;
use sinclair_ula::Ula;

use crate::ear::EarLine;
use crate::keyboard::{self, ROWS};
use crate::memory::Memory48K;

/// T-state offset of the data phase of a read, write or I/O cycle.
const DATA_PHASE: u32 = 4;

/// The Spectrum bus, implementing `kc_core::Bus`.
///
/// Owns the memory, ULA and EAR subsystems. The keyboard matrix is shared
/// with the UI thread.
pub struct SpectrumBus {
    pub memory: Memory48K,
    pub ula: Ula,
    pub ear: EarLine,
    pub(crate) matrix: InputMatrix<ROWS>,
    pub(crate) audio: Box<dyn AudioPort>,
}

impl SpectrumBus {
    #[must_use]
    pub fn new(
        memory: Memory48K,
        ula: Ula,
        matrix: InputMatrix<ROWS>,
        audio: Box<dyn AudioPort>,
    ) -> Self {
        Self {
            memory,
            ula,
            ear: EarLine::new(),
            matrix,
            audio,
        }
    }

    /// Advance ULA and EAR by executed T-states.
    pub fn tick(&mut self, tstates: u64) {
        let memory = &self.memory;
        self.ula.tick_n(tstates, |addr| memory.peek(addr));
        self.ear.tick(tstates);
    }

    fn read_ula_port(&mut self, port: u16) -> u8 {
        let rows = self.matrix.snapshot();
        let mut value = keyboard::read_rows(&rows, port);
        let ear_high = match self.audio.read_phase() {
            Some(phase) => phase,
            None => self.ear.input_level(),
        };
        if !ear_high {
            value &= !0x40;
        }
        value
    }

    fn write_ula_port(&mut self, value: u8) {
        // Bit 0-2: border colour
        self.ula.set_border_colour(value & 0x07);
        // Bit 4: EAR (speaker), bit 3: MIC (tape out)
        let ear = value & 0x10 != 0;
        let mic = value & 0x08 != 0;
        let phase = if self.audio.sound_out_enabled() { ear } else { mic };
        self.audio.write_phase(phase);
        self.ear.set_phase(ear);
    }
}

impl Bus for SpectrumBus {
    fn read(&mut self, addr: u16, fetch: bool) -> ReadResult {
        let diff = if fetch { 0 } else { DATA_PHASE };
        let wait = self.ula.contention(addr, diff);
        ReadResult::with_wait(self.memory.peek(addr), wait)
    }

    fn write(&mut self, addr: u16, value: u8) -> u8 {
        let wait = self.ula.contention(addr, DATA_PHASE);
        self.memory.write(addr, value);
        wait
    }

    fn peek(&self, addr: u16, _fetch: bool) -> u8 {
        self.memory.peek(addr)
    }

    fn io_read(&mut self, port: u16) -> ReadResult {
        let wait = self.ula.io_contention(port, DATA_PHASE);
        let data = if port & 0x01 == 0 {
            self.read_ula_port(port)
        } else if port & 0xFF == 0x1F {
            keyboard::kempston(self.matrix.joystick())
        } else {
            trace!("read from unmapped port {port:04X}h");
            OPEN_BUS
        };
        ReadResult::with_wait(data, wait)
    }

    fn io_write(&mut self, port: u16, value: u8) -> u8 {
        let wait = self.ula.io_contention(port, DATA_PHASE);
        if port & 0x01 == 0 {
            self.write_ula_port(value);
        } else {
            trace!("write {value:02X}h to unmapped port {port:04X}h");
        }
        wait
    }
}

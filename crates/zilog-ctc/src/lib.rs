//! Zilog Z80 CTC (Counter/Timer Circuit).
//!
//! Four independent 8-bit down-counters. In timer mode a channel counts
//! system clocks through a prescaler of 16 or 256; in counter mode it
//! counts pulses on its CLK/TRG input. Reaching zero reloads the time
//! constant, pulses the ZC/TO output (channels 0-2 only) and, if enabled,
//! requests an interrupt.
//!
//! # Channel control word (bit 0 = 1)
//!
//! | Bit | Meaning                                     |
//! |-----|---------------------------------------------|
//! | 7   | Interrupt enable                            |
//! | 6   | 1 = counter mode, 0 = timer mode            |
//! | 5   | Prescaler: 1 = 256, 0 = 16 (timer mode)     |
//! | 4   | CLK/TRG edge: 1 = rising, 0 = falling       |
//! | 3   | Timer trigger: 1 = start on CLK/TRG pulse   |
//! | 2   | Time constant follows                       |
//! | 1   | Software reset                              |
//!
//! A write with bit 0 clear to channel 0 sets the interrupt vector; the
//! channel number is merged into bits 1-2 on acknowledge. A time constant
//! of 0 counts 256.
//!
//! The four channels form the chip's internal daisy chain, channel 0 first.

use kc_core::{InterruptSource, Observable, Value};

const CTRL_INT_ENABLE: u8 = 0x80;
const CTRL_COUNTER_MODE: u8 = 0x40;
const CTRL_PRESCALER_256: u8 = 0x20;
const CTRL_TRIGGER: u8 = 0x08;
const CTRL_TC_FOLLOWS: u8 = 0x04;
const CTRL_RESET: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Reset; no time constant loaded yet or software reset pending.
    Stopped,
    /// Timer mode waiting for a CLK/TRG pulse to start.
    AwaitingTrigger,
    Running,
}

#[derive(Debug, Clone, Copy)]
struct Channel {
    control: u8,
    /// 1..=256
    time_constant: u16,
    /// 1..=256
    counter: u16,
    /// System clocks left until the next prescaler expiry.
    prescaler_left: u16,
    state: State,
    /// Next write to this channel is the time constant.
    tc_follows: bool,
    int_pending: bool,
    in_service: bool,
}

impl Channel {
    const fn new() -> Self {
        Self {
            control: CTRL_RESET,
            time_constant: 256,
            counter: 256,
            prescaler_left: 16,
            state: State::Stopped,
            tc_follows: false,
            int_pending: false,
            in_service: false,
        }
    }

    fn prescaler(&self) -> u16 {
        if self.control & CTRL_PRESCALER_256 != 0 { 256 } else { 16 }
    }

    fn counter_mode(&self) -> bool {
        self.control & CTRL_COUNTER_MODE != 0
    }

    fn write_control(&mut self, value: u8) {
        self.control = value;
        if value & CTRL_INT_ENABLE == 0 {
            self.int_pending = false;
        }
        if value & CTRL_RESET != 0 {
            self.state = State::Stopped;
        }
        self.tc_follows = value & CTRL_TC_FOLLOWS != 0;
    }

    fn write_time_constant(&mut self, value: u8) {
        self.time_constant = if value == 0 { 256 } else { u16::from(value) };
        self.tc_follows = false;
        if self.state == State::Stopped {
            self.counter = self.time_constant;
            self.prescaler_left = self.prescaler();
            self.state = if !self.counter_mode() && self.control & CTRL_TRIGGER != 0 {
                State::AwaitingTrigger
            } else {
                State::Running
            };
        }
    }

    /// One decrement. Returns true on zero count.
    fn count(&mut self) -> bool {
        self.counter -= 1;
        if self.counter == 0 {
            self.counter = self.time_constant;
            if self.control & CTRL_INT_ENABLE != 0 {
                self.int_pending = true;
            }
            true
        } else {
            false
        }
    }

    /// Advance a timer-mode channel by `clocks` system clocks.
    fn tick_timer(&mut self, mut clocks: u32) -> u32 {
        if self.state != State::Running || self.counter_mode() {
            return 0;
        }
        let mut zero_counts = 0;
        while clocks > 0 {
            let step = clocks.min(u32::from(self.prescaler_left));
            clocks -= step;
            self.prescaler_left -= step as u16;
            if self.prescaler_left == 0 {
                self.prescaler_left = self.prescaler();
                if self.count() {
                    zero_counts += 1;
                }
            }
        }
        zero_counts
    }

    /// CLK/TRG pulses. Returns zero counts produced.
    fn trigger(&mut self, pulses: u32) -> u32 {
        if pulses == 0 {
            return 0;
        }
        match self.state {
            State::Stopped => 0,
            State::AwaitingTrigger => {
                self.state = State::Running;
                0
            }
            State::Running if self.counter_mode() => {
                (0..pulses).filter(|_| self.count()).count() as u32
            }
            State::Running => 0,
        }
    }

    fn reset(&mut self, power_on: bool) {
        let time_constant = self.time_constant;
        *self = Self::new();
        if !power_on {
            self.time_constant = time_constant;
        }
    }
}

/// Z80 CTC.
pub struct Ctc {
    channels: [Channel; 4],
    vector: u8,
}

impl Ctc {
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: [Channel::new(); 4],
            vector: 0,
        }
    }

    /// Write a channel register. `channel` is taken modulo 4.
    pub fn write(&mut self, channel: u8, value: u8) {
        let index = usize::from(channel & 0x03);
        let ch = &mut self.channels[index];
        if ch.tc_follows {
            ch.write_time_constant(value);
        } else if value & 0x01 != 0 {
            ch.write_control(value);
        } else if index == 0 {
            self.vector = value & 0xF8;
        }
    }

    /// Read a channel's current down-counter value.
    #[must_use]
    pub fn read(&self, channel: u8) -> u8 {
        self.channels[usize::from(channel & 0x03)].counter as u8
    }

    /// Advance every timer-mode channel by `clocks` system clocks.
    ///
    /// Returns the number of ZC/TO pulses of channels 0-2, for wiring to
    /// other inputs (including this chip's own CLK/TRG lines).
    pub fn tick_n(&mut self, clocks: u32) -> [u32; 3] {
        let mut pulses = [0; 3];
        for (index, ch) in self.channels.iter_mut().enumerate() {
            let zero_counts = ch.tick_timer(clocks);
            if let Some(out) = pulses.get_mut(index) {
                *out = zero_counts;
            }
        }
        pulses
    }

    /// Deliver `pulses` active edges to a channel's CLK/TRG input.
    ///
    /// Returns the ZC/TO pulses produced (always 0 for channel 3).
    pub fn external_update(&mut self, channel: u8, pulses: u32) -> u32 {
        let index = usize::from(channel & 0x03);
        let zero_counts = self.channels[index].trigger(pulses);
        if index == 3 { 0 } else { zero_counts }
    }

    /// Hardware reset. Power-on also forgets vector and time constants.
    pub fn reset(&mut self, power_on: bool) {
        for ch in &mut self.channels {
            ch.reset(power_on);
        }
        if power_on {
            self.vector = 0;
        }
    }

    /// Channel that would claim the next acknowledge cycle.
    fn requesting_channel(&self) -> Option<usize> {
        for (index, ch) in self.channels.iter().enumerate() {
            if ch.in_service {
                return None;
            }
            if ch.int_pending {
                return Some(index);
            }
        }
        None
    }
}

impl Default for Ctc {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSource for Ctc {
    fn is_interrupt_requested(&self) -> bool {
        self.requesting_channel().is_some()
    }

    /// Any channel in service counts for the whole chip, so a system
    /// chain holds off every new request, including from a channel with
    /// higher priority than the one in service, until the RETI.
    fn is_interrupt_accepted(&self) -> bool {
        self.channels.iter().any(|ch| ch.in_service)
    }

    fn interrupt_accept(&mut self) -> u8 {
        match self.requesting_channel() {
            Some(index) => {
                let ch = &mut self.channels[index];
                ch.int_pending = false;
                ch.in_service = true;
                self.vector | ((index as u8) << 1)
            }
            None => kc_core::OPEN_BUS,
        }
    }

    fn interrupt_finish(&mut self) {
        if let Some(ch) = self.channels.iter_mut().find(|ch| ch.in_service) {
            ch.in_service = false;
        }
    }
}

impl Observable for Ctc {
    fn query(&self, path: &str) -> Option<Value> {
        let (channel, field) = path.strip_prefix("channel")?.split_once('.')?;
        let ch = self.channels.get(channel.parse::<usize>().ok()?)?;
        match field {
            "counter" => Some(Value::U8(ch.counter as u8)),
            "control" => Some(Value::U8(ch.control)),
            "running" => Some(Value::Bool(ch.state == State::Running)),
            "pending" => Some(Value::Bool(ch.int_pending)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "channel<n>.counter",
            "channel<n>.control",
            "channel<n>.running",
            "channel<n>.pending",
        ]
    }
}

//! Zilog Z80 PIO (Parallel Input/Output).
//!
//! Two 8-bit ports, each with its own mode, interrupt vector and interrupt
//! logic. Port A has priority over port B in the chip's daisy chain.
//!
//! # Control words (written to the port's control register)
//!
//! | Pattern     | Meaning                                              |
//! |-------------|------------------------------------------------------|
//! | `xxxx xxx0` | Interrupt vector                                     |
//! | `mm xx 1111`| Mode select (0 output, 1 input, 2 bidirectional, 3 bit control); mode 3 is followed by the I/O mask |
//! | `eahm 0111` | Interrupt control: enable, AND/OR, high/low, mask follows |
//! | `e xxx 0011`| Interrupt enable flip-flop only                      |
//!
//! In bit-control mode an I/O mask bit of 1 makes the line an input; an
//! interrupt mask bit of 1 excludes the line from the interrupt condition.

use kc_core::{InterruptSource, OPEN_BUS, Observable, Value};

/// Port operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Output,
    Input,
    Bidirectional,
    BitControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    ControlWord,
    IoMask,
    InterruptMask,
}

#[derive(Debug, Clone, Copy)]
struct Port {
    mode: Mode,
    output: u8,
    input: u8,
    /// Bit-control mode direction mask (1 = input).
    io_mask: u8,
    vector: u8,
    int_enabled: bool,
    /// Bit-control condition: all monitored lines (AND) or any (OR).
    int_and: bool,
    /// Bit-control condition: lines active high.
    int_high: bool,
    /// 1 = line not monitored.
    int_mask: u8,
    /// Bit-control condition result at the last evaluation.
    condition: bool,
    expect: Expect,
    int_pending: bool,
    in_service: bool,
}

impl Port {
    const fn new() -> Self {
        Self {
            mode: Mode::Input,
            output: 0,
            input: 0,
            io_mask: 0xFF,
            vector: 0,
            int_enabled: false,
            int_and: false,
            int_high: false,
            int_mask: 0xFF,
            condition: false,
            expect: Expect::ControlWord,
            int_pending: false,
            in_service: false,
        }
    }

    fn write_control(&mut self, value: u8) {
        match self.expect {
            Expect::IoMask => {
                self.io_mask = value;
                self.expect = Expect::ControlWord;
                self.condition = self.condition_met();
                return;
            }
            Expect::InterruptMask => {
                self.int_mask = value;
                self.expect = Expect::ControlWord;
                self.condition = self.condition_met();
                return;
            }
            Expect::ControlWord => {}
        }
        if value & 0x01 == 0 {
            self.vector = value;
        } else if value & 0x0F == 0x0F {
            self.mode = match value >> 6 {
                0 => Mode::Output,
                1 => Mode::Input,
                2 => Mode::Bidirectional,
                _ => Mode::BitControl,
            };
            if self.mode == Mode::BitControl {
                self.expect = Expect::IoMask;
            }
        } else if value & 0x0F == 0x07 {
            self.int_enabled = value & 0x80 != 0;
            self.int_and = value & 0x40 != 0;
            self.int_high = value & 0x20 != 0;
            if value & 0x10 != 0 {
                self.expect = Expect::InterruptMask;
                self.int_pending = false;
            }
        } else if value & 0x0F == 0x03 {
            self.int_enabled = value & 0x80 != 0;
        }
    }

    /// Value the CPU reads from the data register.
    fn read(&self) -> u8 {
        match self.mode {
            Mode::Output => self.output,
            Mode::Input | Mode::Bidirectional => self.input,
            Mode::BitControl => (self.input & self.io_mask) | (self.output & !self.io_mask),
        }
    }

    fn put_in_value(&mut self, value: u8, mask: u8) {
        let old = self.input;
        self.input = (self.input & !mask) | (value & mask);
        match self.mode {
            Mode::Input | Mode::Bidirectional => {
                // Strobe on every new value
                if self.input != old && self.int_enabled {
                    self.int_pending = true;
                }
            }
            Mode::BitControl => {
                let condition = self.condition_met();
                if condition && !self.condition && self.int_enabled {
                    self.int_pending = true;
                }
                self.condition = condition;
            }
            Mode::Output => {}
        }
    }

    /// Bit-control interrupt condition over the monitored input lines.
    fn condition_met(&self) -> bool {
        let monitored = self.io_mask & !self.int_mask;
        if monitored == 0 {
            return false;
        }
        let levels = if self.int_high { self.input } else { !self.input };
        let active = levels & monitored;
        if self.int_and {
            active == monitored
        } else {
            active != 0
        }
    }

    fn reset(&mut self, power_on: bool) {
        let (vector, output) = (self.vector, self.output);
        *self = Self::new();
        if !power_on {
            self.vector = vector;
            self.output = output;
        }
    }
}

/// Which PIO port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortId {
    A,
    B,
}

/// Z80 PIO.
pub struct Pio {
    ports: [Port; 2],
}

impl Pio {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ports: [Port::new(); 2],
        }
    }

    fn port(&self, id: PortId) -> &Port {
        &self.ports[id as usize]
    }

    fn port_mut(&mut self, id: PortId) -> &mut Port {
        &mut self.ports[id as usize]
    }

    /// CPU read of a port's data register.
    #[must_use]
    pub fn read_port(&self, id: PortId) -> u8 {
        self.port(id).read()
    }

    /// CPU write to a port's data register.
    pub fn write_port(&mut self, id: PortId, value: u8) {
        self.port_mut(id).output = value;
    }

    /// The control register reads as open bus.
    #[must_use]
    pub fn read_control(&self, _id: PortId) -> u8 {
        OPEN_BUS
    }

    pub fn write_control(&mut self, id: PortId, value: u8) {
        self.port_mut(id).write_control(value);
    }

    /// Drive the external input lines selected by `mask`.
    pub fn put_in_value(&mut self, id: PortId, value: u8, mask: u8) {
        self.port_mut(id).put_in_value(value, mask);
    }

    /// Value on the output lines.
    #[must_use]
    pub fn output_value(&self, id: PortId) -> u8 {
        self.port(id).output
    }

    #[must_use]
    pub fn mode(&self, id: PortId) -> Mode {
        self.port(id).mode
    }

    /// Hardware reset. Power-on also clears vectors and output latches.
    pub fn reset(&mut self, power_on: bool) {
        for port in &mut self.ports {
            port.reset(power_on);
        }
    }

    fn requesting_port(&self) -> Option<usize> {
        for (index, port) in self.ports.iter().enumerate() {
            if port.in_service {
                return None;
            }
            if port.int_pending && port.int_enabled {
                return Some(index);
            }
        }
        None
    }
}

impl Default for Pio {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSource for Pio {
    fn is_interrupt_requested(&self) -> bool {
        self.requesting_port().is_some()
    }

    fn is_interrupt_accepted(&self) -> bool {
        self.ports.iter().any(|p| p.in_service)
    }

    fn interrupt_accept(&mut self) -> u8 {
        match self.requesting_port() {
            Some(index) => {
                let port = &mut self.ports[index];
                port.int_pending = false;
                port.in_service = true;
                port.vector
            }
            None => OPEN_BUS,
        }
    }

    fn interrupt_finish(&mut self) {
        if let Some(port) = self.ports.iter_mut().find(|p| p.in_service) {
            port.in_service = false;
        }
    }
}

impl Observable for Pio {
    fn query(&self, path: &str) -> Option<Value> {
        let (port, field) = path.split_once('.')?;
        let port = match port {
            "a" => self.port(PortId::A),
            "b" => self.port(PortId::B),
            _ => return None,
        };
        match field {
            "mode" => Some(Value::Text(format!("{:?}", port.mode))),
            "input" => Some(Value::U8(port.input)),
            "output" => Some(Value::U8(port.output)),
            "pending" => Some(Value::Bool(port.int_pending)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["a.mode", "a.input", "a.output", "a.pending", "b.mode", "b.input", "b.output", "b.pending"]
    }
}

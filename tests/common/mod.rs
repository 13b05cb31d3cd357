#![allow(dead_code)]

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use max7219_7seg::Max7219;

/// Reassembles the (address, data) frames the driver clocks out over its
/// three pins, so tests can assert on register traffic instead of raw edges.
#[derive(Default)]
struct BusState {
    din: bool,
    clk: bool,
    cs: bool,
    shift: u16,
    bits: u8,
    frames: Vec<(u8, u8)>,
}

impl BusState {
    fn set(&mut self, line: Line, level: bool) {
        match line {
            Line::Din => self.din = level,
            Line::Clk => {
                // data is sampled on the rising edge while selected
                if level && !self.clk && !self.cs {
                    self.shift = (self.shift << 1) | self.din as u16;
                    self.bits += 1;
                }
                self.clk = level;
            }
            Line::Cs => {
                if level && !self.cs && self.bits == 16 {
                    self.frames.push(((self.shift >> 8) as u8, self.shift as u8));
                }
                if !level {
                    self.shift = 0;
                    self.bits = 0;
                }
                self.cs = level;
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Line {
    Din,
    Clk,
    Cs,
}

#[derive(Clone, Default)]
pub struct MockBus(Rc<RefCell<BusState>>);

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn pin(&self, line: Line) -> MockPin {
        MockPin {
            bus: self.clone(),
            line,
        }
    }

    pub fn frames(&self) -> Vec<(u8, u8)> {
        self.0.borrow().frames.clone()
    }

    pub fn clear_frames(&self) {
        self.0.borrow_mut().frames.clear();
    }

    /// All data bytes written to one register, in order.
    pub fn writes_to(&self, register: u8) -> Vec<u8> {
        self.0
            .borrow()
            .frames
            .iter()
            .filter(|(addr, _)| *addr == register)
            .map(|(_, data)| *data)
            .collect()
    }

    pub fn last_write(&self, register: u8) -> Option<u8> {
        self.writes_to(register).last().copied()
    }

    /// Final contents of the eight digit registers (0x01..=0x08) after
    /// replaying all captured frames; `None` for registers never written.
    pub fn digit_registers(&self) -> [Option<u8>; 8] {
        let mut digits = [None; 8];
        for &(addr, data) in self.0.borrow().frames.iter() {
            if (0x01..=0x08).contains(&addr) {
                digits[(addr - 0x01) as usize] = Some(data);
            }
        }
        digits
    }
}

pub struct MockPin {
    bus: MockBus,
    line: Line,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bus.0.borrow_mut().set(self.line, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bus.0.borrow_mut().set(self.line, true);
        Ok(())
    }
}

pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub type TestDriver = Max7219<MockPin, MockPin, MockPin, NoopDelay>;

pub fn driver(num_digits: u8) -> (TestDriver, MockBus) {
    let bus = MockBus::new();
    let display = Max7219::new(
        bus.pin(Line::Din),
        bus.pin(Line::Clk),
        bus.pin(Line::Cs),
        NoopDelay,
        num_digits,
    );
    (display, bus)
}

/// Driver after `init()`, with the init traffic dropped from the capture.
pub fn init_driver(num_digits: u8) -> (TestDriver, MockBus) {
    let (mut display, bus) = driver(num_digits);
    display.init().unwrap();
    bus.clear_frames();
    (display, bus)
}

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use digio_can::core::fugit::TimerInstantU32;
use digio_can::core::{nb, Gpio, Monotonic, PinMode, Port, Transport};
use digio_can::embedded_can::{Id, StandardId};
use digio_can::frame::CanFrame;
use digio_can::param::{Param, Parameters};

pub const NODE_ID: i32 = 1;
pub const OUTPUT_ID: i32 = 0x110;
pub const INPUT_ID: i32 = 0x111;

/// Port register state shared between the test and the pin handles
#[derive(Default)]
pub struct PortState {
    pub input: [Cell<u16>; 5],
    pub output: [Cell<u16>; 5],
    pub configured: RefCell<Vec<(Port, u8, PinMode)>>,
    pub writes: Cell<usize>,
}

impl PortState {
    pub fn set_input(&self, port: Port, pin: u8, high: bool) {
        let input = &self.input[port.index()];
        if high {
            input.set(input.get() | 1 << pin);
        } else {
            input.set(input.get() & !(1 << pin));
        }
    }

    pub fn output_pin(&self, port: Port, pin: u8) -> bool {
        self.output[port.index()].get() & 1 << pin != 0
    }
}

pub struct MockGpio<'s>(pub &'s PortState);

impl Gpio for MockGpio<'_> {
    fn configure(&self, port: Port, pin: u8, mode: PinMode) {
        self.0.configured.borrow_mut().push((port, pin, mode));
    }

    fn input(&self, port: Port) -> u16 {
        self.0.input[port.index()].get()
    }

    fn output(&self, port: Port) -> u16 {
        self.0.output[port.index()].get()
    }

    fn set(&self, port: Port, mask: u16) {
        let output = &self.0.output[port.index()];
        output.set(output.get() | mask);
        self.0.writes.set(self.0.writes.get() + 1);
    }

    fn reset(&self, port: Port, mask: u16) {
        let output = &self.0.output[port.index()];
        output.set(output.get() & !mask);
        self.0.writes.set(self.0.writes.get() + 1);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Refused;

#[derive(Default)]
pub struct MockTransport {
    pub sent: Vec<CanFrame>,
    pub filters: Vec<Id>,
    pub cleared: usize,
    pub busy: bool,
    pub failing: bool,
    pub refuse_filters: bool,
}

impl Transport for MockTransport {
    type Frame = CanFrame;
    type Error = Refused;

    fn transmit(&mut self, frame: &CanFrame) -> nb::Result<(), Refused> {
        if self.busy {
            return Err(nb::Error::WouldBlock);
        }
        if self.failing {
            return Err(nb::Error::Other(Refused));
        }
        self.sent.push(*frame);
        Ok(())
    }

    fn register_user_message(&mut self, id: Id) -> Result<(), Refused> {
        if self.refuse_filters {
            return Err(Refused);
        }
        self.filters.push(id);
        Ok(())
    }

    fn clear_user_messages(&mut self) {
        self.filters.clear();
        self.cleared += 1;
    }
}

pub struct MockParams {
    ints: [Cell<i32>; 7],
    floats: [Cell<f32>; 7],
}

impl MockParams {
    pub fn new() -> Self {
        let params = Self {
            ints: Default::default(),
            floats: Default::default(),
        };
        params.set_int(Param::CanSpeed, 2);
        params.set_int(Param::CanPeriod, 0);
        params.set_int(Param::NodeId, NODE_ID);
        params.set_int(Param::OutputId, OUTPUT_ID);
        params.set_int(Param::InputId, INPUT_ID);
        params
    }

    pub fn float(&self, param: Param) -> f32 {
        self.floats[param as usize].get()
    }
}

impl Parameters for MockParams {
    fn get_int(&self, param: Param) -> i32 {
        self.ints[param as usize].get()
    }

    fn set_int(&self, param: Param, value: i32) {
        self.ints[param as usize].set(value);
    }

    fn set_float(&self, param: Param, value: f32) {
        self.floats[param as usize].set(value);
    }
}

#[derive(Default)]
pub struct MockWatchdog {
    pub feeds: usize,
}

impl embedded_hal::watchdog::Watchdog for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

/// Microsecond clock that only moves when told to
#[derive(Default)]
pub struct MockClock(pub Cell<u32>);

impl MockClock {
    pub fn advance(&self, us: u32) {
        self.0.set(self.0.get().wrapping_add(us));
    }
}

impl Monotonic for MockClock {
    fn now(&self) -> TimerInstantU32<1_000_000> {
        TimerInstantU32::from_ticks(self.0.get())
    }
}

pub fn standard_id(raw: u16) -> Id {
    Id::Standard(StandardId::new(raw).unwrap())
}

pub fn frame(raw: u16, data: &[u8]) -> CanFrame {
    CanFrame::new_data(StandardId::new(raw).unwrap(), data).unwrap()
}

pub fn command_frame(byte6: u8, byte7: u8) -> CanFrame {
    frame(OUTPUT_ID as u16, &[0, 0, 0, 0, 0, 0, byte6, byte7])
}

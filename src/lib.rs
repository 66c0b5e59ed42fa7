#![no_std]
#![warn(missing_docs)]
//! # digio-can
//!
//! ## Overview
//! Firmware core of a CAN node that bridges a fixed set of digital I/O lines
//! to a CAN bus.
//!
//! It provides the following features:
//!
//! - a declarative pin table ([`pin_table!`]) generating mode-typed pin
//!   handles; writing to an input does not compile and the table invariants
//!   are checked at compile time
//! - a tick-driven periodic scheduler with a compile-time bounded number of
//!   tasks and CPU load accounting
//! - the input-broadcast and output-command frame layouts and the bridge
//!   between them and the pins
//! - the wiring of the node: status LED, watchdog service and reaction to
//!   parameter changes
//!
//! The crate is platform agnostic. Port registers, the CAN controller and the
//! time source are reached through the traits of [`digio_can_core`], which a
//! target HAL implements. [`reg`] provides the GPIO implementation for
//! STM32F1 devices. The parameter store is external as well, see
//! [`param::Parameters`].
//!
//! ## Execution contexts
//!
//! After [`app::init`] the node runs in two interrupt contexts that do not
//! share mutable state:
//!
//! - the 1 ms timer interrupt calls [`app::TimerContext::on_tick`], which
//!   runs the 10 ms and 100 ms tasks,
//! - the CAN receive interrupt calls [`bridge::CommandSink::handle_rx`].
//!
//! Both touch disjoint bits of the GPIO ports only and read the parameter
//! store through shared references.
//!
//! ## Usage example
//!
//! ```no_run
//! # use core::cell::Cell;
//! # use digio_can::core::fugit::TimerInstantU32;
//! # use digio_can::core::{nb, Monotonic, Transport};
//! # use digio_can::embedded_can::{Id, StandardId};
//! # use digio_can::frame::CanFrame;
//! # use digio_can::param::{Param, Parameters};
//! # struct Can;
//! # impl Transport for Can {
//! #     type Frame = CanFrame;
//! #     type Error = ();
//! #     fn transmit(&mut self, _: &CanFrame) -> nb::Result<(), ()> { Ok(()) }
//! #     fn register_user_message(&mut self, _: Id) -> Result<(), ()> { Ok(()) }
//! #     fn clear_user_messages(&mut self) {}
//! # }
//! # struct Store(Cell<i32>);
//! # impl Parameters for Store {
//! #     fn get_int(&self, _: Param) -> i32 { self.0.get() }
//! #     fn set_int(&self, _: Param, value: i32) { self.0.set(value) }
//! #     fn set_float(&self, _: Param, _: f32) {}
//! # }
//! # struct Iwdg;
//! # impl embedded_hal::watchdog::Watchdog for Iwdg { fn feed(&mut self) {} }
//! # struct Timer;
//! # impl Monotonic for Timer {
//! #     fn now(&self) -> TimerInstantU32<1_000_000> { TimerInstantU32::from_ticks(0) }
//! # }
//! # let params = Store(Cell::new(0));
//! # let frame = CanFrame::new_data(StandardId::ZERO, &[0; 8]).unwrap();
//! use digio_can::board::Pins;
//! use digio_can::reg::Banks;
//!
//! let mut banks = unsafe { Banks::steal() };
//! let pins = Pins::configure(&mut banks);
//! let (mut timer, mut sink) = digio_can::app::init(pins, Can, &params, Iwdg).unwrap();
//!
//! // Timer interrupt, every millisecond
//! timer.on_tick(&Timer);
//!
//! // CAN receive interrupt
//! sink.handle_rx(&frame);
//! ```

#[macro_use]
mod fmt;

pub mod app;
pub mod board;
pub mod bridge;
pub mod config;
pub mod frame;
pub mod param;
pub mod pin;
pub mod prelude;
pub mod reg;
pub mod scheduler;

pub use digio_can_core as core;
pub use embedded_can;
pub use generic_array;

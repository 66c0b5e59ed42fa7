#![no_std]
#![warn(missing_docs)]

//! `digio-can-core` provides the thin integration layer between the platform
//! independent [`digio-can`] crate and the target HAL it runs on.
//!
//! Traits from this crate are not supposed to be implemented by the
//! application developer; implementations should be provided by target HALs
//! (or by test doubles).
//!
//! Integrators are responsible for the soundness of their implementations:
//! register access behind [`Gpio`] has to be safe to perform from both the
//! tick interrupt and the CAN receive interrupt, since the two contexts touch
//! disjoint bits of the same ports.
//!
//! [`digio-can`]: <https://docs.rs/crate/digio-can/>

pub use embedded_can;
pub use fugit;
pub use nb;

use embedded_can::{Frame, Id};

/// GPIO port identity
///
/// Every digital line of the node is addressed by a port and a bit index
/// `0..16` within that port.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Port {
    /// GPIOA
    A,
    /// GPIOB
    B,
    /// GPIOC
    C,
    /// GPIOD
    D,
    /// GPIOE
    E,
}

impl Port {
    /// All ports in register map order
    pub const ALL: [Port; 5] = [Port::A, Port::B, Port::C, Port::D, Port::E];

    /// Position of the port in [`Port::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Electrical configuration of a digital line
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PinMode {
    /// Push-pull output
    Output,
    /// Input without pull resistor
    InputFloating,
    /// Input with pull-up resistor
    InputPullUp,
    /// Input with pull-down resistor
    InputPullDown,
}

impl PinMode {
    /// `true` for every input flavour
    pub const fn is_input(self) -> bool {
        !matches!(self, PinMode::Output)
    }
}

/// Register level access to the GPIO ports of the target.
///
/// All methods take `&self`: implementations are expected to map directly
/// onto volatile register accesses (or atomic set/reset registers) so that
/// handles living in different interrupt contexts can drive disjoint bits of
/// the same port without locking.
///
/// Masks and levels are 16 bits wide, bit `n` corresponds to pin `n`.
///
/// # Example
/// ```no_run
/// use core::cell::Cell;
/// use digio_can_core::{Gpio, PinMode, Port};
///
/// struct FakePorts {
///     output: [Cell<u16>; 5],
/// }
///
/// impl Gpio for FakePorts {
///     fn configure(&self, _port: Port, _pin: u8, _mode: PinMode) {}
///     fn input(&self, port: Port) -> u16 {
///         self.output[port.index()].get()
///     }
///     fn output(&self, port: Port) -> u16 {
///         self.output[port.index()].get()
///     }
///     fn set(&self, port: Port, mask: u16) {
///         let o = &self.output[port.index()];
///         o.set(o.get() | mask);
///     }
///     fn reset(&self, port: Port, mask: u16) {
///         let o = &self.output[port.index()];
///         o.set(o.get() & !mask);
///     }
/// }
/// ```
pub trait Gpio {
    /// Program direction and pull configuration of a single pin.
    fn configure(&self, port: Port, pin: u8, mode: PinMode);
    /// Sampled input levels of the whole port.
    fn input(&self, port: Port) -> u16;
    /// Currently driven output levels of the whole port.
    fn output(&self, port: Port) -> u16;
    /// Drive every pin in `mask` high.
    fn set(&self, port: Port, mask: u16);
    /// Drive every pin in `mask` low.
    fn reset(&self, port: Port, mask: u16);
}

/// CAN transport used by the bridge.
///
/// The transport owns the CAN controller: bit timing, bus arbitration and
/// reliability are its concern. The bridge only submits frames and installs
/// acceptance filters; received frames are handed to the bridge by the
/// platform's receive interrupt.
pub trait Transport {
    /// Frame type the controller sends
    type Frame: Frame;
    /// Transport specific failure
    type Error: core::fmt::Debug;

    /// Puts a frame in the transmit queue. Fails with
    /// [`nb::Error::WouldBlock`] if the queue is full.
    fn transmit(&mut self, frame: &Self::Frame) -> nb::Result<(), Self::Error>;

    /// Installs an acceptance filter so that frames with `id` reach the
    /// receive path.
    fn register_user_message(&mut self, id: Id) -> Result<(), Self::Error>;

    /// Removes every acceptance filter installed through
    /// [`Transport::register_user_message`].
    fn clear_user_messages(&mut self);
}

/// Free running microsecond time source.
///
/// Used to measure time spent inside scheduled tasks. The counter is allowed
/// to wrap around.
pub trait Monotonic {
    /// Current time
    fn now(&self) -> fugit::TimerInstantU32<1_000_000>;
}

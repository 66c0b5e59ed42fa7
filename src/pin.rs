//! Mode-typed digital pin handles and the declarative pin table
//!
//! Every digital line of the node is declared once, in a single
//! [`pin_table!`](crate::pin_table) invocation. The macro expands into
//!
//! - a `const` array of [`PinSpec`] records (the pin table),
//! - a compile-time assertion that the table is valid (see [`check`]),
//! - a struct with one [`DigitalPin`] field per entry, typed by the entry's
//!   mode, and a `configure` constructor that programs the hardware in table
//!   order.
//!
//! Writing to an input or configuring a pin twice does not compile: write
//! operations only exist on `DigitalPin<_, _, Output>`, and `configure`
//! borrows the [`Gpio`] mutably for as long as the handles live.
//!
//! ```
//! use core::cell::Cell;
//! use digio_can::core::{Gpio, PinMode, Port};
//! use digio_can::pin::{Input, Output, PullUp};
//!
//! # #[derive(Default)]
//! # struct Fake { out: Cell<u16> }
//! # impl Gpio for Fake {
//! #     fn configure(&self, _: Port, _: u8, _: PinMode) {}
//! #     fn input(&self, _: Port) -> u16 { 0 }
//! #     fn output(&self, _: Port) -> u16 { self.out.get() }
//! #     fn set(&self, _: Port, m: u16) { self.out.set(self.out.get() | m) }
//! #     fn reset(&self, _: Port, m: u16) { self.out.set(self.out.get() & !m) }
//! # }
//! digio_can::pin_table! {
//!     /// Demo board
//!     pub struct DemoPins;
//!     /// Demo table
//!     pub const DEMO_TABLE;
//!     led: C, 13, Output;
//!     button: A, 0, Input<PullUp>;
//! }
//!
//! let mut gpio = Fake::default();
//! let mut pins = DemoPins::configure(&mut gpio);
//! pins.led.set();
//! assert!(pins.led.get());
//! assert_eq!(DEMO_TABLE[1].name, "button");
//! ```
//!
//! Handles are only created through the table; building one by hand is
//! `unsafe`:
//!
//! ```compile_fail
//! # use digio_can::core::{Gpio, PinMode, Port};
//! # use digio_can::pin::{DigitalPin, Output};
//! # struct Fake;
//! # impl Gpio for Fake {
//! #     fn configure(&self, _: Port, _: u8, _: PinMode) {}
//! #     fn input(&self, _: Port) -> u16 { 0 }
//! #     fn output(&self, _: Port) -> u16 { 0 }
//! #     fn set(&self, _: Port, _: u16) {}
//! #     fn reset(&self, _: Port, _: u16) {}
//! # }
//! let gpio = Fake;
//! let _alias = DigitalPin::<_, Output>::configure(&gpio, Port::B, 3);
//! ```

use crate::core::{Gpio, PinMode, Port};
use core::marker::PhantomData;
use void::Void;

mod private {
    // Sealed trait to keep the set of modes closed.
    pub trait Sealed {}
    impl Sealed for super::Output {}
    impl<P> Sealed for super::Input<P> {}
}

/// Marker type for a push-pull output pin.
pub struct Output;
/// Marker type for an input pin with pull configuration `P`.
pub struct Input<P>(PhantomData<P>);
/// Input without pull resistor
pub struct Floating;
/// Input with pull-up resistor
pub struct PullUp;
/// Input with pull-down resistor
pub struct PullDown;

/// Trait implemented by the mode marker types.
///
/// This trait is sealed; [`MODE`](Mode::MODE) is what gets programmed into
/// the hardware.
pub trait Mode: private::Sealed {
    /// Runtime representation of the mode
    const MODE: PinMode;
}

impl Mode for Output {
    const MODE: PinMode = PinMode::Output;
}
impl Mode for Input<Floating> {
    const MODE: PinMode = PinMode::InputFloating;
}
impl Mode for Input<PullUp> {
    const MODE: PinMode = PinMode::InputPullUp;
}
impl Mode for Input<PullDown> {
    const MODE: PinMode = PinMode::InputPullDown;
}

/// One entry of the pin table
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PinSpec {
    /// Symbolic name, unique within the table
    pub name: &'static str,
    /// Hardware port
    pub port: Port,
    /// Bit index within the port
    pub pin: u8,
    /// Electrical mode
    pub mode: PinMode,
}

/// Number of lines per port
pub const PINS_PER_PORT: u8 = 16;

/// Violations of the pin table invariants. Indices refer to table positions.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Pin index is not below [`PINS_PER_PORT`]
    PinOutOfRange(usize),
    /// Two entries drive the same `(port, pin)`
    DuplicateLocation(usize, usize),
    /// Two entries share a name
    DuplicateName(usize, usize),
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Validates a pin table.
///
/// `pin_table!` evaluates this in a `const` item, so an invalid table is a
/// build error. Entries are compared pairwise; the first violation found is
/// reported.
pub const fn check(table: &[PinSpec]) -> Result<(), TableError> {
    let mut i = 0;
    while i < table.len() {
        if table[i].pin >= PINS_PER_PORT {
            return Err(TableError::PinOutOfRange(i));
        }
        let mut j = i + 1;
        while j < table.len() {
            if table[i].port as u8 == table[j].port as u8 && table[i].pin == table[j].pin {
                return Err(TableError::DuplicateLocation(i, j));
            }
            if str_eq(table[i].name, table[j].name) {
                return Err(TableError::DuplicateName(i, j));
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

/// Typed handle to one digital line.
///
/// Generic parameters:
/// - `G`: register access, shared with every other handle of the table.
/// - `M`: mode marker ([`Output`] or [`Input`]).
///
/// The handle does not own the port register; it only refers to it. Exclusive
/// use of its bit follows from the pin table invariants.
pub struct DigitalPin<'a, G, M> {
    gpio: &'a G,
    port: Port,
    pin: u8,
    _mode: PhantomData<fn() -> M>,
}

impl<'a, G: Gpio, M: Mode> DigitalPin<'a, G, M> {
    /// Programs the hardware and creates the handle.
    ///
    /// Only meant to be called from the code generated by `pin_table!`.
    ///
    /// # Safety
    /// - `pin` must be below [`PINS_PER_PORT`].
    /// - No other handle may refer to `(port, pin)` for as long as the
    ///   returned one lives, and the line must not be configured again
    ///   meanwhile.
    #[doc(hidden)]
    pub unsafe fn configure(gpio: &'a G, port: Port, pin: u8) -> Self {
        debug_assert!(pin < PINS_PER_PORT, "pin index out of range");
        gpio.configure(port, pin, M::MODE);
        Self {
            gpio,
            port,
            pin,
            _mode: PhantomData,
        }
    }

    /// Mode the pin was configured with
    pub fn mode(&self) -> PinMode {
        M::MODE
    }
}

impl<G, M> DigitalPin<'_, G, M> {
    /// Hardware port of the pin
    pub fn port(&self) -> Port {
        self.port
    }

    /// Bit index of the pin within its port
    pub fn pin(&self) -> u8 {
        self.pin
    }

    #[inline]
    fn mask(&self) -> u16 {
        1 << self.pin
    }
}

impl<G: Gpio, P> DigitalPin<'_, G, Input<P>> {
    /// Sampled logic level
    pub fn get(&self) -> bool {
        self.gpio.input(self.port) & self.mask() != 0
    }
}

impl<G: Gpio> DigitalPin<'_, G, Output> {
    /// Level currently driven on the pin
    pub fn get(&self) -> bool {
        self.gpio.output(self.port) & self.mask() != 0
    }

    /// Drive the pin high.
    #[inline]
    pub fn set(&mut self) {
        self.gpio.set(self.port, self.mask());
    }

    /// Drive the pin low.
    #[inline]
    pub fn clear(&mut self) {
        self.gpio.reset(self.port, self.mask());
    }

    /// Drive the pin to `high`.
    pub fn set_state(&mut self, high: bool) {
        if high {
            self.set();
        } else {
            self.clear();
        }
    }

    /// Invert the driven level.
    pub fn toggle(&mut self) {
        let high = self.get();
        self.set_state(!high);
    }
}

impl<G: Gpio, P> embedded_hal::digital::v2::InputPin for DigitalPin<'_, G, Input<P>> {
    type Error = Void;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.get())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.get())
    }
}

impl<G: Gpio> embedded_hal::digital::v2::OutputPin for DigitalPin<'_, G, Output> {
    type Error = Void;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.clear();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set();
        Ok(())
    }
}

impl<G: Gpio> embedded_hal::digital::v2::StatefulOutputPin for DigitalPin<'_, G, Output> {
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        Ok(self.get())
    }

    fn is_set_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.get())
    }
}

impl<G: Gpio> embedded_hal::digital::v2::ToggleableOutputPin for DigitalPin<'_, G, Output> {
    type Error = Void;

    fn toggle(&mut self) -> Result<(), Self::Error> {
        DigitalPin::toggle(self);
        Ok(())
    }
}

/// Declares the pin table of a board.
///
/// ```text
/// pin_table! {
///     /// doc comments and attributes of the generated struct
///     pub struct Pins;
///     /// doc comments of the generated table
///     pub const PIN_TABLE;
///     name: Port, index, Mode;
///     ...
/// }
/// ```
///
/// `Port` is a variant of [`Port`](crate::core::Port), `Mode` one of the
/// marker types of this module and must be in scope at the call site.
/// See the [module documentation](crate::pin) for an example.
#[macro_export]
macro_rules! pin_table {
    (@count) => { 0usize };
    (@count $head:ident $($tail:ident)*) => { 1usize + $crate::pin_table!(@count $($tail)*) };
    (
        $(#[$smeta:meta])*
        $svis:vis struct $name:ident;
        $(#[$tmeta:meta])*
        $tvis:vis const $table:ident;
        $(
            $(#[$pmeta:meta])*
            $pin:ident : $port:ident, $index:literal, $mode:ty;
        )+
    ) => {
        $(#[$tmeta])*
        $tvis const $table: [$crate::pin::PinSpec; $crate::pin_table!(@count $($pin)+)] = [
            $(
                $crate::pin::PinSpec {
                    name: stringify!($pin),
                    port: $crate::core::Port::$port,
                    pin: $index,
                    mode: <$mode as $crate::pin::Mode>::MODE,
                },
            )+
        ];

        const _: () = assert!(
            matches!($crate::pin::check(&$table), Ok(())),
            "invalid pin table: pins must be unique, named uniquely and below 16"
        );

        $(#[$smeta])*
        $svis struct $name<'a, G: $crate::core::Gpio> {
            $(
                $(#[$pmeta])*
                pub $pin: $crate::pin::DigitalPin<'a, G, $mode>,
            )+
        }

        impl<'a, G: $crate::core::Gpio> $name<'a, G> {
            /// Configures every pin, in table order, and returns the handles.
            pub fn configure(gpio: &'a mut G) -> Self {
                let gpio: &'a G = gpio;
                Self {
                    $(
                        // SAFETY: the table is checked at compile time to name
                        // every line once and to stay below 16 pins per port;
                        // `gpio` stays borrowed mutably while handles live.
                        $pin: unsafe {
                            $crate::pin::DigitalPin::configure(
                                gpio,
                                $crate::core::Port::$port,
                                $index,
                            )
                        },
                    )+
                }
            }
        }
    };
}

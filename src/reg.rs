//! STM32F1 GPIO register access
//!
//! Reference [`Gpio`] implementation for the GPIO ports of STM32F1 devices.
//! Each port is a block of 32-bit registers; a pin is configured through a
//! 4-bit `CNF[1:0]:MODE[1:0]` field in `CRL` (pins 0..8) or `CRH`
//! (pins 8..16). Outputs are driven through the atomic `BSRR`/`BRR`
//! registers, so handles living in different interrupt contexts never
//! read-modify-write each other's bits.

use crate::core::{Gpio, PinMode, Port};
use vcell::VolatileCell;

/// Register layout of one GPIO port
#[repr(C)]
pub struct RegisterBlock {
    /// Port configuration register low (pins 0..8)
    pub crl: VolatileCell<u32>,
    /// Port configuration register high (pins 8..16)
    pub crh: VolatileCell<u32>,
    /// Input data register
    pub idr: VolatileCell<u32>,
    /// Output data register
    pub odr: VolatileCell<u32>,
    /// Bit set/reset register
    pub bsrr: VolatileCell<u32>,
    /// Bit reset register
    pub brr: VolatileCell<u32>,
    /// Configuration lock register
    pub lckr: VolatileCell<u32>,
}

impl RegisterBlock {
    /// Register block with every register zeroed. Useful as a stand-in for
    /// the peripheral in host tests.
    pub const fn new() -> Self {
        Self {
            crl: VolatileCell::new(0),
            crh: VolatileCell::new(0),
            idr: VolatileCell::new(0),
            odr: VolatileCell::new(0),
            bsrr: VolatileCell::new(0),
            brr: VolatileCell::new(0),
            lckr: VolatileCell::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Base addresses of GPIOA..GPIOE on STM32F1
pub const BASE_ADDRESSES: [usize; 5] = [
    0x4001_0800,
    0x4001_0C00,
    0x4001_1000,
    0x4001_1400,
    0x4001_1800,
];

// CNF[1:0]:MODE[1:0]
const OUTPUT_PUSH_PULL_50MHZ: u32 = 0b0011;
const INPUT_FLOATING: u32 = 0b0100;
const INPUT_PULL: u32 = 0b1000;

fn config_bits(mode: PinMode) -> u32 {
    match mode {
        PinMode::Output => OUTPUT_PUSH_PULL_50MHZ,
        PinMode::InputFloating => INPUT_FLOATING,
        PinMode::InputPullUp | PinMode::InputPullDown => INPUT_PULL,
    }
}

/// The GPIO ports of the device
pub struct Banks<'a> {
    ports: [&'a RegisterBlock; 5],
}

impl<'a> Banks<'a> {
    /// Creates the port set from register blocks ordered GPIOA..GPIOE.
    pub fn new(ports: [&'a RegisterBlock; 5]) -> Self {
        Self { ports }
    }

    fn regs(&self, port: Port) -> &RegisterBlock {
        self.ports[port.index()]
    }
}

impl Banks<'static> {
    /// Creates the port set from the fixed STM32F1 peripheral addresses.
    ///
    /// # Safety
    /// Must run on an STM32F1 with the GPIO port clocks enabled, and the
    /// pins managed through the returned value must not be accessed through
    /// any other abstraction.
    pub unsafe fn steal() -> Self {
        Self::new(BASE_ADDRESSES.map(|address| &*(address as *const RegisterBlock)))
    }
}

impl Gpio for Banks<'_> {
    fn configure(&self, port: Port, pin: u8, mode: PinMode) {
        let regs = self.regs(port);
        let (cr, shift) = if pin < 8 {
            (&regs.crl, u32::from(pin) * 4)
        } else {
            (&regs.crh, u32::from(pin - 8) * 4)
        };
        cr.set((cr.get() & !(0xf << shift)) | (config_bits(mode) << shift));
        // The pull direction of an input is selected by its output data bit
        match mode {
            PinMode::InputPullUp => regs.bsrr.set(1 << pin),
            PinMode::InputPullDown => regs.brr.set(1 << pin),
            PinMode::Output | PinMode::InputFloating => {}
        }
    }

    fn input(&self, port: Port) -> u16 {
        self.regs(port).idr.get() as u16
    }

    fn output(&self, port: Port) -> u16 {
        self.regs(port).odr.get() as u16
    }

    fn set(&self, port: Port, mask: u16) {
        self.regs(port).bsrr.set(mask.into());
    }

    fn reset(&self, port: Port, mask: u16) {
        self.regs(port).brr.set(mask.into());
    }
}

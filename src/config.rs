//! Node configuration
//!
//! Timer set-up for the scheduler tick and the decoding of the CAN related
//! integer parameters.

use core::ops::RangeInclusive;
use fugit::{HertzU32, RateExtU32};

/// Rate the tick timer counts at (10 µs resolution)
pub const COUNTER_RATE: HertzU32 = HertzU32::from_raw(100_000);

/// Timer counts per millisecond at [`COUNTER_RATE`]
pub const COUNTS_PER_MS: u32 = 100;

/// Longest task period that fits the 16-bit timer at [`COUNTER_RATE`]
pub const MAX_PERIOD_MS: u32 = u16::MAX as u32 / COUNTS_PER_MS;

/// Valid task periods in milliseconds
pub const PERIOD_RANGE_MS: RangeInclusive<u32> = 1..=MAX_PERIOD_MS;

/// Register values for the 16-bit timer that generates the scheduler tick.
///
/// The timer counts at [`COUNTER_RATE`] and reloads every millisecond.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TickTimer {
    /// Value for the prescaler register (divider minus one)
    pub prescaler: u16,
    /// Value for the auto-reload register (counts per tick minus one)
    pub reload: u16,
}

/// Misconfigurations of [`TickTimer`]
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// The timer clock is not a multiple of [`COUNTER_RATE`]
    NotDivisible {
        /// Provided timer clock in Hz
        timer_clock: u32,
    },
    /// The required divider is outside the wrapped range
    PrescalerOutOfRange(RangeInclusive<u32>),
}

impl TickTimer {
    /// Valid dividers of the 16-bit prescaler
    const DIVIDER_RANGE: RangeInclusive<u32> = 1..=(u16::MAX as u32 + 1);

    /// Computes the timer set-up for a timer fed with `timer_clock`.
    pub fn new(timer_clock: HertzU32) -> Result<Self, TimerError> {
        if let Some(0) = timer_clock.to_Hz().checked_rem(COUNTER_RATE.to_Hz()) {
            let divider = timer_clock / COUNTER_RATE;
            if !Self::DIVIDER_RANGE.contains(&divider) {
                Err(TimerError::PrescalerOutOfRange(Self::DIVIDER_RANGE))
            } else {
                Ok(Self {
                    prescaler: (divider - 1) as u16,
                    reload: (COUNTS_PER_MS - 1) as u16,
                })
            }
        } else {
            Err(TimerError::NotDivisible {
                timer_clock: timer_clock.to_Hz(),
            })
        }
    }
}

/// Value of a parameter that does not map to a setting
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The wrapped value is not one of the enumerated choices
    InvalidValue(i32),
}

/// Cadence of the input-broadcast frame (`canperiod` parameter)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanPeriod {
    /// Every 100 ms (`0`)
    Ms100 = 0,
    /// Every 10 ms (`1`)
    Ms10 = 1,
}

impl TryFrom<i32> for CanPeriod {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Ms100),
            1 => Ok(Self::Ms10),
            other => Err(ConfigError::InvalidValue(other)),
        }
    }
}

/// CAN bus speed (`canspeed` parameter)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanSpeed {
    /// 125 kbit/s (`0`)
    Baud125 = 0,
    /// 250 kbit/s (`1`)
    Baud250 = 1,
    /// 500 kbit/s (`2`)
    Baud500 = 2,
    /// 800 kbit/s (`3`)
    Baud800 = 3,
    /// 1 Mbit/s (`4`)
    Baud1000 = 4,
}

impl CanSpeed {
    /// Nominal bit rate, to be handed to the transport's bit timing set-up
    pub fn bitrate(self) -> HertzU32 {
        match self {
            Self::Baud125 => 125.kHz(),
            Self::Baud250 => 250.kHz(),
            Self::Baud500 => 500.kHz(),
            Self::Baud800 => 800.kHz(),
            Self::Baud1000 => 1.MHz(),
        }
    }
}

impl TryFrom<i32> for CanSpeed {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Baud125),
            1 => Ok(Self::Baud250),
            2 => Ok(Self::Baud500),
            3 => Ok(Self::Baud800),
            4 => Ok(Self::Baud1000),
            other => Err(ConfigError::InvalidValue(other)),
        }
    }
}

//! Periodic task scheduler
//!
//! The scheduler is driven by a single recurring timer interrupt with a 1 ms
//! tick (see [`TickTimer`](crate::config::TickTimer)). On every tick each
//! registered task's elapsed counter advances; a task whose counter reaches
//! its period runs to completion, in registration order, inside the tick
//! and its counter restarts from zero.
//!
//! Tasks are plain functions receiving the context the scheduler was started
//! with. There is no preemption among tasks and no recovery from a task that
//! never returns: the hardware watchdog, serviced by one of the tasks, resets
//! the node in that case.

use crate::config::PERIOD_RANGE_MS;
use crate::core::Monotonic;
use core::ops::RangeInclusive;
use fugit::MillisDurationU32;
use generic_array::{
    typenum::{consts::*, IsLessOrEqual, LeEq, Same},
    ArrayLength, GenericArray,
};

/// Length of one tick in microseconds
pub const TICK_US: u32 = 1_000;

/// Number of ticks the CPU load is averaged over
pub const LOAD_WINDOW_TICKS: u32 = 100;

/// Tasks a scheduler can hold at most, one per compare channel of the timer
pub type MaxTasks = U4;

/// [`generic_array::ArrayLength`] with an upper bound.
pub trait LimitedArrayLength<T, MaxLength>: ArrayLength<T> {}
impl<T, N, MaxLength> LimitedArrayLength<T, MaxLength> for N
where
    N: ArrayLength<T> + IsLessOrEqual<MaxLength>,
    LeEq<N, MaxLength>: Same<True>,
{
}

/// Errors that may occur while registering tasks
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Period in milliseconds is outside the wrapped `RangeInclusive`
    PeriodOutOfRange(RangeInclusive<u32>),
    /// Every task slot is already taken
    TooManyTasks,
}

/// A registered periodic task
pub struct Task<Ctx> {
    action: fn(&mut Ctx),
    period: u16,
    elapsed: u16,
}

impl<Ctx> Task<Ctx> {
    /// Period in milliseconds
    pub fn period(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.period.into())
    }
}

/// Share of tick time spent inside task bodies, in per mille
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CpuLoad(u16);

impl CpuLoad {
    /// Fully loaded
    pub const FULL: CpuLoad = CpuLoad(1000);

    /// Load in per mille, `0..=1000`
    pub fn permille(self) -> u16 {
        self.0
    }

    /// Load in percent, `0.0..=100.0`
    pub fn percent(self) -> f32 {
        f32::from(self.0) / 10.0
    }
}

/// Fixed capacity periodic scheduler.
///
/// `N` is the number of task slots, at most [`MaxTasks`].
pub struct Scheduler<Ctx, N = MaxTasks>
where
    N: LimitedArrayLength<Option<Task<Ctx>>, MaxTasks>,
{
    tasks: GenericArray<Option<Task<Ctx>>, N>,
    window_ticks: u32,
    window_busy_us: u32,
    load: CpuLoad,
}

impl<Ctx, N> Scheduler<Ctx, N>
where
    N: LimitedArrayLength<Option<Task<Ctx>>, MaxTasks>,
{
    /// Creates a scheduler without tasks.
    pub fn new() -> Self {
        Self {
            tasks: GenericArray::default(),
            window_ticks: 0,
            window_busy_us: 0,
            load: CpuLoad::default(),
        }
    }

    /// Registers `action` to run every `period`.
    ///
    /// Returns the slot of the task. Tasks registered earlier run first
    /// within a tick.
    pub fn add_task(
        &mut self,
        action: fn(&mut Ctx),
        period: MillisDurationU32,
    ) -> Result<usize, Error> {
        let period = period.ticks();
        if !PERIOD_RANGE_MS.contains(&period) {
            return Err(Error::PeriodOutOfRange(PERIOD_RANGE_MS));
        }
        let index = self
            .tasks
            .iter()
            .position(Option::is_none)
            .ok_or(Error::TooManyTasks)?;
        self.tasks[index] = Some(Task {
            action,
            period: period as u16,
            elapsed: 0,
        });
        debug!("task {} registered, period {} ms", index, period);
        Ok(index)
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.iter().flatten().count()
    }

    /// Returns `true` if no task is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of tasks the scheduler can hold
    pub fn capacity(&self) -> usize {
        self.tasks.len()
    }

    /// Registered tasks, in registration order
    pub fn tasks(&self) -> impl Iterator<Item = &Task<Ctx>> {
        self.tasks.iter().flatten()
    }

    /// Processes one tick. To be called from the timer interrupt.
    ///
    /// `clock` is sampled around every task that runs to account for the
    /// time spent in it.
    pub fn run<C: Monotonic>(&mut self, ctx: &mut Ctx, clock: &C) {
        let mut busy_us = 0_u32;
        for task in self.tasks.iter_mut().flatten() {
            task.elapsed += 1;
            if task.elapsed >= task.period {
                task.elapsed = 0;
                let start = clock.now();
                (task.action)(ctx);
                let end = clock.now();
                busy_us = busy_us.saturating_add(end.ticks().wrapping_sub(start.ticks()));
            }
        }
        self.account(busy_us);
    }

    fn account(&mut self, busy_us: u32) {
        self.window_busy_us = self.window_busy_us.saturating_add(busy_us);
        self.window_ticks += 1;
        if self.window_ticks >= LOAD_WINDOW_TICKS {
            let window_us = u64::from(LOAD_WINDOW_TICKS * TICK_US);
            let permille = u64::from(self.window_busy_us) * 1000 / window_us;
            self.load = CpuLoad(permille.min(1000) as u16);
            self.window_ticks = 0;
            self.window_busy_us = 0;
        }
    }

    /// CPU load over the last completed window of [`LOAD_WINDOW_TICKS`]
    /// ticks. Zero until the first window completes.
    pub fn cpu_load(&self) -> CpuLoad {
        self.load
    }
}

impl<Ctx, N> Default for Scheduler<Ctx, N>
where
    N: LimitedArrayLength<Option<Task<Ctx>>, MaxTasks>,
{
    fn default() -> Self {
        Self::new()
    }
}

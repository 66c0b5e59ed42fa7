//! Node wiring
//!
//! [`init`] configures the node and hands out the state of its two execution
//! contexts:
//!
//! - [`TimerContext`] belongs to the timer interrupt. It owns the scheduler,
//!   the status LED, the watchdog, the transport and the outbound half of the
//!   bridge.
//! - [`CommandSink`] belongs to the CAN receive interrupt.
//!
//! ```text
//! #[interrupt]
//! fn TIM2() { timer_context.on_tick(&clock) }
//!
//! #[interrupt]
//! fn USB_LP_CAN_RX0() { command_sink.handle_rx(&frame); }
//! ```

use crate::board::{Parts, Pins, StatusLed};
use crate::bridge::{set_can_filters, Broadcaster, CanIoBridge, CommandSink};
use crate::config::CanPeriod;
use crate::core::{Gpio, Monotonic, Transport};
use crate::param::{Param, Parameters};
use crate::scheduler::{self, CpuLoad, Scheduler};
use embedded_hal::watchdog::Watchdog;
use fugit::ExtU32;

/// Interface version published through the `version` parameter
pub const VERSION: i32 = 4;

/// Data the periodic tasks operate on
pub struct Node<'a, G, T, P, W> {
    led: StatusLed<'a, G>,
    broadcaster: Broadcaster<'a, G, P>,
    transport: T,
    params: &'a P,
    watchdog: W,
    load: CpuLoad,
}

fn ms10_task<G, T, P, W>(node: &mut Node<'_, G, T, P, W>)
where
    G: Gpio,
    T: Transport,
    P: Parameters,
{
    node.broadcaster.on_period(CanPeriod::Ms10, &mut node.transport);
}

fn ms100_task<G, T, P, W>(node: &mut Node<'_, G, T, P, W>)
where
    G: Gpio,
    T: Transport,
    P: Parameters,
    W: Watchdog,
{
    node.led.toggle();
    node.watchdog.feed();
    node.params.set_float(Param::CpuLoad, node.load.percent());
    node.broadcaster.on_period(CanPeriod::Ms100, &mut node.transport);
}

/// State of the timer interrupt
pub struct TimerContext<'a, G, T, P, W> {
    scheduler: Scheduler<Node<'a, G, T, P, W>>,
    node: Node<'a, G, T, P, W>,
}

impl<'a, G, T, P, W> TimerContext<'a, G, T, P, W>
where
    G: Gpio,
    T: Transport,
    P: Parameters,
    W: Watchdog,
{
    /// Processes one scheduler tick. To be called every millisecond.
    pub fn on_tick<C: Monotonic>(&mut self, clock: &C) {
        self.node.load = self.scheduler.cpu_load();
        self.scheduler.run(&mut self.node, clock);
    }

    /// Reacts to a changed parameter.
    ///
    /// A change of `outputid`, `inputid` or `nodeid` reinstalls the
    /// acceptance filters. Must not run concurrently with
    /// [`on_tick`](Self::on_tick).
    pub fn on_param_change(&mut self, param: Param) {
        if param.affects_filters() {
            debug!("identifier changed, reinstalling filters");
            self.node.transport.clear_user_messages();
            set_can_filters(&mut self.node.transport, self.node.params);
        }
    }

    /// CPU load of the last measurement window
    pub fn cpu_load(&self) -> CpuLoad {
        self.scheduler.cpu_load()
    }

    /// Level driven on the status LED
    pub fn led(&self) -> bool {
        self.node.led.get()
    }

    /// The transport
    pub fn transport(&self) -> &T {
        &self.node.transport
    }

    /// The transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.node.transport
    }

    /// The watchdog
    pub fn watchdog(&self) -> &W {
        &self.node.watchdog
    }
}

/// Brings the node up.
///
/// Splits `pins` by owner, publishes [`VERSION`], installs the acceptance
/// filters and registers the 10 ms and 100 ms tasks, in that order. The
/// spare outputs stay configured and are not driven afterwards.
pub fn init<'a, G, T, P, W>(
    pins: Pins<'a, G>,
    mut transport: T,
    params: &'a P,
    watchdog: W,
) -> Result<(TimerContext<'a, G, T, P, W>, CommandSink<'a, G, P>), scheduler::Error>
where
    G: Gpio,
    T: Transport,
    P: Parameters,
    W: Watchdog,
{
    let Parts {
        led,
        outputs,
        inputs,
        spare: _,
    } = pins.split();
    let (broadcaster, sink) = CanIoBridge::new(inputs, outputs, params).split();

    params.set_int(Param::Version, VERSION);
    transport.clear_user_messages();
    set_can_filters(&mut transport, params);

    let mut scheduler: Scheduler<Node<'a, G, T, P, W>> = Scheduler::new();
    scheduler.add_task(ms10_task, 10.millis())?;
    scheduler.add_task(ms100_task, 100.millis())?;

    let node = Node {
        led,
        broadcaster,
        transport,
        params,
        watchdog,
        load: CpuLoad::default(),
    };
    Ok((TimerContext { scheduler, node }, sink))
}

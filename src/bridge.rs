//! Mapping between pin states and CAN frames
//!
//! [`CanIoBridge`] is split into two halves with a single owner each:
//!
//! - [`Broadcaster`] samples the inputs and sends the input-broadcast frame.
//!   It lives in the tick context.
//! - [`CommandSink`] decodes output-command frames and drives the outputs.
//!   It lives in the CAN receive context.
//!
//! Both read their identifiers from the parameter store on every use, so a
//! changed `inputid`/`outputid` takes effect with the next frame.
//!
//! Runtime failures never propagate: a frame that cannot be sent is dropped,
//! a frame that cannot be decoded is ignored. Neither is retried.

use crate::board::{BroadcastInputs, CommandOutputs};
use crate::config::CanPeriod;
use crate::core::{Gpio, Transport};
use crate::frame::{id_from_raw, raw_id, InputBroadcast, OutputCommand};
use crate::param::{Param, Parameters};
use embedded_can::Frame;

/// Base identifier of remote parameter access requests; the node id is added.
pub const SDO_REQUEST_BASE: i32 = 0x600;

/// Input and output halves bound to the parameter store
pub struct CanIoBridge<'a, G, P> {
    inputs: BroadcastInputs<'a, G>,
    outputs: CommandOutputs<'a, G>,
    params: &'a P,
}

impl<'a, G: Gpio, P: Parameters> CanIoBridge<'a, G, P> {
    /// Creates the bridge.
    pub fn new(
        inputs: BroadcastInputs<'a, G>,
        outputs: CommandOutputs<'a, G>,
        params: &'a P,
    ) -> Self {
        Self {
            inputs,
            outputs,
            params,
        }
    }

    /// Splits the bridge into its outbound and inbound half.
    pub fn split(self) -> (Broadcaster<'a, G, P>, CommandSink<'a, G, P>) {
        (
            Broadcaster {
                inputs: self.inputs,
                params: self.params,
            },
            CommandSink {
                outputs: self.outputs,
                params: self.params,
            },
        )
    }
}

/// Outbound half: input pins to input-broadcast frames
pub struct Broadcaster<'a, G, P> {
    inputs: BroadcastInputs<'a, G>,
    params: &'a P,
}

impl<G: Gpio, P: Parameters> Broadcaster<'_, G, P> {
    /// Samples the inputs and submits one input-broadcast frame.
    ///
    /// If the transmit queue is full or the transport fails, the frame is
    /// dropped. Nothing is sent while `inputid` is not a valid identifier.
    pub fn broadcast<T: Transport>(&mut self, transport: &mut T) {
        let raw = self.params.get_int(Param::InputId);
        let id = match id_from_raw(raw) {
            Some(id) => id,
            None => {
                warn!("inputid {} is not a CAN identifier, broadcast skipped", raw);
                return;
            }
        };
        let payload = self.inputs.sample().to_payload();
        let frame = match T::Frame::new(id, &payload) {
            Some(frame) => frame,
            None => return,
        };
        match transport.transmit(&frame) {
            Ok(()) => trace!("inputs {=[u8]} sent", &payload[7..]),
            Err(nb::Error::WouldBlock) => warn!("transmit queue full, broadcast dropped"),
            Err(nb::Error::Other(_)) => warn!("transport error, broadcast dropped"),
        }
    }

    /// Broadcasts if the `canperiod` parameter selects `period`.
    ///
    /// Called from every periodic task that may carry the broadcast.
    pub fn on_period<T: Transport>(&mut self, period: CanPeriod, transport: &mut T) {
        if CanPeriod::try_from(self.params.get_int(Param::CanPeriod)) == Ok(period) {
            self.broadcast(transport);
        }
    }

    /// Inputs as they would be broadcast now
    pub fn sample(&self) -> InputBroadcast {
        self.inputs.sample()
    }
}

/// Inbound half: output-command frames to output pins
pub struct CommandSink<'a, G, P> {
    outputs: CommandOutputs<'a, G>,
    params: &'a P,
}

impl<G: Gpio, P: Parameters> CommandSink<'_, G, P> {
    /// Handles a received frame.
    ///
    /// Returns `false` if the frame is not addressed to the bridge, i.e. its
    /// identifier differs from `outputid`; such frames are left for other
    /// consumers. Addressed remote frames and frames carrying fewer than 8
    /// bytes are consumed without touching any output. Otherwise all mapped
    /// outputs are written.
    pub fn handle_rx<F: Frame>(&mut self, frame: &F) -> bool {
        match id_from_raw(self.params.get_int(Param::OutputId)) {
            Some(id) if id == frame.id() => {}
            _ => return false,
        }
        if frame.is_remote_frame() {
            warn!("remote command frame ignored");
            return true;
        }
        match OutputCommand::from_payload(frame.data()) {
            Some(command) => {
                trace!("command {=u16:#x} applied", command.bits());
                self.outputs.apply(command);
            }
            None => warn!("command frame with {} bytes ignored", frame.dlc()),
        }
        true
    }

    /// Output levels currently driven
    pub fn outputs(&self) -> OutputCommand {
        self.outputs.snapshot()
    }
}

/// Installs the acceptance filters of the node: the remote parameter access
/// request id (`0x600 + nodeid`) and `outputid`.
///
/// Identifiers that are not valid CAN identifiers are skipped, as are
/// filters the transport refuses.
pub fn set_can_filters<T: Transport, P: Parameters>(transport: &mut T, params: &P) {
    let sdo = params.get_int(Param::NodeId).checked_add(SDO_REQUEST_BASE);
    register(transport, sdo);
    register(transport, Some(params.get_int(Param::OutputId)));
}

fn register<T: Transport>(transport: &mut T, raw: Option<i32>) {
    match raw.and_then(id_from_raw) {
        Some(id) => match transport.register_user_message(id) {
            Ok(()) => debug!("filter {:#x} installed", raw_id(id)),
            Err(_) => warn!("filter {:#x} refused by transport", raw_id(id)),
        },
        None => warn!("invalid CAN identifier, filter skipped"),
    }
}

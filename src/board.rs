//! Pin table of the node and the partition of its handles
//!
//! Every line is owned by exactly one execution context after
//! [`Pins::split`]:
//!
//! - [`StatusLed`]: the 100 ms task,
//! - [`CommandOutputs`]: the receive path, written from command frames,
//! - [`BroadcastInputs`]: the broadcast path, sampled periodically,
//! - [`SpareOutputs`]: nobody; configured as outputs and left low.

use crate::core::Gpio;
use crate::frame::{InputBroadcast, OutputCommand};
use crate::pin::{DigitalPin, Floating, Input, Output, PullDown, PullUp};

crate::pin_table! {
    /// Every digital line of the node, configured in table order.
    pub struct Pins;
    /// Pin table of the node
    pub const PIN_TABLE;
    /// Status LED, toggled every 100 ms
    led_out: C, 13, Output;
    /// General purpose output 1
    gp_out: B, 3, Output;
    /// Spare output
    notparkout: B, 4, Output;
    /// Spare output
    park_out: B, 5, Output;
    /// Park release output
    parkrel_out: B, 6, Output;
    /// Line output
    line_out: B, 7, Output;
    /// Torque converter clutch output
    tcc_out: B, 8, Output;
    /// Output C
    c_out: B, 9, Output;
    /// Output A
    a_out: A, 6, Output;
    /// Output B
    b_out: A, 7, Output;
    /// General purpose output 2
    gp2_out: A, 15, Output;
    /// Output D
    d_out: B, 12, Output;
    /// Output E
    e_out: B, 13, Output;
    /// Park high level output
    parkhl_out: B, 14, Output;
    /// General purpose input 1
    gp_in: A, 8, Input<PullUp>;
    /// General purpose input 2
    gp2_in: B, 1, Input<PullDown>;
    /// Not-in-park input
    notpark_in: B, 0, Input<Floating>;
}

/// The status LED
pub type StatusLed<'a, G> = DigitalPin<'a, G, Output>;

/// Outputs driven by output-command frames
pub struct CommandOutputs<'a, G> {
    gp_out: DigitalPin<'a, G, Output>,
    gp2_out: DigitalPin<'a, G, Output>,
    a_out: DigitalPin<'a, G, Output>,
    b_out: DigitalPin<'a, G, Output>,
    c_out: DigitalPin<'a, G, Output>,
    d_out: DigitalPin<'a, G, Output>,
    e_out: DigitalPin<'a, G, Output>,
    parkrel_out: DigitalPin<'a, G, Output>,
    parkhl_out: DigitalPin<'a, G, Output>,
    line_out: DigitalPin<'a, G, Output>,
    tcc_out: DigitalPin<'a, G, Output>,
}

impl<G: Gpio> CommandOutputs<'_, G> {
    /// Drives every mapped output to the state given by `command`.
    pub fn apply(&mut self, command: OutputCommand) {
        self.gp_out.set_state(command.gp_out());
        self.gp2_out.set_state(command.gp2_out());
        self.a_out.set_state(command.a_out());
        self.b_out.set_state(command.b_out());
        self.c_out.set_state(command.c_out());
        self.d_out.set_state(command.d_out());
        self.e_out.set_state(command.e_out());
        self.parkrel_out.set_state(command.parkrel_out());
        self.parkhl_out.set_state(command.parkhl_out());
        self.line_out.set_state(command.line_out());
        self.tcc_out.set_state(command.tcc_out());
    }

    /// Reads the driven levels back into a command.
    pub fn snapshot(&self) -> OutputCommand {
        let mut command = OutputCommand::default();
        command.set_gp_out(self.gp_out.get());
        command.set_gp2_out(self.gp2_out.get());
        command.set_a_out(self.a_out.get());
        command.set_b_out(self.b_out.get());
        command.set_c_out(self.c_out.get());
        command.set_d_out(self.d_out.get());
        command.set_e_out(self.e_out.get());
        command.set_parkrel_out(self.parkrel_out.get());
        command.set_parkhl_out(self.parkhl_out.get());
        command.set_line_out(self.line_out.get());
        command.set_tcc_out(self.tcc_out.get());
        command
    }
}

/// Inputs reported by input-broadcast frames
pub struct BroadcastInputs<'a, G> {
    gp_in: DigitalPin<'a, G, Input<PullUp>>,
    gp2_in: DigitalPin<'a, G, Input<PullDown>>,
    notpark_in: DigitalPin<'a, G, Input<Floating>>,
}

impl<G: Gpio> BroadcastInputs<'_, G> {
    /// Samples the inputs.
    pub fn sample(&self) -> InputBroadcast {
        let mut inputs = InputBroadcast::default();
        inputs.set_gp_in(self.gp_in.get());
        inputs.set_gp2_in(self.gp2_in.get());
        inputs.set_notpark_in(self.notpark_in.get());
        inputs
    }
}

/// Outputs without a function on this node
pub struct SpareOutputs<'a, G> {
    /// `notparkout`
    pub notparkout: DigitalPin<'a, G, Output>,
    /// `park_out`
    pub park_out: DigitalPin<'a, G, Output>,
}

/// Pin handles grouped by owner
pub struct Parts<'a, G> {
    /// Status LED
    pub led: StatusLed<'a, G>,
    /// Command outputs
    pub outputs: CommandOutputs<'a, G>,
    /// Broadcast inputs
    pub inputs: BroadcastInputs<'a, G>,
    /// Spare outputs
    pub spare: SpareOutputs<'a, G>,
}

impl<'a, G: Gpio> Pins<'a, G> {
    /// Partitions the handles by owner.
    pub fn split(self) -> Parts<'a, G> {
        Parts {
            led: self.led_out,
            outputs: CommandOutputs {
                gp_out: self.gp_out,
                gp2_out: self.gp2_out,
                a_out: self.a_out,
                b_out: self.b_out,
                c_out: self.c_out,
                d_out: self.d_out,
                e_out: self.e_out,
                parkrel_out: self.parkrel_out,
                parkhl_out: self.parkhl_out,
                line_out: self.line_out,
                tcc_out: self.tcc_out,
            },
            inputs: BroadcastInputs {
                gp_in: self.gp_in,
                gp2_in: self.gp2_in,
                notpark_in: self.notpark_in,
            },
            spare: SpareOutputs {
                notparkout: self.notparkout,
                park_out: self.park_out,
            },
        }
    }
}

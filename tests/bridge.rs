mod common;

use common::*;
use digio_can::board::{Parts, Pins};
use digio_can::bridge::{set_can_filters, Broadcaster, CanIoBridge, CommandSink};
use digio_can::config::CanPeriod;
use digio_can::core::Port;
use digio_can::embedded_can::{ExtendedId, Id, StandardId};
use digio_can::frame::CanFrame;
use digio_can::param::{Param, Parameters};
use digio_can::prelude::*;

type Halves<'a> = (
    Broadcaster<'a, MockGpio<'a>, MockParams>,
    CommandSink<'a, MockGpio<'a>, MockParams>,
);

fn bridge<'a>(gpio: &'a mut MockGpio<'a>, params: &'a MockParams) -> Halves<'a> {
    let Parts {
        outputs, inputs, ..
    } = Pins::configure(gpio).split();
    CanIoBridge::new(inputs, outputs, params).split()
}

/// (port, pin) of each command output, in command bit order
const COMMAND_PINS: [(Port, u8); 11] = [
    (Port::B, 3),
    (Port::A, 15),
    (Port::A, 6),
    (Port::A, 7),
    (Port::B, 9),
    (Port::B, 12),
    (Port::B, 13),
    (Port::B, 6),
    (Port::B, 14),
    (Port::B, 7),
    (Port::B, 8),
];

fn driven(ports: &PortState) -> Vec<bool> {
    COMMAND_PINS
        .iter()
        .map(|&(port, pin)| ports.output_pin(port, pin))
        .collect()
}

#[test]
fn command_frame_drives_mapped_outputs() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (_broadcaster, mut sink) = bridge(&mut gpio, &params);

    assert!(sink.handle_rx(&command_frame(0b0000_0010, 0b1000_0001)));

    let expected = [
        true, false, false, false, false, false, false, true, false, true, false,
    ];
    assert_eq!(driven(&ports), expected);
    assert!(sink.outputs().gp_out());
    assert!(sink.outputs().parkrel_out());
    assert!(sink.outputs().line_out());
}

#[test]
fn command_frame_clears_outputs_not_set() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (_broadcaster, mut sink) = bridge(&mut gpio, &params);

    sink.handle_rx(&command_frame(0xff, 0xff));
    assert!(driven(&ports).iter().all(|&high| high));
    sink.handle_rx(&command_frame(0, 0));
    assert!(driven(&ports).iter().all(|&high| !high));
}

#[test]
fn unmapped_bits_do_not_reach_other_pins() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (_broadcaster, mut sink) = bridge(&mut gpio, &params);

    let frame = frame(OUTPUT_ID as u16, &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xf8, 0]);
    assert!(sink.handle_rx(&frame));
    assert!(driven(&ports).iter().all(|&high| !high));
    // Status LED and spare outputs
    assert!(!ports.output_pin(Port::C, 13));
    assert!(!ports.output_pin(Port::B, 4));
    assert!(!ports.output_pin(Port::B, 5));
}

#[test]
fn short_frames_do_not_touch_pins() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (_broadcaster, mut sink) = bridge(&mut gpio, &params);

    for len in [0, 1, 6, 7] {
        let frame = frame(OUTPUT_ID as u16, &[0xff; 8][..len]);
        assert!(sink.handle_rx(&frame));
    }
    assert_eq!(ports.writes.get(), 0);
}

#[test]
fn remote_frames_do_not_touch_pins() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (_broadcaster, mut sink) = bridge(&mut gpio, &params);

    let id = StandardId::new(OUTPUT_ID as u16).unwrap();
    let remote = CanFrame::new_remote(id, 8).unwrap();
    assert!(sink.handle_rx(&remote));
    assert_eq!(ports.writes.get(), 0);
}

#[test]
fn frames_for_other_ids_are_left_alone() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (_broadcaster, mut sink) = bridge(&mut gpio, &params);

    assert!(!sink.handle_rx(&frame(0x601, &[0xff; 8])));
    assert!(!sink.handle_rx(&frame(INPUT_ID as u16, &[0xff; 8])));
    // Same raw value, other identifier kind
    let extended = CanFrame::new_data(ExtendedId::new(OUTPUT_ID as u32).unwrap(), &[0xff; 8]);
    assert!(!sink.handle_rx(&extended.unwrap()));
    assert_eq!(ports.writes.get(), 0);
}

#[test]
fn extended_output_id_is_supported() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    params.set_int(Param::OutputId, 0x18ff_1234);
    let (_broadcaster, mut sink) = bridge(&mut gpio, &params);

    let id = ExtendedId::new(0x18ff_1234).unwrap();
    let frame = CanFrame::new_data(id, &[0, 0, 0, 0, 0, 0, 0b100, 0]).unwrap();
    assert!(sink.handle_rx(&frame));
    assert!(sink.outputs().tcc_out());
    assert!(ports.output_pin(Port::B, 8));
}

#[test]
fn broadcast_only_when_period_matches() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (mut broadcaster, _sink) = bridge(&mut gpio, &params);
    let mut transport = MockTransport::default();

    broadcaster.on_period(CanPeriod::Ms10, &mut transport);
    assert!(transport.sent.is_empty());
    broadcaster.on_period(CanPeriod::Ms100, &mut transport);
    assert_eq!(transport.sent.len(), 1);

    params.set_int(Param::CanPeriod, CanPeriod::Ms10 as i32);
    broadcaster.on_period(CanPeriod::Ms100, &mut transport);
    broadcaster.on_period(CanPeriod::Ms10, &mut transport);
    assert_eq!(transport.sent.len(), 2);
}

#[test]
fn broadcast_reports_every_input() {
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    let (mut broadcaster, _sink) = bridge(&mut gpio, &params);
    let mut transport = MockTransport::default();

    for (port, pin, bit) in [(Port::A, 8, 0b001), (Port::B, 1, 0b010), (Port::B, 0, 0b100)] {
        ports.input[0].set(0);
        ports.input[1].set(0);
        ports.set_input(port, pin, true);
        broadcaster.broadcast(&mut transport);
        let last = transport.sent.last().unwrap();
        assert_eq!(last.data(), &[0, 0, 0, 0, 0, 0, 0, bit]);
        assert_eq!(broadcaster.sample().bits(), bit);
    }
}

#[test]
fn filters_cover_requests_and_commands() {
    let params = MockParams::new();
    let mut transport = MockTransport::default();
    set_can_filters(&mut transport, &params);
    assert_eq!(
        transport.filters,
        [standard_id(0x601), standard_id(OUTPUT_ID as u16)]
    );

    let mut transport = MockTransport::default();
    params.set_int(Param::OutputId, -5);
    set_can_filters(&mut transport, &params);
    assert_eq!(transport.filters, [standard_id(0x601)]);

    let mut transport = MockTransport::default();
    params.set_int(Param::NodeId, i32::MAX);
    params.set_int(Param::OutputId, 0x7ff);
    set_can_filters(&mut transport, &params);
    assert_eq!(transport.filters, [Id::Standard(StandardId::MAX)]);
}

#[test]
fn equal_ids_loop_inputs_back_to_outputs() {
    // Nothing prevents `inputid == outputid`. A node receiving such a
    // broadcast interprets it as a command: byte 7 carries the inputs in the
    // bit positions of gp_out, gp2_out and a_out.
    let ports = PortState::default();
    let mut gpio = MockGpio(&ports);
    let params = MockParams::new();
    params.set_int(Param::InputId, OUTPUT_ID);
    let (mut broadcaster, mut sink) = bridge(&mut gpio, &params);
    let mut transport = MockTransport::default();

    ports.set_input(Port::A, 8, true);
    ports.set_input(Port::B, 0, true);
    broadcaster.broadcast(&mut transport);
    assert!(sink.handle_rx(&transport.sent[0]));

    let outputs = sink.outputs();
    assert!(outputs.gp_out());
    assert!(!outputs.gp2_out());
    assert!(outputs.a_out());
    assert_eq!(outputs.bits(), 0b101);
}

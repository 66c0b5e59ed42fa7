mod common;

use common::*;
use digio_can::board::{Parts, Pins};
use digio_can::bridge::CanIoBridge;
use digio_can::frame::OutputCommand;
use digio_can::prelude::*;
use digio_can::scheduler::{Scheduler, LOAD_WINDOW_TICKS};
use proptest::prelude::*;

struct Work<'c> {
    clock: &'c MockClock,
    costs: Vec<u32>,
    runs: usize,
}

fn work(w: &mut Work<'_>) {
    let cost = w.costs[w.runs % w.costs.len()];
    w.clock.advance(cost);
    w.runs += 1;
}

proptest! {
    #[test]
    fn command_frames_drive_exactly_the_mapped_bits(payload in any::<[u8; 8]>()) {
        let ports = PortState::default();
        let mut gpio = MockGpio(&ports);
        let params = MockParams::new();
        let Parts { outputs, inputs, .. } = Pins::configure(&mut gpio).split();
        let (_broadcaster, mut sink) = CanIoBridge::new(inputs, outputs, &params).split();

        prop_assert!(sink.handle_rx(&frame(OUTPUT_ID as u16, &payload)));
        let expected = u16::from_le_bytes([payload[7], payload[6]]) & OutputCommand::MAPPED;
        prop_assert_eq!(sink.outputs().bits(), expected);

        let reencoded = sink.outputs().to_payload();
        prop_assert_eq!(&reencoded[..6], &[0u8; 6][..]);
        prop_assert_eq!(OutputCommand::from_payload(&reencoded), Some(sink.outputs()));
    }

    #[test]
    fn short_command_frames_never_write(len in 0usize..8, fill in any::<u8>()) {
        let ports = PortState::default();
        let mut gpio = MockGpio(&ports);
        let params = MockParams::new();
        let Parts { outputs, inputs, .. } = Pins::configure(&mut gpio).split();
        let (_broadcaster, mut sink) = CanIoBridge::new(inputs, outputs, &params).split();

        let data = [fill; 8];
        prop_assert!(sink.handle_rx(&frame(OUTPUT_ID as u16, &data[..len])));
        prop_assert_eq!(ports.writes.get(), 0);
    }

    #[test]
    fn tasks_fire_once_per_period(period in 1u32..=655, periods in 1u32..4) {
        let clock = MockClock::default();
        let mut scheduler: Scheduler<Work<'_>> = Scheduler::new();
        let mut ctx = Work { clock: &clock, costs: vec![0], runs: 0 };
        scheduler.add_task(work, period.millis()).unwrap();

        for _ in 0..period * periods {
            scheduler.run(&mut ctx, &clock);
        }
        prop_assert_eq!(ctx.runs, periods as usize);
    }

    #[test]
    fn cpu_load_stays_within_bounds(
        costs in prop::collection::vec(0u32..20_000, 1..16),
        period in 1u32..20,
        windows in 1u32..4
    ) {
        let clock = MockClock::default();
        let mut scheduler: Scheduler<Work<'_>> = Scheduler::new();
        let mut ctx = Work { clock: &clock, costs, runs: 0 };
        scheduler.add_task(work, period.millis()).unwrap();

        for _ in 0..windows * LOAD_WINDOW_TICKS {
            scheduler.run(&mut ctx, &clock);
            let load = scheduler.cpu_load();
            prop_assert!(load.permille() <= 1000);
            prop_assert!((0.0..=100.0).contains(&load.percent()));
        }
    }
}

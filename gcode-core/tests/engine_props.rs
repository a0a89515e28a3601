use std::cell::Cell;
use std::collections::VecDeque;

use gcode_core::{
    ChecksumMode, Clock, Engine, EngineConfig, FrameStatus, Request, Transport, PACKET_TIMEOUT_US,
};
use gcode_proto::encode_command;
use proptest::prelude::*;

#[derive(Default)]
struct Wire {
    rx: VecDeque<u8>,
    sent: Vec<String>,
}

impl Transport for Wire {
    type Error = ();

    fn available(&mut self) -> Result<usize, ()> {
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, ()> {
        Ok(self.rx.pop_front())
    }

    fn write_line(&mut self, line: &str) -> Result<(), ()> {
        self.sent.push(line.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct TestClock(Cell<u64>);

impl TestClock {
    fn advance(&self, micros: u64) {
        self.0.set(self.0.get() + micros);
    }
}

impl Clock for TestClock {
    fn now_micros(&self) -> u64 {
        self.0.get()
    }
}

type Seen = Vec<Vec<u8>>;
type TestEngine<'h> = Engine<'h, Wire, &'h TestClock, Seen>;

fn capture(seen: &mut Seen, req: &Request<'_>) {
    seen.push(req.packet().as_bytes().to_vec());
}

/// Poll until the wire is drained, collecting every status other than `None`.
fn drain(engine: &mut TestEngine<'_>, seen: &mut Seen) -> Vec<FrameStatus> {
    let mut statuses = Vec::new();
    while !engine.transport().rx.is_empty() {
        let status = engine.poll(seen).unwrap();
        if status != FrameStatus::None {
            statuses.push(status);
        }
    }
    statuses
}

proptest! {
    #[test]
    fn terminated_line_is_framed_once(line in "[ -~]{0,48}") {
        let clock = TestClock::default();
        let c = capture;
        let mut engine: TestEngine<'_> =
            Engine::new(Wire::default(), &clock, EngineConfig::default());
        engine.set_default(&c);

        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        engine.transport_mut().rx.extend(bytes.iter().copied());

        let mut seen = Seen::new();
        prop_assert_eq!(drain(&mut engine, &mut seen), vec![FrameStatus::Ready]);
        prop_assert_eq!(seen, vec![bytes]);
    }

    #[test]
    fn unterminated_line_completes_only_after_timeout(line in "[!-~][ -~]{0,48}") {
        let clock = TestClock::default();
        let c = capture;
        let mut engine: TestEngine<'_> =
            Engine::new(Wire::default(), &clock, EngineConfig::default());
        engine.set_default(&c);
        engine.transport_mut().rx.extend(line.bytes());

        let mut seen = Seen::new();
        prop_assert!(drain(&mut engine, &mut seen).is_empty());

        clock.advance(PACKET_TIMEOUT_US - 1);
        prop_assert_eq!(engine.poll(&mut seen), Ok(FrameStatus::None));
        clock.advance(1);
        prop_assert_eq!(engine.poll(&mut seen), Ok(FrameStatus::Ready));
        clock.advance(PACKET_TIMEOUT_US);
        prop_assert_eq!(engine.poll(&mut seen), Ok(FrameStatus::None));
        prop_assert_eq!(seen, vec![line.into_bytes()]);
    }

    #[test]
    fn overlong_line_overflows_once_and_recovers(line in "[ -~]{49,120}") {
        let clock = TestClock::default();
        let c = capture;
        let mut engine: TestEngine<'_> =
            Engine::new(Wire::default(), &clock, EngineConfig::default());
        engine.set_default(&c);
        engine.transport_mut().rx.extend(line.bytes());
        engine.transport_mut().rx.extend(b"\nG0\n".iter().copied());

        let mut seen = Seen::new();
        prop_assert_eq!(
            drain(&mut engine, &mut seen),
            vec![FrameStatus::Overflow, FrameStatus::Ready]
        );
        prop_assert_eq!(seen, vec![b"G0\n".to_vec()]);
        prop_assert_eq!(&engine.transport().sent, &vec!["ERROR: 4".to_string()]);
    }

    #[test]
    fn idle_engine_reports_none(steps in prop::collection::vec(0u64..10_000, 1..50)) {
        let clock = TestClock::default();
        let mut engine: TestEngine<'_> =
            Engine::new(Wire::default(), &clock, EngineConfig::default());

        let mut seen = Seen::new();
        for step in steps {
            clock.advance(step);
            prop_assert_eq!(engine.poll(&mut seen), Ok(FrameStatus::None));
        }
        prop_assert!(engine.transport().sent.is_empty());
    }

    #[test]
    fn encoded_commands_pass_the_gate(
        body in "[A-Z][0-9]{1,2}( [A-Z]-?[0-9]{1,3}){0,4}",
        crc in any::<bool>(),
    ) {
        let mode = if crc { ChecksumMode::Crc8 } else { ChecksumMode::Sentinel };
        let clock = TestClock::default();
        let c = capture;
        let mut engine: TestEngine<'_> =
            Engine::new(Wire::default(), &clock, EngineConfig::new().with_checksum(mode));
        engine.set_default(&c);

        let mut line = encode_command(&body, Some(mode)).unwrap().as_bytes().to_vec();
        line.push(b'\n');
        let mut seen = Seen::new();
        prop_assert_eq!(engine.submit(&mut seen, &line), Ok(FrameStatus::Ready));
        prop_assert_eq!(seen.len(), 1);
    }
}

//! Test doubles shared by the unit tests.

extern crate std;

use core::cell::Cell;
use std::collections::VecDeque;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::transport::{Clock, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// In-memory transport: bytes queued in `rx` are read back one at a time,
/// written lines are collected in `sent`.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub rx: VecDeque<u8>,
    pub sent: Vec<String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MockTransport {
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut transport = Self::default();
        transport.feed(bytes);
        transport
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn available(&mut self) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(MockError);
        }
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if self.fail_reads {
            return Err(MockError);
        }
        Ok(self.rx.pop_front())
    }

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError);
        }
        self.sent.push(line.to_string());
        Ok(())
    }
}

/// Manually advanced clock.
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<u64>,
}

impl MockClock {
    pub fn advance(&self, micros: u64) {
        self.now.set(self.now.get() + micros);
    }
}

impl Clock for MockClock {
    fn now_micros(&self) -> u64 {
        self.now.get()
    }
}

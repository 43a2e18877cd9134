//! Shared fixtures for the unit tests.

use core::convert::Infallible;
use core::fmt;

use embedded_io::{ErrorKind, ErrorType, Write};

use crate::clock::ClockReconciler;
use crate::storage::MeasurementStore;

/// Sink that collects everything written to it.
#[derive(Default)]
pub struct VecSink {
    pub bytes: Vec<u8>,
}

impl ErrorType for VecSink {
    type Error = Infallible;
}

impl Write for VecSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Sink whose peer has gone away.
pub struct BrokenSink;

#[derive(Debug)]
pub struct BrokenPipe;

impl fmt::Display for BrokenPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("broken pipe")
    }
}

impl core::error::Error for BrokenPipe {}

impl embedded_io::Error for BrokenPipe {
    fn kind(&self) -> ErrorKind {
        ErrorKind::BrokenPipe
    }
}

impl ErrorType for BrokenSink {
    type Error = BrokenPipe;
}

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> Result<usize, Self::Error> {
        Err(BrokenPipe)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Err(BrokenPipe)
    }
}

/// Store of `capacity` slots after `n` one-second ticks, values `0.0, 1.0, ...`.
pub fn filled_store(capacity: usize, n: usize) -> MeasurementStore {
    let clock = ClockReconciler::initialize(Some(1_700_000_000), 0);
    let mut store = MeasurementStore::try_with_capacity(capacity, 1000, 0).unwrap();
    for i in 0..n as u32 {
        store.maybe_record((i + 1) * 1000, i as f32, &clock);
    }
    store
}

use core::fmt::Display;

use crate::clock::EpochTime;

/// One logged temperature reading
///
/// Written once into a store slot and only ever replaced by overwriting the
/// whole slot. Its size is the per-record footprint used when the store is
/// sized from the free heap.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    /// Wall-clock seconds since the Unix epoch
    pub timestamp: u32,
    /// Pit temperature
    pub value: f32,
}

impl Measurement {
    pub const fn new(timestamp: u32, value: f32) -> Self {
        Self { timestamp, value }
    }

    /// Returns the size of one record in bytes (8).
    pub const fn size() -> usize {
        core::mem::size_of::<Self>()
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[Measurement] time: {}, temperature: {:.2}",
            EpochTime(self.timestamp),
            self.value
        )
    }
}

//! Wall-clock reconciliation for the monotonic millisecond tick
//!
//! The device only knows the real time once, at boot, when the time source
//! answers. From then on wall time is derived from the free-running
//! millisecond counter plus a fixed offset. All arithmetic is wrapping `u32`
//! so a counter wrap keeps moving forward consistently; correctness across
//! the wrap is not attempted.

mod calendar;
pub mod ntp;

pub use calendar::{CivilTime, EpochTime};

use log::{info, warn};

/// Milliseconds per second of the monotonic tick.
pub const MS_PER_SECOND: u32 = 1000;

/// Converts monotonic milliseconds into epoch seconds using a boot offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockReconciler {
    /// `epoch_now - uptime_secs` captured at initialization
    boot_offset_secs: u32,
    synced: bool,
}

impl ClockReconciler {
    /// A clock with no time source: timestamps count from the Unix epoch.
    pub const fn unsynced() -> Self {
        Self {
            boot_offset_secs: 0,
            synced: false,
        }
    }

    /// Capture the boot offset from one reading of the external time source.
    ///
    /// `None` means the time source could not be reached. This is not fatal;
    /// the offset stays zero and timestamps become uptime-relative.
    pub fn initialize(epoch_now: Option<u32>, monotonic_ms: u32) -> Self {
        match epoch_now {
            Some(epoch) => {
                info!("Current time UTC from time source: {}", EpochTime(epoch));
                Self {
                    boot_offset_secs: epoch.wrapping_sub(monotonic_ms / MS_PER_SECOND),
                    synced: true,
                }
            }
            None => {
                warn!("Time source unavailable; timestamps are relative to boot");
                Self::unsynced()
            }
        }
    }

    /// Wall-clock epoch seconds for a monotonic tick.
    pub const fn wall_clock_secs(&self, monotonic_ms: u32) -> u32 {
        (monotonic_ms / MS_PER_SECOND).wrapping_add(self.boot_offset_secs)
    }

    pub const fn boot_offset_secs(&self) -> u32 {
        self.boot_offset_secs
    }

    /// Whether a real epoch value was captured at boot.
    pub const fn is_synced(&self) -> bool {
        self.synced
    }
}

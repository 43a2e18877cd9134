use alloc::vec::Vec;
use core::iter::FusedIterator;

use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use super::Measurement;
use crate::clock::{ClockReconciler, MS_PER_SECOND};
use crate::config::StoreConfig;

const SECS_PER_HOUR: u64 = 3600;

/// Longest interval the wrap-aware deadline check can tell apart from a
/// deadline already passed: half the tick range, in whole seconds.
pub const MAX_INTERVAL_MS: u32 = (i32::MAX as u32 / MS_PER_SECOND) * MS_PER_SECOND;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("failed to allocate storage for {capacity} measurements")]
    Allocation { capacity: usize },
}

/// Circular store of measurements sized once from the free heap
///
/// The slot array is a single allocation made at startup and never resized.
/// `count` only grows; record `n` lives in slot `n % capacity`, so once the
/// store is full every new record overwrites the oldest one.
///
/// A store with capacity zero is the degraded mode after a failed
/// allocation: it never records and always reads as empty.
///
/// ## Sampling
///
/// The logging interval spreads the capacity over the configured span,
/// rounded to whole seconds. Each fire reschedules from the time it actually
/// ran, so a late caller shifts every later sample instead of catching up.
pub struct MeasurementStore {
    records: Vec<Measurement>,
    count: u64,
    interval_ms: u32,
    next_deadline_ms: u32,
}

impl MeasurementStore {
    /// Size the store from the free heap and schedule the first sample.
    ///
    /// Never fails: an allocation error or a heap smaller than the reserve
    /// yields a disabled store.
    pub fn allocate(available_memory: usize, config: &StoreConfig, now_ms: u32) -> Self {
        let capacity = Self::capacity_for(available_memory, config.reserved_bytes);
        if capacity == 0 {
            warn!(
                "Free heap {} B does not exceed the {} B reserve; logging disabled",
                available_memory, config.reserved_bytes
            );
            return Self::disabled();
        }

        let interval_ms = sampling_interval_ms(config.span_hours, capacity);
        match Self::try_with_capacity(capacity, interval_ms, now_ms) {
            Ok(store) => {
                info!("Allocated storage for {} data points", capacity);
                info!("Measurements will happen each {} ms", interval_ms);
                store
            }
            Err(e) => {
                error!("Error in memory allocation: {}; logging disabled", e);
                Self::disabled()
            }
        }
    }

    /// Number of records that fit in `available_memory` after the reserve.
    pub const fn capacity_for(available_memory: usize, reserved_bytes: usize) -> usize {
        available_memory.saturating_sub(reserved_bytes) / Measurement::size()
    }

    /// Build a store with an explicit capacity and interval.
    ///
    /// The first sample is due one interval after `start_ms`. Intervals above
    /// [`MAX_INTERVAL_MS`] are clamped.
    pub fn try_with_capacity(
        capacity: usize,
        interval_ms: u32,
        start_ms: u32,
    ) -> Result<Self, StoreError> {
        let mut records = Vec::new();
        records
            .try_reserve_exact(capacity)
            .map_err(|_| StoreError::Allocation { capacity })?;
        records.resize(capacity, Measurement::default());
        let interval_ms = interval_ms.min(MAX_INTERVAL_MS);

        Ok(Self {
            records,
            count: 0,
            interval_ms,
            next_deadline_ms: start_ms.wrapping_add(interval_ms),
        })
    }

    /// A store in degraded mode: capacity zero, never records.
    pub const fn disabled() -> Self {
        Self {
            records: Vec::new(),
            count: 0,
            interval_ms: 0,
            next_deadline_ms: 0,
        }
    }

    /// Record `value` if the sampling deadline has been reached.
    ///
    /// Returns the stored measurement when the tick fired.
    pub fn maybe_record(
        &mut self,
        now_ms: u32,
        value: f32,
        clock: &ClockReconciler,
    ) -> Option<Measurement> {
        if self.records.is_empty() || !deadline_reached(now_ms, self.next_deadline_ms) {
            return None;
        }

        self.next_deadline_ms = now_ms.wrapping_add(self.interval_ms);

        let measurement = Measurement::new(clock.wall_clock_secs(now_ms), value);
        let slot = self.slot(self.count);
        self.records[slot] = measurement;
        self.count += 1;

        debug!("Stored {} in slot {}", measurement, slot);
        Some(measurement)
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Total records ever written, including overwritten ones.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.count.min(self.records.len() as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disabled(&self) -> bool {
        self.records.is_empty()
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn next_deadline_ms(&self) -> u32 {
        self.next_deadline_ms
    }

    /// Logical index of the oldest retained record.
    pub fn oldest_index(&self) -> u64 {
        self.count.saturating_sub(self.records.len() as u64)
    }

    /// Retained record `index` positions after the oldest one.
    pub fn get(&self, index: usize) -> Option<&Measurement> {
        if index >= self.len() {
            return None;
        }
        Some(&self.records[self.slot(self.oldest_index() + index as u64)])
    }

    pub fn latest(&self) -> Option<&Measurement> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Retained records from oldest to newest; `.rev()` for newest first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            store: self,
            front: self.oldest_index(),
            back: self.count,
        }
    }

    fn slot(&self, logical: u64) -> usize {
        (logical % self.records.len() as u64) as usize
    }
}

/// Oldest-to-newest iterator over a [`MeasurementStore`]
pub struct Iter<'a> {
    store: &'a MeasurementStore,
    front: u64,
    back: u64,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Measurement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = &self.store.records[self.store.slot(self.front)];
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.back - self.front) as usize;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(&self.store.records[self.store.slot(self.back)])
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// Interval that spreads `capacity` samples over `span_hours`, rounded to
/// whole seconds (half up) and capped at [`MAX_INTERVAL_MS`].
pub fn sampling_interval_ms(span_hours: u32, capacity: usize) -> u32 {
    if capacity == 0 {
        return 0;
    }
    let span_secs = u64::from(span_hours) * SECS_PER_HOUR;
    let capacity = capacity as u64;
    let secs = (2 * span_secs + capacity) / (2 * capacity);
    (secs * u64::from(MS_PER_SECOND)).min(u64::from(MAX_INTERVAL_MS)) as u32
}

/// Wrap-aware `now >= deadline` for a free-running `u32` tick.
fn deadline_reached(now_ms: u32, deadline_ms: u32) -> bool {
    (now_ms.wrapping_sub(deadline_ms) as i32) >= 0
}

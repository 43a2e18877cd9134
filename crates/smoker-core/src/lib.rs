//! Hardware-independent core library for the smoker regulator logger
//!
//! This crate contains all platform-agnostic logic: reconciling the monotonic
//! tick with wall-clock time, the fixed-capacity measurement history, the
//! measure-then-stream page renderer, and the minimal request/response layer
//! that serves the dashboard, table and chart pages.
//!
//! It is `no_std` with `extern crate alloc` so it compiles on both the
//! ESP32-S3 firmware and desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod http;
pub mod logger;
pub mod report;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use logger::{DataLogger, Readings};

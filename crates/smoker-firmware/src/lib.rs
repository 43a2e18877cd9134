//! ESP32-S3 firmware-specific modules for the smoker regulator logger
//!
//! This crate contains the hardware-bound glue around `smoker_core`: Wi-Fi
//! bring-up, the SNTP boot time query, the shared regulator readings, and the
//! main loop that alternates logging ticks with serving HTTP clients.

#![no_std]

extern crate alloc;

pub mod net;
pub mod readings;
pub mod server;
pub mod sntp;
pub mod wifi_secrets;

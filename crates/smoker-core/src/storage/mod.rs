//! Fixed-capacity measurement history kept in RAM.

mod measurement;
mod ring;

pub use measurement::Measurement;
pub use ring::*;

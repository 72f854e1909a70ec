//! Configuration types
//!
//! Board-agnostic engine tuning: filter gains, task cadences and
//! calibration length. The firmware fills these in at build time from its
//! `device.toml`.

pub mod types;

pub use types::*;

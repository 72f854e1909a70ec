//! Tiltplay Hardware Abstraction Layer
//!
//! This crate defines the few hardware seams the game engine needs, so the
//! same engine code runs on the RP2040 board and inside host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tiltplay-firmware (embassy-rp)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tiltplay-drivers / tiltplay-core       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tiltplay-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - Addressed register reads/writes
//! - [`time::Clock`] - Wrapping microsecond counter

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod time;

// Re-export key traits at crate root for convenience
pub use i2c::{HalBus, I2cBus, I2cBusError, I2cConfig};
pub use time::{ticks_diff, us_to_secs, Clock};

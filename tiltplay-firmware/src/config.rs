//! Compile-time device configuration
//!
//! Values come from device.toml, validated and turned into constants by the
//! build script.

use tiltplay_core::config::{Cadence, EngineConfig, MahonyGains, TiltConfig, TiltMode};

include!(concat!(env!("OUT_DIR"), "/device_config.rs"));

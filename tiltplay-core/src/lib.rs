//! Board-agnostic engine for the Tiltplay handheld
//!
//! This crate contains everything a tilt game runs on that does not depend
//! on a specific chip:
//!
//! - Attitude estimation (Mahony fusion, single-axis tilt filter, calibration)
//! - Cooperative interval scheduler
//! - Sensor and game traits
//! - Engine configuration
//! - The per-device `Session` context that ties them to the rasterizer

#![no_std]
#![deny(unsafe_code)]

pub mod attitude;
pub mod config;
pub mod scheduler;
pub mod session;
pub mod traits;

pub use attitude::{Attitude, AttitudeEstimator};
pub use scheduler::{Scheduler, SchedulerError, TaskHandle};
pub use session::{EngineTask, PollReport, Session, Timers};
pub use traits::{Game, RawAxes, SensorError, SensorSource};

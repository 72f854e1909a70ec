//! Attitude estimation
//!
//! Mahony quaternion fusion for full orientation, a single-axis tilt filter
//! for simpler games, and the calibration that feeds both.

pub mod estimator;
pub mod mahony;
pub mod math;
pub mod tilt;

pub use estimator::{
    mount_corrected, Attitude, AttitudeEstimator, CalibrationOffsets, ACCEL_COUNTS_PER_G,
    CALIBRATION_PERIOD_MS,
};
pub use mahony::MahonyFilter;
pub use math::{wrap_degrees, EulerAngles, Quaternion, Vector3};
pub use tilt::{accel_angle, TiltFilter};

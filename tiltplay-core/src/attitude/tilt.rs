//! Single-axis tilt filter
//!
//! A cheaper alternative to full fusion for games that only care about one
//! rotation: the angle of gravity in the sensor's X/Y plane.

use super::math::wrap_degrees;
use crate::config::{TiltConfig, TiltMode};

/// Angle of the X/Y accelerometer components in degrees, `atan2(y, x)`
pub fn accel_angle(x: f32, y: f32) -> f32 {
    libm::atan2f(y, x).to_degrees()
}

/// Filtered tilt angle in degrees, kept in `(-180, 180]`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TiltFilter {
    config: TiltConfig,
    last_angle: f32,
}

impl TiltFilter {
    /// Create a filter starting at 0°
    pub fn new(config: TiltConfig) -> Self {
        Self {
            config,
            last_angle: 0.0,
        }
    }

    /// Current filter configuration
    pub fn config(&self) -> &TiltConfig {
        &self.config
    }

    /// Switch mode or weights; the current angle is kept
    pub fn set_config(&mut self, config: TiltConfig) {
        self.config = config;
    }

    /// Last filtered angle
    pub fn angle(&self) -> f32 {
        self.last_angle
    }

    /// Force the filtered angle (wrapped)
    pub fn set_angle(&mut self, angle: f32) {
        self.last_angle = wrap_degrees(angle);
    }

    /// Back to 0°
    pub fn reset(&mut self) {
        self.last_angle = 0.0;
    }

    /// Feed one accelerometer angle (degrees) plus the Z rate (rad/s)
    ///
    /// `gyro_z` and `dt` are ignored in low-pass mode.
    pub fn update(&mut self, accel_angle: f32, gyro_z: f32, dt: f32) -> f32 {
        match self.config.mode {
            TiltMode::Complementary => self.blend(accel_angle, gyro_z, dt),
            TiltMode::LowPass => self.smooth(accel_angle),
        }
        self.last_angle
    }

    fn blend(&mut self, accel_angle: f32, gyro_z: f32, dt: f32) {
        // Sensor Z points into the case, so positive tilt is negative rate
        let gyro_rate = -gyro_z.to_degrees();

        let mut diff = accel_angle - self.last_angle;
        if diff > 180.0 {
            diff -= 360.0;
        } else if diff < -180.0 {
            diff += 360.0;
        }

        let w = self.config.gyro_weight;
        self.last_angle = wrap_degrees(self.last_angle + w * (gyro_rate * dt) + (1.0 - w) * diff);
    }

    fn smooth(&mut self, accel_angle: f32) {
        let mut last = self.last_angle;
        if last > 90.0 && accel_angle < -90.0 {
            last -= 360.0;
        } else if last < -90.0 && accel_angle > 90.0 {
            last += 360.0;
        }

        let a = self.config.low_pass_weight;
        self.last_angle = wrap_degrees((last * a + accel_angle) / (a + 1.0));
    }
}

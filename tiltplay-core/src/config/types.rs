//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nominal sensor sampling period (100 Hz)
pub const DEFAULT_SENSOR_INTERVAL_US: u32 = 10_000;

/// Nominal game update period (50 Hz)
pub const DEFAULT_UPDATE_INTERVAL_US: u32 = 20_000;

/// Nominal redraw period (60 FPS)
pub const DEFAULT_DRAW_INTERVAL_US: u32 = 16_667;

/// Default number of samples averaged during calibration
pub const DEFAULT_CALIBRATION_SAMPLES: u16 = 100;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A filter gain is negative, NaN or infinite
    InvalidGain,
    /// A blend weight is outside its allowed range
    InvalidWeight,
    /// A task interval is zero
    ZeroInterval,
    /// Calibration sample count is zero
    NoCalibrationSamples,
}

/// Mahony filter gains
///
/// Stored as the plain gains; the filter doubles them internally.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MahonyGains {
    /// Proportional gain (Kp)
    pub kp: f32,
    /// Integral gain (Ki), 0 disables integral feedback
    pub ki: f32,
}

impl Default for MahonyGains {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl MahonyGains {
    /// Kp = 5, no integral feedback
    pub const DEFAULT: Self = Self { kp: 5.0, ki: 0.0 };
}

/// How the single tilt angle is filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TiltMode {
    /// Gyro yaw-rate integration blended with the accelerometer angle
    #[default]
    Complementary,
    /// Accelerometer angle only, smoothed by a first-order low-pass
    LowPass,
}

/// Tilt filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TiltConfig {
    /// Filter mode
    pub mode: TiltMode,
    /// Complementary mode: weight of the gyro-integrated step (0..=1);
    /// the accelerometer delta gets the remainder
    pub gyro_weight: f32,
    /// Low-pass mode: weight of the previous angle relative to the new one
    pub low_pass_weight: f32,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TiltConfig {
    /// Complementary mode, 0.4 gyro weight
    pub const DEFAULT: Self = Self {
        mode: TiltMode::Complementary,
        gyro_weight: 0.4,
        low_pass_weight: 2.0,
    };
}

/// Engine task cadences in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cadence {
    /// Sensor read + attitude update
    pub sensor_us: u32,
    /// Game state update
    pub update_us: u32,
    /// Redraw + flush
    pub draw_us: u32,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Cadence {
    /// 100 Hz sensor, 50 Hz update, 60 FPS draw
    pub const DEFAULT: Self = Self {
        sensor_us: DEFAULT_SENSOR_INTERVAL_US,
        update_us: DEFAULT_UPDATE_INTERVAL_US,
        draw_us: DEFAULT_DRAW_INTERVAL_US,
    };
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Attitude fusion gains
    pub mahony: MahonyGains,
    /// Tilt filter
    pub tilt: TiltConfig,
    /// Task cadences
    pub cadence: Cadence,
    /// Samples averaged by `calibrate` / `calibrate_tilt`
    pub calibration_samples: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn valid_gain(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

impl EngineConfig {
    /// Defaults matching the shipped device tuning
    pub const DEFAULT: Self = Self {
        mahony: MahonyGains::DEFAULT,
        tilt: TiltConfig::DEFAULT,
        cadence: Cadence::DEFAULT,
        calibration_samples: DEFAULT_CALIBRATION_SAMPLES,
    };

    /// Check that every value is usable by the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !valid_gain(self.mahony.kp) || !valid_gain(self.mahony.ki) {
            return Err(ConfigError::InvalidGain);
        }

        let w = self.tilt.gyro_weight;
        if !w.is_finite() || !(0.0..=1.0).contains(&w) {
            return Err(ConfigError::InvalidWeight);
        }
        if !valid_gain(self.tilt.low_pass_weight) {
            return Err(ConfigError::InvalidWeight);
        }

        let c = &self.cadence;
        if c.sensor_us == 0 || c.update_us == 0 || c.draw_us == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        if self.calibration_samples == 0 {
            return Err(ConfigError::NoCalibrationSamples);
        }

        Ok(())
    }
}

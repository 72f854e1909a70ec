//! Inertial sensor trait

use crate::attitude::Vector3;

/// Errors that can occur reading the inertial sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transfer failed
    Bus,
    /// Device did not acknowledge its address
    NotResponding,
}

/// Raw signed sensor counts per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawAxes {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawAxes {
    /// Create from components
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// Trait for a 6-axis accelerometer + gyroscope
///
/// Implementations apply the mounting sign convention so that the scaled
/// readings are in the device frame the attitude filter expects.
pub trait SensorSource {
    /// Acceleration in g
    fn read_accel(&mut self) -> Result<Vector3, SensorError>;

    /// Angular rate in rad/s
    fn read_gyro(&mut self) -> Result<Vector3, SensorError>;

    /// Unscaled accelerometer counts, no sign correction
    fn read_accel_raw(&mut self) -> Result<RawAxes, SensorError>;
}

impl<T: SensorSource + ?Sized> SensorSource for &mut T {
    fn read_accel(&mut self) -> Result<Vector3, SensorError> {
        (**self).read_accel()
    }

    fn read_gyro(&mut self) -> Result<Vector3, SensorError> {
        (**self).read_gyro()
    }

    fn read_accel_raw(&mut self) -> Result<RawAxes, SensorError> {
        (**self).read_accel_raw()
    }
}

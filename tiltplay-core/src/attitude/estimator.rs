//! Attitude estimator
//!
//! Owns the fusion filter, the tilt filter and the calibration offsets.
//! Games only ever see the [`Attitude`] snapshot it produces.

use embedded_hal::delay::DelayNs;
use tiltplay_hal::{ticks_diff, us_to_secs};

use super::mahony::MahonyFilter;
use super::math::{wrap_degrees, EulerAngles, Vector3};
use super::tilt::{accel_angle, TiltFilter};
use crate::config::{EngineConfig, MahonyGains, TiltConfig};
use crate::traits::{RawAxes, SensorError, SensorSource};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sample period used by `calibrate`
pub const CALIBRATION_PERIOD_MS: u32 = 10;

/// Accelerometer counts per g at the ±2 g range
pub const ACCEL_COUNTS_PER_G: f32 = 16384.0;

/// Biases removed from later readings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationOffsets {
    /// Roll bias (degrees)
    pub roll: f32,
    /// Pitch bias (degrees)
    pub pitch: f32,
    /// Raw accelerometer bias per axis (counts)
    pub accel: Vector3,
}

/// Orientation snapshot handed to games, all in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attitude {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    /// Single-axis tilt from the tilt filter
    pub tilt: f32,
}

/// Convert filter Euler angles (radians) to degrees in the case frame
///
/// The sensor is mounted upside down, so roll is offset by 180° and the
/// result negated.
pub fn mount_corrected(euler: EulerAngles) -> EulerAngles {
    let deg = euler.to_degrees();
    let roll = wrap_degrees(deg.roll + 180.0);
    EulerAngles::new(-roll, deg.pitch, deg.yaw)
}

/// Read failures seen during one calibration run
#[derive(Default)]
struct Failures {
    count: u16,
    first: Option<SensorError>,
}

impl Failures {
    fn record(&mut self, status: Result<(), SensorError>) {
        if let Err(e) = status {
            self.count += 1;
            self.first.get_or_insert(e);
        }
    }

    /// Fails only when no sample read succeeded
    fn check(&self, samples: u16) -> Result<(), SensorError> {
        match self.first {
            Some(e) if self.count >= samples => Err(e),
            Some(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("calibration: {} of {} reads failed", self.count, samples);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Attitude estimator
#[derive(Debug, Clone)]
pub struct AttitudeEstimator {
    mahony: MahonyFilter,
    tilt: TiltFilter,
    offsets: CalibrationOffsets,
    /// Clock value of the previous `sample`, `None` until the first one
    last_update_us: Option<u32>,
    /// `dt` used when there is no previous sample (seconds)
    nominal_dt: f32,
    last_accel: Vector3,
    last_gyro: Vector3,
    last_raw: RawAxes,
}

impl AttitudeEstimator {
    /// Create an estimator in the inverted-mount starting orientation
    pub fn new(gains: MahonyGains, tilt: TiltConfig) -> Self {
        Self {
            mahony: MahonyFilter::new(gains),
            tilt: TiltFilter::new(tilt),
            offsets: CalibrationOffsets::default(),
            last_update_us: None,
            nominal_dt: us_to_secs(crate::config::DEFAULT_SENSOR_INTERVAL_US),
            last_accel: Vector3::ZERO,
            last_gyro: Vector3::ZERO,
            last_raw: RawAxes::default(),
        }
    }

    /// Create an estimator from the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut estimator = Self::new(config.mahony, config.tilt);
        estimator.nominal_dt = us_to_secs(config.cadence.sensor_us);
        estimator
    }

    /// Fuse one sample, returning the calibrated angles
    ///
    /// A zero accelerometer vector leaves the orientation unchanged.
    pub fn update(&mut self, accel: Vector3, gyro: Vector3, dt: f32) -> EulerAngles {
        self.mahony.update(accel, gyro, dt);
        self.angles()
    }

    /// Feed raw accelerometer counts and the Z rate to the tilt filter
    pub fn update_tilt(&mut self, raw: RawAxes, gyro_z: f32, dt: f32) -> f32 {
        let x = raw.x as f32 - self.offsets.accel.x;
        let y = raw.y as f32 - self.offsets.accel.y;
        self.tilt.update(accel_angle(x, y), gyro_z, dt)
    }

    /// Roll, pitch, yaw in degrees with mounting and calibration applied
    pub fn angles(&self) -> EulerAngles {
        let corrected = mount_corrected(self.mahony.euler());
        EulerAngles::new(
            wrap_degrees(corrected.roll - self.offsets.roll),
            corrected.pitch - self.offsets.pitch,
            corrected.yaw,
        )
    }

    /// Last filtered tilt angle in degrees
    pub fn tilt_angle(&self) -> f32 {
        self.tilt.angle()
    }

    /// Snapshot for game code
    pub fn attitude(&self) -> Attitude {
        let angles = self.angles();
        Attitude {
            roll: angles.roll,
            pitch: angles.pitch,
            yaw: angles.yaw,
            tilt: self.tilt_angle(),
        }
    }

    /// Underlying fusion filter
    pub fn mahony(&self) -> &MahonyFilter {
        &self.mahony
    }

    /// Underlying tilt filter
    pub fn tilt(&self) -> &TiltFilter {
        &self.tilt
    }

    /// Read the sensor and run both filters
    ///
    /// `dt` is the wrapping distance to the previous call. Any failed read
    /// is replaced by the last good value of that quantity and the filters
    /// still advance; the first failure is returned so the caller can
    /// report it.
    pub fn sample<S: SensorSource>(&mut self, source: &mut S, now_us: u32) -> Result<(), SensorError> {
        let dt = match self.last_update_us {
            Some(previous) => us_to_secs(ticks_diff(now_us, previous)),
            None => self.nominal_dt,
        };
        self.last_update_us = Some(now_us);

        let status = self.read(source);

        self.mahony.update(self.last_accel, self.last_gyro, dt);
        self.update_tilt(self.last_raw, self.last_gyro.z, dt);
        status
    }

    /// Refresh the last-good readings, keeping old values on failure
    fn read<S: SensorSource>(&mut self, source: &mut S) -> Result<(), SensorError> {
        let mut status = Ok(());
        match source.read_accel() {
            Ok(accel) => self.last_accel = accel,
            Err(e) => status = status.and(Err(e)),
        }
        match source.read_gyro() {
            Ok(gyro) => self.last_gyro = gyro,
            Err(e) => status = status.and(Err(e)),
        }
        match source.read_accel_raw() {
            Ok(raw) => self.last_raw = raw,
            Err(e) => status = status.and(Err(e)),
        }
        status
    }

    /// Measure roll and pitch bias with the device held still
    ///
    /// Runs `samples` fusion updates 10 ms apart and stores the mean
    /// mount-corrected roll and pitch. A failed read reuses the last good
    /// reading; if every read fails the offsets are left untouched and the
    /// first error is returned. The next `sample` starts a fresh `dt` chain
    /// since calibration blocks the caller.
    pub fn calibrate<S: SensorSource, D: DelayNs>(
        &mut self,
        source: &mut S,
        delay: &mut D,
        samples: u16,
    ) -> Result<CalibrationOffsets, SensorError> {
        if samples == 0 {
            return Ok(self.offsets);
        }

        let dt = CALIBRATION_PERIOD_MS as f32 / 1000.0;
        let mut roll_sum = 0.0f32;
        let mut pitch_sum = 0.0f32;
        let mut failures = Failures::default();
        for _ in 0..samples {
            failures.record(self.read(source));
            self.mahony.update(self.last_accel, self.last_gyro, dt);
            let corrected = mount_corrected(self.mahony.euler());
            roll_sum += corrected.roll;
            pitch_sum += corrected.pitch;
            delay.delay_ms(CALIBRATION_PERIOD_MS);
        }
        self.last_update_us = None;
        failures.check(samples)?;

        let n = samples as f32;
        self.offsets.roll = roll_sum / n;
        self.offsets.pitch = pitch_sum / n;
        Ok(self.offsets)
    }

    /// Measure raw accelerometer bias with the device standing on its edge
    ///
    /// Standing means X along gravity: X should read +1 g, Y and Z zero.
    /// Failed reads are handled as in [`calibrate`](Self::calibrate).
    pub fn calibrate_tilt<S: SensorSource>(
        &mut self,
        source: &mut S,
        samples: u16,
    ) -> Result<CalibrationOffsets, SensorError> {
        if samples == 0 {
            return Ok(self.offsets);
        }

        let (mut sx, mut sy, mut sz) = (0i64, 0i64, 0i64);
        let mut failures = Failures::default();
        for _ in 0..samples {
            let read = source.read_accel_raw().map(|raw| self.last_raw = raw);
            failures.record(read);
            sx += i64::from(self.last_raw.x);
            sy += i64::from(self.last_raw.y);
            sz += i64::from(self.last_raw.z);
        }
        failures.check(samples)?;

        let n = samples as f32;
        self.offsets.accel = Vector3::new(
            sx as f32 / n - ACCEL_COUNTS_PER_G,
            sy as f32 / n,
            sz as f32 / n,
        );
        Ok(self.offsets)
    }

    /// Current calibration
    pub fn offsets(&self) -> CalibrationOffsets {
        self.offsets
    }

    /// Install previously measured calibration
    pub fn set_offsets(&mut self, offsets: CalibrationOffsets) {
        self.offsets = offsets;
    }

    /// Back to the starting orientation; calibration is kept
    pub fn reset(&mut self) {
        self.mahony.reset();
        self.tilt.reset();
        self.last_update_us = None;
        self.last_accel = Vector3::ZERO;
        self.last_gyro = Vector3::ZERO;
        self.last_raw = RawAxes::default();
    }
}

//! MPU-6050 6-axis inertial sensor
//!
//! Runs at the power-on ranges (±2 g, ±250 °/s). The board carries the chip
//! upside down, so the scaled X and Y axes are negated to give readings in
//! the case frame. Raw counts are returned as the chip reports them.

use tiltplay_core::attitude::Vector3;
use tiltplay_core::traits::{RawAxes, SensorError, SensorSource};
use tiltplay_hal::{I2cBus, I2cBusError};

/// Address with AD0 low
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Accelerometer sensitivity at ±2 g
pub const ACCEL_LSB_PER_G: f32 = 16384.0;

/// Gyroscope sensitivity at ±250 °/s
pub const GYRO_LSB_PER_DPS: f32 = 131.0;

/// MPU-6050 registers
mod reg {
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const GYRO_XOUT_H: u8 = 0x43;
    pub const PWR_MGMT_1: u8 = 0x6B;
}

fn map_bus_error<E: Into<I2cBusError>>(e: E) -> SensorError {
    match e.into() {
        I2cBusError::Nack => SensorError::NotResponding,
        _ => SensorError::Bus,
    }
}

/// MPU-6050 driver
pub struct Mpu6050<B> {
    bus: B,
    address: u8,
}

impl<B> Mpu6050<B>
where
    B: I2cBus,
    B::Error: Into<I2cBusError>,
{
    /// Create a driver at the default address
    pub fn new(bus: B) -> Self {
        Self::with_address(bus, DEFAULT_ADDRESS)
    }

    /// Create a driver at a custom address (AD0 high is 0x69)
    pub fn with_address(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Wake the chip from its power-on sleep
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.bus
            .write_register(self.address, reg::PWR_MGMT_1, 0x00)
            .map_err(map_bus_error)
    }

    /// I2C address in use
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Burst-read three big-endian axes starting at `register`
    fn read_axes(&mut self, register: u8) -> Result<RawAxes, SensorError> {
        let mut buf = [0u8; 6];
        self.bus
            .read_registers(self.address, register, &mut buf)
            .map_err(map_bus_error)?;
        Ok(RawAxes::new(
            i16::from_be_bytes([buf[0], buf[1]]),
            i16::from_be_bytes([buf[2], buf[3]]),
            i16::from_be_bytes([buf[4], buf[5]]),
        ))
    }
}

impl<B> SensorSource for Mpu6050<B>
where
    B: I2cBus,
    B::Error: Into<I2cBusError>,
{
    fn read_accel(&mut self) -> Result<Vector3, SensorError> {
        let raw = self.read_axes(reg::ACCEL_XOUT_H)?;
        Ok(Vector3::new(
            -(raw.x as f32 / ACCEL_LSB_PER_G),
            -(raw.y as f32 / ACCEL_LSB_PER_G),
            raw.z as f32 / ACCEL_LSB_PER_G,
        ))
    }

    fn read_gyro(&mut self) -> Result<Vector3, SensorError> {
        let raw = self.read_axes(reg::GYRO_XOUT_H)?;
        Ok(Vector3::new(
            -(raw.x as f32 / GYRO_LSB_PER_DPS).to_radians(),
            -(raw.y as f32 / GYRO_LSB_PER_DPS).to_radians(),
            (raw.z as f32 / GYRO_LSB_PER_DPS).to_radians(),
        ))
    }

    fn read_accel_raw(&mut self) -> Result<RawAxes, SensorError> {
        self.read_axes(reg::ACCEL_XOUT_H)
    }
}

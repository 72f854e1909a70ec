//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tiltplay-core and tiltplay-display, all driven over an
//! [`I2cBus`](tiltplay_hal::I2cBus):
//!
//! - Inertial sensor (MPU-6050)
//! - OLED controller (SH1107, 128x128)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod imu;

pub use display::Sh1107;
pub use imu::Mpu6050;

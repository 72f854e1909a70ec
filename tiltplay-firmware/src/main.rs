//! Tiltplay - Tilt-Controlled Handheld Firmware
//!
//! Main firmware binary for the RP2040 handheld: an MPU-6050 on I2C0, a
//! 128x128 SH1107 OLED on I2C1, and the engine's cooperative poll loop
//! driving one game at a time.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::gpio::{Drive, Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use tiltplay_core::{Game, Session};
use tiltplay_display::DisplayTransport;
use tiltplay_drivers::{Mpu6050, Sh1107};
use tiltplay_hal::{HalBus, I2cConfig};

use crate::game::LevelGame;
use crate::platform::EmbassyClock;

mod config;
mod game;
mod platform;

/// Time for the sensor and OLED rails to settle after power-up
const POWER_SETTLE: Duration = Duration::from_secs(1);

/// Both buses run in fast mode
fn bus_config() -> i2c::Config {
    let mut config = i2c::Config::default();
    config.frequency = I2cConfig::FAST.frequency;
    config
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Tiltplay firmware starting...");

    let p = embassy_rp::init(Default::default());

    // The sensor and the OLED are powered straight from GPIO
    let mut sensor_power = Output::new(p.PIN_22, Level::Low);
    sensor_power.set_drive_strength(Drive::_12mA);
    sensor_power.set_high();
    let mut display_power = Output::new(p.PIN_8, Level::Low);
    display_power.set_drive_strength(Drive::_12mA);
    display_power.set_high();
    let _display_ground = Output::new(p.PIN_9, Level::Low);
    Timer::after(POWER_SETTLE).await;
    info!("Peripheral power up");

    // I2C0: GP20 = SDA, GP21 = SCL
    let sensor_i2c = I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, bus_config());
    // I2C1: GP6 = SDA, GP7 = SCL
    let display_i2c = I2c::new_blocking(p.I2C1, p.PIN_7, p.PIN_6, bus_config());

    let mut imu = Mpu6050::new(HalBus::new(sensor_i2c));
    match imu.init() {
        Ok(()) => info!("MPU-6050 ready"),
        Err(e) => error!("MPU-6050 init failed: {}", e),
    }

    let mut display = Sh1107::new(HalBus::new(display_i2c));
    match display.init() {
        Ok(()) => info!("SH1107 ready"),
        Err(e) => error!("SH1107 init failed: {}", e),
    }
    if let Err(e) = display.set_contrast(config::DISPLAY_CONTRAST) {
        warn!("Contrast not applied: {}", e);
    }
    if let Err(e) = display.set_rotated(config::DISPLAY_ROTATED) {
        warn!("Rotation not applied: {}", e);
    }

    let mut session = Session::new(imu, EmbassyClock, config::ENGINE_CONFIG);

    info!("Calibrating, keep the device still");
    match session.calibrate(&mut Delay) {
        Ok(offsets) => info!(
            "Calibration complete: roll={} pitch={}",
            offsets.roll, offsets.pitch
        ),
        Err(e) => error!("Calibration failed, running uncalibrated: {}", e),
    }

    let mut game = LevelGame::new();
    loop {
        if let Err(e) = session.start(&mut game) {
            error!("Session start failed: {}", e);
        }

        while !game.is_over() {
            session.poll(&mut game, &mut display);
            yield_now().await;
        }

        info!("Round over, restarting");
    }
}

//! Build script for tiltplay-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Parses and validates device.toml, then generates the compile-time
//!   engine configuration

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tiltplay_core::config::{EngineConfig, TiltMode};

/// Top-level layout of device.toml
#[derive(Deserialize)]
struct DeviceConfig {
    engine: EngineConfig,
    display: DisplaySettings,
}

#[derive(Deserialize)]
struct DisplaySettings {
    contrast: u8,
    rotated: bool,
}

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // cortex-m-rt, embassy-rp boot2 and defmt linker scripts
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate device.toml
fn load_config() -> DeviceConfig {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml configuration file.         ║\n\
            ║  Please create one in the tiltplay-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: DeviceConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid device.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = config.engine.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid [engine] settings in device.toml                 ║\n\
            ║                                                                  ║\n\
            ║  {:<64} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format!("{:?}", e)
        );
    }

    println!("cargo:warning=device.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `$OUT_DIR/device_config.rs` with the parsed values as constants
fn generate_config(config: &DeviceConfig) {
    let e = &config.engine;
    let mode = match e.tilt.mode {
        TiltMode::Complementary => "TiltMode::Complementary",
        TiltMode::LowPass => "TiltMode::LowPass",
    };

    let source = format!(
        "// Generated from device.toml by build.rs\n\
         \n\
         /// Engine configuration\n\
         pub const ENGINE_CONFIG: EngineConfig = EngineConfig {{\n\
         \x20   mahony: MahonyGains {{ kp: {:?}_f32, ki: {:?}_f32 }},\n\
         \x20   tilt: TiltConfig {{\n\
         \x20       mode: {},\n\
         \x20       gyro_weight: {:?}_f32,\n\
         \x20       low_pass_weight: {:?}_f32,\n\
         \x20   }},\n\
         \x20   cadence: Cadence {{ sensor_us: {}, update_us: {}, draw_us: {} }},\n\
         \x20   calibration_samples: {},\n\
         }};\n\
         \n\
         /// OLED contrast\n\
         pub const DISPLAY_CONTRAST: u8 = {};\n\
         \n\
         /// Image flipped 180°\n\
         pub const DISPLAY_ROTATED: bool = {};\n",
        e.mahony.kp,
        e.mahony.ki,
        mode,
        e.tilt.gyro_weight,
        e.tilt.low_pass_weight,
        e.cadence.sensor_us,
        e.cadence.update_us,
        e.cadence.draw_us,
        e.calibration_samples,
        config.display.contrast,
        config.display.rotated,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.rs"), source).unwrap();
}

//! Games built into the firmware

mod level;

pub use level::LevelGame;

//! Engine collaborator traits
//!
//! These traits define the interface between the engine and the sensor
//! hardware on one side and game code on the other.

pub mod game;
pub mod sensor;

pub use game::Game;
pub use sensor::{RawAxes, SensorError, SensorSource};

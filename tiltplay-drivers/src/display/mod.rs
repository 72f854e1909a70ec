//! Display controllers

pub mod sh1107;

pub use sh1107::Sh1107;

//! Board glue between Embassy and the engine traits

use embassy_time::Instant;
use tiltplay_hal::Clock;

/// Engine clock on the Embassy time driver
///
/// Truncated to 32 bits; the engine only ever takes wrapping differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }
}

//! Scheduled task records

use tiltplay_hal::ticks_diff;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle returned by `Scheduler::register`
///
/// Ids are never reused within one scheduler, so a stale handle can not
/// address a task registered later. Once the id space is spent,
/// registration fails with [`SchedulerError::Full`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskHandle(pub(crate) u32);

impl TaskHandle {
    /// Raw id
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Scheduler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// No free task slot, or no unused handle id left
    Full,
    /// Handle was removed or never belonged to this scheduler
    InvalidHandle,
}

/// One interval-gated action
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Task<A> {
    pub(crate) handle: TaskHandle,
    /// Minimum time between firings (µs)
    pub interval_us: u32,
    /// Clock value at the last firing, or at registration
    pub last_fired_us: u32,
    /// Opaque action handed back on every firing
    pub action: A,
}

impl<A> Task<A> {
    /// Handle of this task
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    /// Microseconds since the last firing (wrap-safe)
    pub fn elapsed_us(&self, now_us: u32) -> u32 {
        ticks_diff(now_us, self.last_fired_us)
    }

    /// Due once at least one interval has passed
    pub fn is_due(&self, now_us: u32) -> bool {
        self.elapsed_us(now_us) >= self.interval_us
    }
}

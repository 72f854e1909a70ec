//! Cooperative task scheduling
//!
//! Tasks are plain values (usually a small `Copy` enum) registered with an
//! interval; the owner matches on them when `poll` hands them back.

pub mod executor;
pub mod task;

pub use executor::{Scheduler, MAX_TASKS};
pub use task::{SchedulerError, Task, TaskHandle};

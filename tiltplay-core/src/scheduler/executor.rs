//! Cooperative interval scheduler
//!
//! Every registered task carries an interval and the time it last fired.
//! `poll` walks the tasks in registration order and fires each one whose
//! interval has elapsed, then restarts its interval from the poll time.
//! Restarting from "now" rather than from the ideal deadline means a busy
//! loop stretches the cadence instead of queueing catch-up firings.

use heapless::Vec;

use super::task::{SchedulerError, Task, TaskHandle};

/// Default task capacity
pub const MAX_TASKS: usize = 8;

/// Fixed-capacity task table
#[derive(Debug)]
pub struct Scheduler<A, const N: usize = MAX_TASKS> {
    tasks: Vec<Task<A>, N>,
    next_id: u32,
}

impl<A: Copy, const N: usize> Default for Scheduler<A, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Copy, const N: usize> Scheduler<A, N> {
    /// Create an empty scheduler
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a task; its first firing is one interval after `now_us`
    pub fn register(
        &mut self,
        interval_us: u32,
        action: A,
        now_us: u32,
    ) -> Result<TaskHandle, SchedulerError> {
        let handle = TaskHandle(self.next_id);
        let next_id = self.next_id.checked_add(1).ok_or(SchedulerError::Full)?;
        self.tasks
            .push(Task {
                handle,
                interval_us,
                last_fired_us: now_us,
                action,
            })
            .map_err(|_| SchedulerError::Full)?;
        self.next_id = next_id;
        Ok(handle)
    }

    /// Remove a task immediately
    pub fn remove(&mut self, handle: TaskHandle) -> Result<(), SchedulerError> {
        let index = self.index_of(handle)?;
        // Preserve registration order of the remaining tasks
        self.tasks.remove(index);
        Ok(())
    }

    /// Change a task's interval without touching its last-fired time
    pub fn set_interval(
        &mut self,
        handle: TaskHandle,
        interval_us: u32,
    ) -> Result<(), SchedulerError> {
        let index = self.index_of(handle)?;
        self.tasks[index].interval_us = interval_us;
        Ok(())
    }

    /// Whether a task would fire if polled at `now_us`
    pub fn is_due(&self, handle: TaskHandle, now_us: u32) -> Result<bool, SchedulerError> {
        let index = self.index_of(handle)?;
        Ok(self.tasks[index].is_due(now_us))
    }

    /// Look up a task
    pub fn get(&self, handle: TaskHandle) -> Option<&Task<A>> {
        self.tasks.iter().find(|t| t.handle == handle)
    }

    /// Fire every due task in registration order
    ///
    /// Returns the number of tasks fired.
    pub fn poll<F: FnMut(A)>(&mut self, now_us: u32, mut fire: F) -> usize {
        let mut fired = 0;
        for task in self.tasks.iter_mut() {
            if task.is_due(now_us) {
                task.last_fired_us = now_us;
                fired += 1;
                fire(task.action);
            }
        }
        fired
    }

    /// Drop every task (session reset)
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// No registered tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Registered tasks in order
    pub fn tasks(&self) -> &[Task<A>] {
        &self.tasks
    }

    fn index_of(&self, handle: TaskHandle) -> Result<usize, SchedulerError> {
        self.tasks
            .iter()
            .position(|t| t.handle == handle)
            .ok_or(SchedulerError::InvalidHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Action {
        Sensor,
        Update,
        Draw,
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler: Scheduler<Action> = Scheduler::new();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn test_simulated_second() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        scheduler.register(10_000, Action::Sensor, 0).unwrap();
        scheduler.register(50_000, Action::Update, 0).unwrap();
        scheduler.register(50_000, Action::Draw, 0).unwrap();

        let mut counts = [0u32; 3];
        let mut same_poll_pairs = 0;
        for ms in 1..=1000u32 {
            let mut fired: heapless::Vec<Action, 3> = heapless::Vec::new();
            scheduler.poll(ms * 1000, |a| {
                let _ = fired.push(a);
            });
            for a in &fired {
                counts[*a as usize] += 1;
            }
            // Both 50 ms tasks fire together, in registration order
            if let Some(i) = fired.iter().position(|a| *a == Action::Update) {
                assert_eq!(fired.get(i + 1), Some(&Action::Draw));
                same_poll_pairs += 1;
            }
        }

        assert_eq!(counts, [100, 20, 20]);
        assert_eq!(same_poll_pairs, 20);
    }

    #[test]
    fn test_registration_order() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        scheduler.register(5, Action::Draw, 0).unwrap();
        scheduler.register(5, Action::Sensor, 0).unwrap();

        let mut order: heapless::Vec<Action, 2> = heapless::Vec::new();
        assert_eq!(scheduler.poll(5, |a| order.push(a).unwrap()), 2);
        assert_eq!(order.as_slice(), &[Action::Draw, Action::Sensor]);
    }

    #[test]
    fn test_late_poll_drifts_instead_of_catching_up() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        let h = scheduler.register(10, Action::Sensor, 0).unwrap();

        // Poll arrives 7 µs late: fires once, next deadline is 27 not 20
        assert_eq!(scheduler.poll(17, |_| {}), 1);
        assert_eq!(scheduler.poll(20, |_| {}), 0);
        assert_eq!(scheduler.is_due(h, 26), Ok(false));
        assert_eq!(scheduler.poll(27, |_| {}), 1);

        // A long stall fires only once
        assert_eq!(scheduler.poll(1_000, |_| {}), 1);
        assert_eq!(scheduler.poll(1_001, |_| {}), 0);
    }

    #[test]
    fn test_not_due_before_interval() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        let h = scheduler.register(100, Action::Update, 50).unwrap();
        assert_eq!(scheduler.is_due(h, 149), Ok(false));
        assert_eq!(scheduler.is_due(h, 150), Ok(true));
    }

    #[test]
    fn test_clock_wraparound() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        let start = u32::MAX - 4;
        scheduler.register(10, Action::Sensor, start).unwrap();

        assert_eq!(scheduler.poll(start.wrapping_add(9), |_| {}), 0);
        assert_eq!(scheduler.poll(start.wrapping_add(10), |_| {}), 1);
        assert_eq!(scheduler.tasks()[0].last_fired_us, 5);
    }

    #[test]
    fn test_remove_and_invalid_handle() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        let a = scheduler.register(10, Action::Sensor, 0).unwrap();
        let b = scheduler.register(10, Action::Update, 0).unwrap();

        assert_eq!(scheduler.remove(a), Ok(()));
        assert_eq!(scheduler.remove(a), Err(SchedulerError::InvalidHandle));
        assert_eq!(
            scheduler.set_interval(a, 5),
            Err(SchedulerError::InvalidHandle)
        );

        // The surviving task is intact
        assert_eq!(scheduler.len(), 1);
        let task = scheduler.get(b).unwrap();
        assert_eq!(task.interval_us, 10);
        assert_eq!(task.action, Action::Update);
    }

    #[test]
    fn test_handles_not_reused() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        let a = scheduler.register(10, Action::Sensor, 0).unwrap();
        scheduler.remove(a).unwrap();
        let b = scheduler.register(10, Action::Sensor, 0).unwrap();
        assert_ne!(a, b);
        assert!(scheduler.get(a).is_none());
    }

    #[test]
    fn test_stale_handle_after_many_registrations() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        let stale = scheduler.register(10, Action::Sensor, 0).unwrap();
        scheduler.remove(stale).unwrap();
        for _ in 0..(u16::MAX as u32 + 1) {
            let h = scheduler.register(10, Action::Sensor, 0).unwrap();
            scheduler.remove(h).unwrap();
        }

        let fresh = scheduler.register(20, Action::Draw, 0).unwrap();
        assert_ne!(fresh, stale);
        assert_eq!(scheduler.remove(stale), Err(SchedulerError::InvalidHandle));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.get(fresh).unwrap().action, Action::Draw);
    }

    #[test]
    fn test_exhausted_ids_report_full() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        scheduler.next_id = u32::MAX - 1;
        let last = scheduler.register(10, Action::Sensor, 0).unwrap();
        assert_eq!(last.id(), u32::MAX - 1);

        assert_eq!(
            scheduler.register(10, Action::Update, 0),
            Err(SchedulerError::Full)
        );
        // Clearing frees slots but not ids
        scheduler.clear();
        assert_eq!(
            scheduler.register(10, Action::Update, 0),
            Err(SchedulerError::Full)
        );
        assert!(scheduler.get(last).is_none());
    }

    #[test]
    fn test_capacity() {
        let mut scheduler: Scheduler<Action, 2> = Scheduler::new();
        scheduler.register(1, Action::Sensor, 0).unwrap();
        scheduler.register(1, Action::Update, 0).unwrap();
        assert_eq!(
            scheduler.register(1, Action::Draw, 0),
            Err(SchedulerError::Full)
        );
    }

    #[test]
    fn test_set_interval() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        let h = scheduler.register(100, Action::Draw, 0).unwrap();
        scheduler.set_interval(h, 10).unwrap();
        assert_eq!(scheduler.poll(10, |_| {}), 1);
    }

    #[test]
    fn test_clear() {
        let mut scheduler: Scheduler<Action> = Scheduler::new();
        scheduler.register(1, Action::Sensor, 0).unwrap();
        scheduler.register(1, Action::Update, 0).unwrap();
        scheduler.clear();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.poll(100, |_| {}), 0);
    }
}

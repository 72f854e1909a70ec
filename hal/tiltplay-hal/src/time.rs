//! Monotonic time source
//!
//! The engine measures everything in microseconds on a free-running `u32`
//! counter. The counter wraps after ~71 minutes, so elapsed time must always
//! be taken with [`ticks_diff`] rather than plain subtraction.

/// Monotonic microsecond counter
pub trait Clock {
    /// Current counter value in microseconds (wraps at `u32::MAX`)
    fn now_us(&self) -> u32;

    /// Microseconds elapsed since `earlier`
    fn elapsed_us(&self, earlier: u32) -> u32 {
        ticks_diff(self.now_us(), earlier)
    }
}

/// Wraparound-safe difference `now - earlier` in microseconds
///
/// Valid as long as the real elapsed time is below one full counter period.
#[inline]
pub const fn ticks_diff(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}

/// Convert a microsecond span to seconds
#[inline]
pub fn us_to_secs(us: u32) -> f32 {
    us as f32 / 1_000_000.0
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct ManualClock(Cell<u32>);

    impl Clock for ManualClock {
        fn now_us(&self) -> u32 {
            self.0.get()
        }
    }

    #[test]
    fn test_ticks_diff_plain() {
        assert_eq!(ticks_diff(1_500, 500), 1_000);
    }

    #[test]
    fn test_ticks_diff_across_wrap() {
        let earlier = u32::MAX - 99;
        let now = 900;
        assert_eq!(ticks_diff(now, earlier), 1_000);
    }

    #[test]
    fn test_elapsed_through_reference() {
        let clock = ManualClock(Cell::new(u32::MAX - 4));
        let start = clock.now_us();
        clock.0.set(5);
        let by_ref = &clock;
        assert_eq!(by_ref.elapsed_us(start), 10);
    }

    #[test]
    fn test_us_to_secs() {
        let err = us_to_secs(10_000) - 0.01;
        assert!(err < 1e-7 && err > -1e-7);
    }
}

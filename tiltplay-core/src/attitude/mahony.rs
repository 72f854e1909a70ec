//! Mahony complementary attitude filter
//!
//! Corrects the gyro-integrated orientation with the gravity direction seen
//! by the accelerometer. The error between the measured and predicted
//! gravity is fed back into the angular rate through a proportional term
//! and an optional integral term before the quaternion is integrated.

use super::math::{EulerAngles, Quaternion, Vector3};
use crate::config::MahonyGains;

/// Mahony filter state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MahonyFilter {
    /// Current orientation (unit quaternion)
    q: Quaternion,
    /// 2 * proportional gain
    two_kp: f32,
    /// 2 * integral gain
    two_ki: f32,
    /// Integral feedback accumulator (rad/s)
    integral_fb: Vector3,
    /// Orientation to return to on reset
    initial: Quaternion,
}

impl MahonyFilter {
    /// Create a filter starting from the inverted mounting orientation
    pub fn new(gains: MahonyGains) -> Self {
        Self::with_orientation(gains, Quaternion::INVERTED)
    }

    /// Create a filter starting from an arbitrary orientation
    pub fn with_orientation(gains: MahonyGains, q: Quaternion) -> Self {
        let q = q.normalized().unwrap_or(Quaternion::INVERTED);
        Self {
            q,
            two_kp: 2.0 * gains.kp,
            two_ki: 2.0 * gains.ki,
            integral_fb: Vector3::ZERO,
            initial: q,
        }
    }

    /// Change gains; disabling integral feedback drops the accumulator
    pub fn set_gains(&mut self, gains: MahonyGains) {
        self.two_kp = 2.0 * gains.kp;
        self.two_ki = 2.0 * gains.ki;
        if self.two_ki <= 0.0 {
            self.integral_fb = Vector3::ZERO;
        }
    }

    /// Current orientation
    pub fn quaternion(&self) -> Quaternion {
        self.q
    }

    /// Integral feedback accumulator
    pub fn integral_feedback(&self) -> Vector3 {
        self.integral_fb
    }

    /// Back to the starting orientation with a cleared accumulator
    pub fn reset(&mut self) {
        self.q = self.initial;
        self.integral_fb = Vector3::ZERO;
    }

    /// Fuse one sample
    ///
    /// - `accel`: accelerometer reading, any unit (only direction is used)
    /// - `gyro`: angular rate in rad/s
    /// - `dt`: seconds since the previous update
    ///
    /// Returns `false` and leaves all state untouched when the accelerometer
    /// vector has no direction.
    pub fn update(&mut self, accel: Vector3, gyro: Vector3, dt: f32) -> bool {
        let Some(a) = accel.normalized() else {
            return false;
        };

        // Error is the cross product between measured and predicted gravity
        let half_v = self.q.half_gravity();
        let half_e = a.cross(&half_v);

        let mut rate = gyro;
        if self.two_ki > 0.0 {
            self.integral_fb += half_e * (self.two_ki * dt);
            rate += self.integral_fb;
        } else {
            self.integral_fb = Vector3::ZERO;
        }
        rate += half_e * self.two_kp;

        // First-order quaternion integration
        let r = rate * (0.5 * dt);
        let Quaternion { w, x, y, z } = self.q;
        let integrated = Quaternion::new(
            w + (-x * r.x - y * r.y - z * r.z),
            x + (w * r.x + y * r.z - z * r.y),
            y + (w * r.y - x * r.z + z * r.x),
            z + (w * r.z + x * r.y - y * r.x),
        );

        // A zero norm cannot be renormalized; keep the raw step
        self.q = integrated.normalized().unwrap_or(integrated);
        true
    }

    /// Raw Euler angles in radians (no mounting correction)
    pub fn euler(&self) -> EulerAngles {
        self.q.to_euler()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f32, b: f32, tol: f32) -> bool {
        libm::fabsf(a - b) <= tol
    }

    #[test]
    fn test_zero_accel_leaves_state_untouched() {
        let mut filter = MahonyFilter::new(MahonyGains { kp: 5.0, ki: 1.0 });
        let before = filter.quaternion();
        let applied = filter.update(Vector3::ZERO, Vector3::new(1.0, 2.0, 3.0), 0.01);

        assert!(!applied);
        assert_eq!(filter.quaternion(), before);
        assert_eq!(filter.integral_feedback(), Vector3::ZERO);
    }

    #[test]
    fn test_aligned_gravity_is_equilibrium() {
        let mut filter = MahonyFilter::new(MahonyGains::DEFAULT);
        for _ in 0..100 {
            filter.update(Vector3::new(0.0, 0.0, 1.0), Vector3::ZERO, 0.01);
        }
        assert_eq!(filter.quaternion(), Quaternion::INVERTED);
    }

    #[test]
    fn test_pure_gyro_rotation_about_z() {
        // Kp = 0: plain integration, 90°/s about Z for one second
        let mut filter = MahonyFilter::with_orientation(
            MahonyGains { kp: 0.0, ki: 0.0 },
            Quaternion::IDENTITY,
        );
        let rate = core::f32::consts::FRAC_PI_2;
        for _ in 0..1000 {
            filter.update(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, rate), 0.001);
        }
        let yaw = filter.euler().yaw.to_degrees();
        assert!(close(yaw, 90.0, 0.5), "yaw = {}", yaw);
    }

    #[test]
    fn test_integral_disabled_holds_zero() {
        let mut filter = MahonyFilter::new(MahonyGains { kp: 5.0, ki: 0.0 });
        filter.update(Vector3::new(0.0, 0.5, -1.0), Vector3::ZERO, 0.01);
        assert_eq!(filter.integral_feedback(), Vector3::ZERO);
    }

    #[test]
    fn test_integral_accumulates_then_clears() {
        let mut filter = MahonyFilter::new(MahonyGains { kp: 5.0, ki: 0.5 });
        filter.update(Vector3::new(0.0, 0.5, -1.0), Vector3::ZERO, 0.01);
        assert_ne!(filter.integral_feedback(), Vector3::ZERO);

        filter.set_gains(MahonyGains { kp: 5.0, ki: 0.0 });
        assert_eq!(filter.integral_feedback(), Vector3::ZERO);
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut filter = MahonyFilter::new(MahonyGains::DEFAULT);
        filter.update(Vector3::new(0.3, 0.2, -1.0), Vector3::new(1.0, 0.0, 0.0), 0.01);
        assert_ne!(filter.quaternion(), Quaternion::INVERTED);
        filter.reset();
        assert_eq!(filter.quaternion(), Quaternion::INVERTED);
    }

    fn non_degenerate_accel() -> impl Strategy<Value = (f32, f32, f32)> {
        (-2.0f32..2.0, -2.0f32..2.0, -2.0f32..2.0)
            .prop_filter("accel needs a direction", |(x, y, z)| {
                x * x + y * y + z * z > 1e-4
            })
    }

    proptest! {
        #[test]
        fn prop_quaternion_stays_unit(
            steps in proptest::collection::vec(
                (
                    non_degenerate_accel(),
                    (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0),
                    0.001f32..0.05,
                ),
                1..200,
            ),
            ki in 0.0f32..2.0,
        ) {
            let mut filter = MahonyFilter::new(MahonyGains { kp: 5.0, ki });
            for ((ax, ay, az), (gx, gy, gz), dt) in steps {
                filter.update(Vector3::new(ax, ay, az), Vector3::new(gx, gy, gz), dt);
                let q = filter.quaternion();
                let norm = libm::sqrt(
                    (q.w as f64) * (q.w as f64)
                        + (q.x as f64) * (q.x as f64)
                        + (q.y as f64) * (q.y as f64)
                        + (q.z as f64) * (q.z as f64),
                );
                prop_assert!(libm::fabs(norm - 1.0) < 1e-6, "norm = {}", norm);
            }
        }
    }
}

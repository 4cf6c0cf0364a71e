//! Twist Integration
//!
//! One-step unicycle motion increment for a planar velocity command.
//!
//! Only `linear[0]` (forward speed) and `angular[2]` (yaw rate) are read. For a
//! yaw rate below [`INTEGRATION_EPSILON`] the robot moves straight; otherwise it
//! follows an arc of radius `v / w`. The increment is returned as the transform
//! `Rz(theta) * T(dx, dy, 0)`.
//!
//! # Example
//!
//! ```rust
//! use navguard_library::algorithms::twist_integration::integrate;
//! use navguard_library::Twist;
//!
//! let delta = integrate(&Twist::new_2d(0.5, 0.0), 0.1);
//! assert!((delta.translation()[0] - 0.05).abs() < 1e-12);
//! assert_eq!(delta.yaw(), 0.0);
//! ```

use crate::messages::Twist;
use crate::tf::Transform;

/// Yaw rates with a smaller magnitude are integrated as straight-line motion
pub const INTEGRATION_EPSILON: f64 = 1e-4;

/// Planar increment before it is turned into a transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarDelta {
    /// Forward offset (m)
    pub dx: f64,
    /// Lateral offset (m)
    pub dy: f64,
    /// Heading change (rad)
    pub dtheta: f64,
}

/// Planar offset and heading change produced by `twist` over `step_time`
pub fn planar_delta(twist: &Twist, step_time: f64) -> PlanarDelta {
    let v = twist.linear[0];
    let w = twist.angular[2];

    if w.abs() < INTEGRATION_EPSILON {
        return PlanarDelta {
            dx: v * step_time,
            dy: 0.0,
            dtheta: 0.0,
        };
    }

    let radius = v / w;
    let theta = w * step_time;
    let (sin_theta, cos_theta) = theta.sin_cos();

    PlanarDelta {
        dx: sin_theta * radius,
        dy: radius - cos_theta * radius,
        dtheta: theta,
    }
}

/// Relative transform for one rollout step
pub fn integrate(twist: &Twist, step_time: f64) -> Transform {
    let delta = planar_delta(twist, step_time);
    Transform::from_yaw(delta.dtheta) * Transform::from_translation([delta.dx, delta.dy, 0.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_straight_motion() {
        let delta = integrate(&Twist::new_2d(0.5, 0.0), 0.1);
        let [x, y, z] = delta.translation();

        assert_relative_eq!(x, 0.05, epsilon = 1e-12);
        assert_eq!(y, 0.0);
        assert_eq!(z, 0.0);
        assert_eq!(delta.yaw(), 0.0);
    }

    #[test]
    fn test_zero_twist_is_identity() {
        let delta = integrate(&Twist::zero(), 0.5);
        assert!(delta.approx_eq(&Transform::identity(), 1e-15));
    }

    #[test]
    fn test_unit_arc_offset() {
        let delta = planar_delta(&Twist::new_2d(1.0, 1.0), 1.0);

        assert_relative_eq!(delta.dx, 1.0_f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(delta.dy, 1.0 - 1.0_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(delta.dtheta, 1.0, epsilon = 1e-12);
        assert_relative_eq!(delta.dx, 0.8415, epsilon = 1e-4);
        assert_relative_eq!(delta.dy, 0.4597, epsilon = 1e-4);
    }

    #[test]
    fn test_arc_transform_rotates_then_translates() {
        let delta = integrate(&Twist::new_2d(1.0, 1.0), 1.0);
        let (s, c) = 1.0_f64.sin_cos();
        let (dx, dy) = (s, 1.0 - c);

        let [x, y, _] = delta.translation();
        assert_relative_eq!(x, c * dx - s * dy, epsilon = 1e-12);
        assert_relative_eq!(y, s * dx + c * dy, epsilon = 1e-12);
        assert_relative_eq!(delta.yaw(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_in_place() {
        let delta = integrate(&Twist::new_2d(0.0, 2.0), 0.5);
        let [x, y, _] = delta.translation();

        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
        assert_relative_eq!(delta.yaw(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_only_planar_components_are_read() {
        let full = Twist::new([0.4, 9.0, -3.0], [7.0, 5.0, 0.2]);
        let planar = Twist::new_2d(0.4, 0.2);

        assert_eq!(integrate(&full, 0.1), integrate(&planar, 0.1));
    }

    #[test]
    fn test_continuous_across_epsilon() {
        let straight = integrate(&Twist::new_2d(1.0, INTEGRATION_EPSILON * 0.999), 0.1);
        let arc = integrate(&Twist::new_2d(1.0, INTEGRATION_EPSILON * 1.001), 0.1);
        assert!(straight.approx_eq(&arc, 1e-4));

        let straight = integrate(&Twist::new_2d(1.0, -INTEGRATION_EPSILON * 0.999), 0.1);
        let arc = integrate(&Twist::new_2d(1.0, -INTEGRATION_EPSILON * 1.001), 0.1);
        assert!(straight.approx_eq(&arc, 1e-4));
    }

    #[test]
    fn test_finite_near_zero_rate() {
        for w in [1e-300, -1e-300, 1e-5, -1e-5, INTEGRATION_EPSILON, -INTEGRATION_EPSILON] {
            let delta = planar_delta(&Twist::new_2d(2.0, w), 0.1);
            assert!(delta.dx.is_finite(), "dx not finite for w = {w}");
            assert!(delta.dy.is_finite(), "dy not finite for w = {w}");
            assert_relative_eq!(delta.dx, 0.2, epsilon = 1e-6);
        }
    }
}

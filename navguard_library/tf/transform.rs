//! Rigid transform backed by `nalgebra::Isometry3`

use crate::messages::geometry::{Point3, Pose, Quaternion};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use std::ops::Mul;

/// Rigid transform: rotation followed by translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    iso: Isometry3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    pub fn from_translation(translation: [f64; 3]) -> Self {
        Self {
            iso: Isometry3::translation(translation[0], translation[1], translation[2]),
        }
    }

    /// Pure rotation about the vertical axis
    pub fn from_yaw(yaw: f64) -> Self {
        Self {
            iso: Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw),
            ),
        }
    }

    /// Planar transform at height zero
    pub fn from_planar(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            iso: Isometry3::from_parts(
                Translation3::new(x, y, 0.0),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw),
            ),
        }
    }

    /// `self * other`: apply `other` in the frame of `self`
    pub fn compose(&self, other: &Transform) -> Transform {
        Self {
            iso: self.iso * other.iso,
        }
    }

    pub fn inverse(&self) -> Transform {
        Self {
            iso: self.iso.inverse(),
        }
    }

    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let p = self
            .iso
            .transform_point(&nalgebra::Point3::new(point[0], point[1], point[2]));
        [p.x, p.y, p.z]
    }

    pub fn translation(&self) -> [f64; 3] {
        let t = &self.iso.translation.vector;
        [t.x, t.y, t.z]
    }

    /// Rotation as a unit quaternion
    pub fn rotation(&self) -> Quaternion {
        let q = self.iso.rotation.quaternion();
        Quaternion::new(q.i, q.j, q.k, q.w)
    }

    /// Heading angle about the vertical axis
    pub fn yaw(&self) -> f64 {
        self.iso.rotation.euler_angles().2
    }

    /// Component-wise comparison of translation and rotation
    pub fn approx_eq(&self, other: &Transform, tolerance: f64) -> bool {
        let dt = (self.iso.translation.vector - other.iso.translation.vector).norm();
        let dr = self.iso.rotation.angle_to(&other.iso.rotation);
        dt <= tolerance && dr <= tolerance
    }

    pub fn to_pose(&self) -> Pose {
        let [x, y, z] = self.translation();
        Pose::new(Point3::new(x, y, z), self.rotation())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        self.compose(rhs)
    }
}

impl From<&Pose> for Transform {
    fn from(pose: &Pose) -> Self {
        let q = pose.orientation.normalized();
        let rotation =
            UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z));
        Self {
            iso: Isometry3::from_parts(
                Translation3::new(pose.position.x, pose.position.y, pose.position.z),
                rotation,
            ),
        }
    }
}

impl From<Pose> for Transform {
    fn from(pose: Pose) -> Self {
        Transform::from(&pose)
    }
}

impl From<Transform> for Pose {
    fn from(tf: Transform) -> Self {
        tf.to_pose()
    }
}

//! Geometry primitives
//!
//! Plain-data message types. Arithmetic on poses lives in [`crate::tf`].

use navguard_core::LogSummary;
use serde::{Deserialize, Serialize};

/// 3D vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// 3D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::default()
    }
}

/// Orientation quaternion (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Raw constructor, the result is not normalized
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation from roll, pitch and yaw (radians), applied in Z-Y-X order
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();

        Self {
            x: sr * cp * cy - cr * sp * sy,
            y: cr * sp * cy + sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
            w: cr * cp * cy + sr * sp * sy,
        }
    }

    /// Pure rotation about the vertical axis
    pub fn from_yaw(yaw: f64) -> Self {
        let (s, c) = (yaw * 0.5).sin_cos();
        Self::new(0.0, 0.0, s, c)
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Unit-length copy; degenerate quaternions collapse to identity
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if !norm.is_finite() || norm < f64::EPSILON {
            return Self::identity();
        }
        Self::new(self.x / norm, self.y / norm, self.z / norm, self.w / norm)
    }

    pub fn is_normalized(&self) -> bool {
        (self.norm() - 1.0).abs() < 1e-9
    }

    /// Heading angle about the vertical axis
    pub fn yaw(&self) -> f64 {
        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        siny_cosp.atan2(cosy_cosp)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Absolute robot pose: position plus unit orientation.
///
/// Constructors and deserialization normalize the orientation. Writing the
/// public field directly bypasses that; [`Transform`](crate::tf::Transform)
/// normalizes again on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PoseFields")]
pub struct Pose {
    pub position: Point3,
    pub orientation: Quaternion,
}

#[derive(Deserialize)]
struct PoseFields {
    position: Point3,
    orientation: Quaternion,
}

impl From<PoseFields> for Pose {
    fn from(fields: PoseFields) -> Self {
        Pose::new(fields.position, fields.orientation)
    }
}

impl Pose {
    /// Create a pose; the orientation is normalized
    pub fn new(position: Point3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation: orientation.normalized(),
        }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    /// Planar pose at height zero
    pub fn from_xy_yaw(x: f64, y: f64, yaw: f64) -> Self {
        Self::new(Point3::new(x, y, 0.0), Quaternion::from_yaw(yaw))
    }

    pub fn yaw(&self) -> f64 {
        self.orientation.yaw()
    }

    /// Check if values are finite
    pub fn is_valid(&self) -> bool {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
            self.orientation.w,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Velocity command: linear (m/s) and angular (rad/s) components in the body frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct Twist {
    /// [x, y, z] linear velocity
    pub linear: [f64; 3],
    /// [x, y, z] angular velocity
    pub angular: [f64; 3],
}

impl Twist {
    pub fn new(linear: [f64; 3], angular: [f64; 3]) -> Self {
        Self { linear, angular }
    }

    /// Planar command: forward speed and yaw rate
    pub fn new_2d(linear_x: f64, angular_z: f64) -> Self {
        Self::new([linear_x, 0.0, 0.0], [0.0, 0.0, angular_z])
    }

    /// All six components zero
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.linear.iter().chain(self.angular.iter()).all(|v| *v == 0.0)
    }

    /// Check if values are finite
    pub fn is_valid(&self) -> bool {
        self.linear.iter().chain(self.angular.iter()).all(|v| v.is_finite())
    }
}

// Zero-copy views for transports that ship raw bytes
unsafe impl bytemuck::Pod for Twist {}
unsafe impl bytemuck::Zeroable for Twist {}

impl LogSummary for Twist {
    fn log_summary(&self) -> String {
        format!(
            "Twist(lin=[{:.2}, {:.2}, {:.2}], ang=[{:.2}, {:.2}, {:.2}])",
            self.linear[0],
            self.linear[1],
            self.linear[2],
            self.angular[0],
            self.angular[1],
            self.angular[2]
        )
    }
}

impl LogSummary for Pose {
    fn log_summary(&self) -> String {
        format!(
            "Pose(x={:.3}, y={:.3}, z={:.3}, yaw={:.3})",
            self.position.x,
            self.position.y,
            self.position.z,
            self.yaw()
        )
    }
}

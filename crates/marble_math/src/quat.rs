//! Unit quaternion for 3D rotations
//!
//! Obstacles need rotations about a single axis (spinners about Y, donuts about X)
//! and the marble integrates an angular velocity every step, so the API is kept
//! to exactly those operations.

use serde::{Deserialize, Serialize};

use crate::Vec3;

/// Unit quaternion `w + xi + yj + zk`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity rotation (no rotation)
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a rotation of `angle` radians about `axis`
    ///
    /// The axis is normalized; a zero axis gives the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalized();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let (s, c) = (angle * 0.5).sin_cos();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: c,
        }
    }

    /// Rotation about the X axis (pitch)
    pub fn from_rotation_x(angle: f32) -> Self {
        Self::from_axis_angle(Vec3::X, angle)
    }

    /// Rotation about the Y axis (yaw)
    pub fn from_rotation_y(angle: f32) -> Self {
        Self::from_axis_angle(Vec3::Y, angle)
    }

    /// Rotation from intrinsic XYZ euler angles
    ///
    /// Applies X first, then Y, then Z in the rotating frame, which is the
    /// default euler order used by most scene graphs.
    pub fn from_euler_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_rotation_x(x) * Self::from_rotation_y(y) * Self::from_axis_angle(Vec3::Z, z)
    }

    /// Rotation that an angular velocity `omega` (rad/s) produces over `dt`
    pub fn from_scaled_axis(omega: Vec3, dt: f32) -> Self {
        let angle = omega.length() * dt;
        if angle.abs() < 1e-9 {
            return Self::IDENTITY;
        }
        Self::from_axis_angle(omega, angle)
    }

    /// Length of the quaternion (1.0 for valid rotations)
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Renormalize to unit length (guards against drift after repeated products)
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
                w: self.w / len,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Inverse of a unit quaternion
    pub fn conjugate(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate(self, v: Vec3) -> Vec3 {
        // v' = v + 2w(q x v) + 2(q x (q x v))
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    /// Rotation angle in radians, in `[0, 2*pi)`
    pub fn angle(self) -> f32 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }

    /// Angular velocity that takes `self` to `target` in `dt` seconds
    pub fn angular_velocity_to(self, target: Self, dt: f32) -> Vec3 {
        if dt <= 0.0 {
            return Vec3::ZERO;
        }
        let mut delta = target * self.conjugate();
        // Take the short way round
        if delta.w < 0.0 {
            delta = Self {
                x: -delta.x,
                y: -delta.y,
                z: -delta.z,
                w: -delta.w,
            };
        }
        let axis = Vec3::new(delta.x, delta.y, delta.z);
        let sin_half = axis.length();
        if sin_half < 1e-9 {
            return Vec3::ZERO;
        }
        let angle = 2.0 * sin_half.atan2(delta.w);
        axis * (angle / (sin_half * dt))
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    /// Hamilton product: `(a * b).rotate(v) == a.rotate(b.rotate(v))`
    fn mul(self, b: Self) -> Self {
        let a = self;
        Self {
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        }
    }
}

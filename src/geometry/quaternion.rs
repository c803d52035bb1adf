/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Unit quaternions for particle orientations
//!
//! Convention: q = w + (x, y, z), acting on vectors as q v q*. A particle
//! with orientation q has its body z axis along q ẑ q*.

use super::errors::{GeometryError, Result};
use super::vector::Vector3D;
use std::ops::Mul;

/// Threshold below which sin(β) is treated as zero in the Euler decomposition
const GIMBAL_EPS: f64 = 1e-12;

/// A unit quaternion representing a 3D rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// Scalar part
    pub w: f64,
    /// Vector part
    pub v: Vector3D,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create a quaternion from its four components
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            w,
            v: Vector3D::new(x, y, z),
        }
    }

    /// Build a rotation from `[w, x, y, z]`, normalising it
    pub fn from_components(components: [f64; 4]) -> Result<Self> {
        let q = Self::new(components[0], components[1], components[2], components[3]);
        let norm = q.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(GeometryError::InvalidQuaternion(format!(
                "cannot normalise {:?}",
                components
            )));
        }
        Ok(q.scaled(1.0 / norm))
    }

    /// Identity rotation
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation by `angle` radians about `axis`
    pub fn from_axis_angle(axis: &Vector3D, angle: f64) -> Result<Self> {
        let len = axis.length();
        if len == 0.0 {
            return Err(GeometryError::ZeroLength("rotation axis".to_string()));
        }
        let (s, c) = (0.5 * angle).sin_cos();
        Ok(Self {
            w: c,
            v: axis.scale(s / len),
        })
    }

    /// Rotation taking +z to the direction (θ, φ)
    ///
    /// Equivalent to a rotation by θ about y followed by φ about z.
    pub fn from_spherical_coords(theta: f64, phi: f64) -> Self {
        let (sz, cz) = (0.5 * phi).sin_cos();
        let (sy, cy) = (0.5 * theta).sin_cos();
        let qz = Self::new(cz, 0.0, 0.0, sz);
        let qy = Self::new(cy, 0.0, sy, 0.0);
        qz * qy
    }

    /// Rotation from ZYZ Euler angles: R = Rz(α) Ry(β) Rz(γ)
    pub fn from_euler_zyz(alpha: f64, beta: f64, gamma: f64) -> Self {
        let (sa, ca) = (0.5 * alpha).sin_cos();
        let (sb, cb) = (0.5 * beta).sin_cos();
        let (sg, cg) = (0.5 * gamma).sin_cos();
        Self::new(ca, 0.0, 0.0, sa) * Self::new(cb, 0.0, sb, 0.0) * Self::new(cg, 0.0, 0.0, sg)
    }

    /// Quaternion norm
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.v.dot(&self.v)).sqrt()
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            w: self.w * factor,
            v: self.v.scale(factor),
        }
    }

    /// Conjugate (the inverse rotation for unit quaternions)
    pub fn conjugate(&self) -> Self {
        Self { w: self.w, v: -self.v }
    }

    /// Rotate a vector
    pub fn rotate(&self, vector: &Vector3D) -> Vector3D {
        // v' = v + 2w (u × v) + 2 u × (u × v)
        let t = self.v.cross(vector).scale(2.0);
        *vector + t.scale(self.w) + self.v.cross(&t)
    }

    /// 3×3 rotation matrix, row-major
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        let (w, x, y, z) = (self.w, self.v.x, self.v.y, self.v.z);
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }

    /// ZYZ Euler angles (α, β, γ) with R = Rz(α) Ry(β) Rz(γ)
    ///
    /// At the poles (β = 0 or π) the rotation is carried entirely by α.
    pub fn to_euler_zyz(&self) -> (f64, f64, f64) {
        let r = self.to_matrix();
        let beta = r[2][2].clamp(-1.0, 1.0).acos();
        if beta.sin() > GIMBAL_EPS {
            let alpha = r[1][2].atan2(r[0][2]);
            let gamma = r[2][1].atan2(-r[2][0]);
            (alpha, beta, gamma)
        } else if r[2][2] > 0.0 {
            (r[1][0].atan2(r[0][0]), 0.0, 0.0)
        } else {
            ((-r[1][0]).atan2(-r[0][0]), std::f64::consts::PI, 0.0)
        }
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, other: Quaternion) -> Quaternion {
        Quaternion {
            w: self.w * other.w - self.v.dot(&other.v),
            v: self.v.cross(&other.v) + other.v.scale(self.w) + self.v.scale(other.w),
        }
    }
}

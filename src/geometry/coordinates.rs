/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Spherical coordinates and vector-component conversions
//!
//! Angles are in radians. Field vectors are complex triples ordered either
//! (x, y, z) or (r, θ, φ) depending on the frame.

use super::vector::Vector3D;
use num_complex::Complex64;

/// A complex 3-vector in either Cartesian or spherical components
pub type ComplexVector3 = [Complex64; 3];

/// Convert a point to spherical coordinates (r, θ, φ) about `origin`
///
/// θ ∈ [0, π], φ ∈ (-π, π]. At r = 0 both angles are zero.
pub fn cart_to_sph(point: &Vector3D, origin: &Vector3D) -> (f64, f64, f64) {
    let d = *point - *origin;
    let r = d.length();
    if r == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let theta = (d.z / r).clamp(-1.0, 1.0).acos();
    let phi = d.y.atan2(d.x);
    (r, theta, phi)
}

/// Convert spherical coordinates about `origin` to a Cartesian point
pub fn sph_to_cart(r: f64, theta: f64, phi: f64, origin: &Vector3D) -> Vector3D {
    let (st, ct) = theta.sin_cos();
    let (sp, cp) = phi.sin_cos();
    *origin + Vector3D::new(r * st * cp, r * st * sp, r * ct)
}

/// Local unit vectors (r̂, θ̂, φ̂) at angles (θ, φ)
pub fn sph_basis_vectors(theta: f64, phi: f64) -> [Vector3D; 3] {
    let (st, ct) = theta.sin_cos();
    let (sp, cp) = phi.sin_cos();
    [
        Vector3D::new(st * cp, st * sp, ct),
        Vector3D::new(ct * cp, ct * sp, -st),
        Vector3D::new(-sp, cp, 0.0),
    ]
}

/// Convert (r, θ, φ) components at (θ, φ) to Cartesian components
pub fn vec_sph_to_cart(v: &ComplexVector3, theta: f64, phi: f64) -> ComplexVector3 {
    let basis = sph_basis_vectors(theta, phi);
    let mut out = [Complex64::new(0.0, 0.0); 3];
    for (component, unit) in v.iter().zip(basis.iter()) {
        out[0] += component * unit.x;
        out[1] += component * unit.y;
        out[2] += component * unit.z;
    }
    out
}

/// Convert Cartesian components to (r, θ, φ) components at (θ, φ)
pub fn vec_cart_to_sph(v: &ComplexVector3, theta: f64, phi: f64) -> ComplexVector3 {
    let basis = sph_basis_vectors(theta, phi);
    let mut out = [Complex64::new(0.0, 0.0); 3];
    for (slot, unit) in out.iter_mut().zip(basis.iter()) {
        *slot = v[0] * unit.x + v[1] * unit.y + v[2] * unit.z;
    }
    out
}

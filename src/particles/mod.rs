/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Particles and their T-matrices
//!
//! A particle couples a shape, a position, an orientation and a material.
//! T-matrices are computed in the body frame (symmetry axis along z) and
//! rotated into the lab frame with Wigner D-matrices.

pub mod ebcm;
pub mod errors;
pub mod mie;

pub use ebcm::ebcm_tmatrix;
pub use errors::{ParticleError, Result};
pub use mie::{mie_cross_sections, mie_sphere, sphere_interior_ratios, sphere_tmatrix, MieCoefficients};

use crate::geometry::{Quaternion, Vector3D};
use crate::materials::SharedMaterial;
use crate::vsh::{rotation, Coefficients};
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Particle geometry in the body frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Sphere of the given radius
    Sphere { radius: f64 },
    /// Spheroid with semi-axis `axial` along z and `transverse` in x and y
    Spheroid { axial: f64, transverse: f64 },
    /// Circular cylinder of the given radius and full height along z
    Cylinder { radius: f64, height: f64 },
}

impl Shape {
    /// Check that all dimensions are positive and finite
    pub fn validate(&self) -> Result<()> {
        let dimensions: &[f64] = match self {
            Shape::Sphere { radius } => &[*radius],
            Shape::Spheroid { axial, transverse } => &[*axial, *transverse],
            Shape::Cylinder { radius, height } => &[*radius, *height],
        };
        if dimensions.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(ParticleError::InvalidGeometry(format!(
                "dimensions of {:?} must be positive",
                self
            )));
        }
        Ok(())
    }

    /// Radius of the smallest sphere about the centre enclosing the shape
    pub fn enclosed_radius(&self) -> f64 {
        match *self {
            Shape::Sphere { radius } => radius,
            Shape::Spheroid { axial, transverse } => axial.max(transverse),
            Shape::Cylinder { radius, height } => radius.hypot(0.5 * height),
        }
    }

    /// The same shape with every length multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Shape {
        match *self {
            Shape::Sphere { radius } => Shape::Sphere {
                radius: radius * factor,
            },
            Shape::Spheroid { axial, transverse } => Shape::Spheroid {
                axial: axial * factor,
                transverse: transverse * factor,
            },
            Shape::Cylinder { radius, height } => Shape::Cylinder {
                radius: radius * factor,
                height: height * factor,
            },
        }
    }

    /// True when the T-matrix is orientation independent
    pub fn is_sphere(&self) -> bool {
        matches!(self, Shape::Sphere { .. })
    }

    fn key_parts(&self) -> [u64; 3] {
        match *self {
            Shape::Sphere { radius } => [0, radius.to_bits(), 0],
            Shape::Spheroid { axial, transverse } => [1, axial.to_bits(), transverse.to_bits()],
            Shape::Cylinder { radius, height } => [2, radius.to_bits(), height.to_bits()],
        }
    }
}

/// Identity of a body-frame T-matrix: shape, permittivity and permeability
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TmatrixKey([u64; 7]);

/// A particle of the cluster
#[derive(Debug, Clone)]
pub struct Particle {
    /// Body-frame geometry
    pub shape: Shape,
    /// Centre position (m)
    pub position: Vector3D,
    /// Rotation taking the body frame to the lab frame
    pub orientation: Quaternion,
    /// Particle material
    pub material: SharedMaterial,
}

impl Particle {
    /// Create an unrotated particle
    pub fn new(shape: Shape, position: Vector3D, material: SharedMaterial) -> Result<Self> {
        shape.validate()?;
        Ok(Self {
            shape,
            position,
            orientation: Quaternion::identity(),
            material,
        })
    }

    /// Set the orientation
    pub fn with_orientation(mut self, orientation: Quaternion) -> Self {
        self.orientation = orientation;
        self
    }

    /// Radius of the sphere about the centre enclosing the particle
    pub fn enclosed_radius(&self) -> f64 {
        self.shape.enclosed_radius()
    }

    /// Key under which identical body-frame T-matrices are shared
    pub fn tmatrix_key(&self, wavelength: f64) -> Result<TmatrixKey> {
        let eps = self.material.eps(wavelength)?;
        let mu = self.material.mu(wavelength)?;
        let [kind, a, b] = self.shape.key_parts();
        Ok(TmatrixKey([
            kind,
            a,
            b,
            eps.re.to_bits(),
            eps.im.to_bits(),
            mu.re.to_bits(),
            mu.im.to_bits(),
        ]))
    }

    fn optical_contrast(&self, wavelength: f64, eps_b: f64, mu_b: f64) -> Result<(f64, Complex64, Complex64)> {
        let n_b = (eps_b * mu_b).sqrt();
        let k_b = 2.0 * PI * n_b / wavelength;
        let relative_index = self.material.index(wavelength)? / n_b;
        let mu_p = self.material.mu(wavelength)?;
        Ok((k_b, relative_index, mu_p))
    }

    /// Body-frame T-matrix, shape `[2 rmax, 2 rmax]`
    ///
    /// # Arguments
    ///
    /// * `lmax` - Maximum multipole order
    /// * `wavelength` - Vacuum wavelength (m)
    /// * `eps_b`, `mu_b` - Relative permittivity and permeability of the medium
    pub fn compute_tmatrix_fixed(
        &self,
        lmax: usize,
        wavelength: f64,
        eps_b: f64,
        mu_b: f64,
    ) -> Result<Array2<Complex64>> {
        let (k_b, relative_index, mu_p) = self.optical_contrast(wavelength, eps_b, mu_b)?;
        let mu_b = Complex64::new(mu_b, 0.0);
        match self.shape {
            Shape::Sphere { radius } => {
                let coefficients = mie_sphere(lmax, radius, k_b, relative_index, mu_b, mu_p)?;
                Ok(sphere_tmatrix(&coefficients))
            }
            _ => ebcm_tmatrix(&self.shape, lmax, k_b, relative_index, mu_b, mu_p),
        }
    }

    /// Lab-frame T-matrix from a body-frame one: T = D T_body D†
    pub fn rotate_tmatrix(&self, tmatrix_fixed: &Array2<Complex64>) -> Result<Array2<Complex64>> {
        if self.shape.is_sphere() {
            return Ok(tmatrix_fixed.clone());
        }
        Ok(rotation::rotate_tmatrix(tmatrix_fixed, &self.orientation)?)
    }

    /// Interior coefficients per unit incident coefficient, shape `[2, rmax]`
    ///
    /// Only spheres have a closed-form interior expansion; other shapes
    /// return `None`.
    pub fn interior_ratios(
        &self,
        lmax: usize,
        wavelength: f64,
        eps_b: f64,
        mu_b: f64,
    ) -> Result<Option<Coefficients>> {
        let Shape::Sphere { radius } = self.shape else {
            return Ok(None);
        };
        let (k_b, relative_index, mu_p) = self.optical_contrast(wavelength, eps_b, mu_b)?;
        let coefficients = mie_sphere(
            lmax,
            radius,
            k_b,
            relative_index,
            Complex64::new(mu_b, 0.0),
            mu_p,
        )?;
        Ok(Some(sphere_interior_ratios(&coefficients)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{ConstantMaterial, DrudeMaterial};
    use crate::vsh::{lmax_to_rmax, mode_index};
    use rstest::rstest;
    use std::sync::Arc;

    fn glass() -> SharedMaterial {
        Arc::new(ConstantMaterial::from_index(1.5))
    }

    #[rstest]
    #[case(Shape::Sphere { radius: 50e-9 }, 50e-9)]
    #[case(Shape::Spheroid { axial: 80e-9, transverse: 40e-9 }, 80e-9)]
    #[case(Shape::Cylinder { radius: 30e-9, height: 80e-9 }, 50e-9)]
    fn test_enclosed_radius(#[case] shape: Shape, #[case] expected: f64) {
        approx::assert_relative_eq!(shape.enclosed_radius(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_shapes_are_rejected() {
        let bad = Shape::Cylinder {
            radius: -1.0,
            height: 1.0,
        };
        assert!(Particle::new(bad, Vector3D::origin(), glass()).is_err());
    }

    #[test]
    fn test_tmatrix_keys() {
        let a = Particle::new(Shape::Sphere { radius: 1e-7 }, Vector3D::origin(), glass()).unwrap();
        let b = Particle::new(
            Shape::Sphere { radius: 1e-7 },
            Vector3D::new(1e-6, 0.0, 0.0),
            glass(),
        )
        .unwrap();
        let c = Particle::new(
            Shape::Sphere { radius: 1e-7 },
            Vector3D::origin(),
            Arc::new(DrudeMaterial::gold()),
        )
        .unwrap();
        let wavelength = 600e-9;
        assert_eq!(a.tmatrix_key(wavelength).unwrap(), b.tmatrix_key(wavelength).unwrap());
        assert_ne!(a.tmatrix_key(wavelength).unwrap(), c.tmatrix_key(wavelength).unwrap());
    }

    #[test]
    fn test_tilted_cylinder_mixes_azimuthal_orders() {
        let particle = Particle::new(
            Shape::Cylinder {
                radius: 40e-9,
                height: 100e-9,
            },
            Vector3D::origin(),
            glass(),
        )
        .unwrap();
        let fixed = particle.compute_tmatrix_fixed(2, 600e-9, 1.0, 1.0).unwrap();
        let (m0, m1) = (mode_index(1, 0), mode_index(1, 1));
        assert!(fixed[(m0, m1)].norm() < 1e-14);

        let tilted = particle
            .clone()
            .with_orientation(Quaternion::from_spherical_coords(0.6, 0.2));
        let lab = tilted.rotate_tmatrix(&fixed).unwrap();
        assert!(lab[(m0, m1)].norm() > 1e-6 * lab[(m0, m0)].norm());

        // the trace is rotation invariant
        let trace = |t: &Array2<Complex64>| (0..t.nrows()).map(|i| t[(i, i)]).sum::<Complex64>();
        assert!((trace(&fixed) - trace(&lab)).norm() < 1e-10 * trace(&fixed).norm());
    }

    #[test]
    fn test_sphere_interior_ratios() {
        let sphere = Particle::new(Shape::Sphere { radius: 60e-9 }, Vector3D::origin(), glass()).unwrap();
        let ratios = sphere.interior_ratios(3, 500e-9, 1.0, 1.0).unwrap().unwrap();
        assert_eq!(ratios.dim(), (2, lmax_to_rmax(3)));

        let cylinder = Particle::new(
            Shape::Cylinder {
                radius: 10e-9,
                height: 20e-9,
            },
            Vector3D::origin(),
            glass(),
        )
        .unwrap();
        assert!(cylinder.interior_ratios(3, 500e-9, 1.0, 1.0).unwrap().is_none());
    }
}

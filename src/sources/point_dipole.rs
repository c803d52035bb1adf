/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Electric point dipoles
//!
//! The dipole field is the outgoing expansion E = A Σ_m ĉ_m N_1m about the
//! dipole position, with ĉ the spherical components of the unit dipole
//! direction.

use super::errors::{Result, SourceError};
use super::Source;
use crate::geometry::{cart_to_sph, vec_sph_to_cart, ComplexVector3, Vector3D};
use crate::vsh::translation::{translate_coefficients, vsh_translation};
use crate::vsh::{expand_e, expand_h, mode_index, zero_coefficients, Coefficients, VshMode, ELECTRIC};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Oscillating electric dipole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDipole {
    /// Dipole position (m)
    pub position: Vector3D,
    /// Normalised complex dipole direction
    pub direction: ComplexVector3,
    /// Amplitude of the dipole expansion
    pub amplitude: f64,
}

impl PointDipole {
    /// Create a unit-amplitude dipole
    ///
    /// # Errors
    ///
    /// The direction must not vanish.
    pub fn new(position: Vector3D, direction: ComplexVector3) -> Result<Self> {
        let norm = direction.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(SourceError::InvalidParameter(
                "dipole direction must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            position,
            direction: direction.map(|c| c / norm),
            amplitude: 1.0,
        })
    }

    /// Real dipole direction
    pub fn linear(position: Vector3D, direction: Vector3D) -> Result<Self> {
        Self::new(
            position,
            direction.to_array().map(|c| Complex64::new(c, 0.0)),
        )
    }

    /// Set the amplitude
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Outgoing expansion about the dipole position (lmax = 1)
    pub fn coefficients(&self) -> Coefficients {
        let [dx, dy, dz] = self.direction;
        let i = Complex64::i();
        let mut p = zero_coefficients(1);
        p[(ELECTRIC, mode_index(1, -1))] = self.amplitude * (dx + i * dy) * FRAC_1_SQRT_2;
        p[(ELECTRIC, mode_index(1, 0))] = self.amplitude * dz;
        p[(ELECTRIC, mode_index(1, 1))] = self.amplitude * (-dx + i * dy) * FRAC_1_SQRT_2;
        p
    }

    /// Finite (regular) part of the dipole's own field at its position
    pub fn regular_self_field(&self) -> ComplexVector3 {
        let scale = self.amplitude / (6.0 * PI).sqrt();
        self.direction.map(|c| c * scale)
    }

    fn local_coordinates(&self, point: &Vector3D) -> Result<(f64, f64, f64)> {
        let (r, theta, phi) = cart_to_sph(point, &self.position);
        if r == 0.0 {
            return Err(SourceError::Singular(
                "field evaluated at the dipole position".to_string(),
            ));
        }
        Ok((r, theta, phi))
    }
}

impl Source for PointDipole {
    fn structure(&self, position: &Vector3D, k: f64, lmax: usize) -> Result<Coefficients> {
        let displacement = *position - self.position;
        if displacement.length() == 0.0 {
            return Err(SourceError::Singular(
                "expansion centre coincides with the dipole".to_string(),
            ));
        }
        let translation = vsh_translation(lmax, 1, &displacement, k, VshMode::Incident)?;
        Ok(translate_coefficients(&self.coefficients(), &translation)?)
    }

    fn e_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3> {
        let (r, theta, phi) = self.local_coordinates(point)?;
        let k = Complex64::new(k, 0.0);
        let e = expand_e(&self.coefficients(), k, VshMode::Outgoing, r, theta, phi)?;
        Ok(vec_sph_to_cart(&e, theta, phi))
    }

    fn h_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3> {
        let (r, theta, phi) = self.local_coordinates(point)?;
        let one = Complex64::new(1.0, 0.0);
        let h = expand_h(
            &self.coefficients(),
            Complex64::new(k, 0.0),
            VshMode::Outgoing,
            one,
            one,
            r,
            theta,
            phi,
        )?;
        Ok(vec_sph_to_cart(&h, theta, phi))
    }

    fn as_point_dipole(&self) -> Option<&PointDipole> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_reproduces_field() {
        let dipole = PointDipole::new(
            Vector3D::new(0.1, -0.3, 0.2),
            [
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.5),
                Complex64::new(-0.4, 0.0),
            ],
        )
        .unwrap();
        let k = 1.0;
        let centre = Vector3D::new(0.8, 0.4, -0.5);
        let p = dipole.structure(&centre, k, 16).unwrap();

        let point = centre + Vector3D::new(0.15, -0.2, 0.1);
        let (r, theta, phi) = cart_to_sph(&point, &centre);
        let expanded = vec_sph_to_cart(
            &expand_e(&p, Complex64::new(k, 0.0), VshMode::Incident, r, theta, phi).unwrap(),
            theta,
            phi,
        );
        let direct = dipole.e_field(&point, k).unwrap();
        let scale = direct.iter().map(|c| c.norm()).fold(0.0, f64::max);
        for c in 0..3 {
            assert!((expanded[c] - direct[c]).norm() < 1e-6 * scale);
        }
    }

    #[test]
    fn test_regular_self_field() {
        let dipole = PointDipole::linear(Vector3D::origin(), Vector3D::new(1.0, 2.0, -2.0)).unwrap();
        let regular = expand_e(
            &dipole.coefficients(),
            Complex64::new(3.0, 0.0),
            VshMode::Incident,
            0.0,
            0.0,
            0.0,
        )
        .unwrap();
        let expected = dipole.regular_self_field();
        // spherical components at θ = φ = 0 are (z, x, y)
        let cartesian = vec_sph_to_cart(&regular, 0.0, 0.0);
        for c in 0..3 {
            assert!((cartesian[c] - expected[c]).norm() < 1e-12);
        }
    }

    #[test]
    fn test_singular_points() {
        let dipole = PointDipole::linear(Vector3D::origin(), Vector3D::unit_z()).unwrap();
        assert!(dipole.e_field(&Vector3D::origin(), 1.0).is_err());
        assert!(dipole.structure(&Vector3D::origin(), 1.0, 2).is_err());
        assert!(PointDipole::linear(Vector3D::origin(), Vector3D::origin()).is_err());
        assert!(dipole.as_point_dipole().is_some());
    }
}

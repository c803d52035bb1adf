/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Polarized plane waves
//!
//! The propagation direction k̂ is given by (θ, φ); the polarization is a
//! complex (TM, TE) pair along (θ̂, φ̂) at k̂. The regular expansion about a
//! point uses
//!
//! * a_nm = 4π iⁿ⁻¹ ê·n̂*_nm(k̂)
//! * b_nm = 4π iⁿ ê·m̂*_nm(k̂)
//!
//! where m̂ and n̂ are the tangential angular parts of M and N.
//!
//! The angular spectrum of a plane wave is a delta on k̂. It is represented by
//! its weight: the field at the coordinate origin projected on (θ̂, φ̂) along
//! k̂, and zero in every other direction.

use super::errors::{Result, SourceError};
use super::Source;
use crate::geometry::{sph_basis_vectors, ComplexVector3, Vector3D};
use crate::utils::constants::Z_0;
use crate::vsh::legendre::AngularFunctions;
use crate::vsh::{gamma_n, mode_indices, zero_coefficients, Coefficients, ELECTRIC, MAGNETIC};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Directions closer than this (1 - cos) share the spectral delta
const DIRECTION_TOLERANCE: f64 = 1e-12;

/// Plane wave propagating along (θ, φ)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneWave {
    /// Normalised (TM, TE) Jones vector
    pub polarization: [Complex64; 2],
    /// Polar angle of the propagation direction
    pub theta: f64,
    /// Azimuthal angle of the propagation direction
    pub phi: f64,
    /// Field amplitude (V/m)
    pub amplitude: f64,
    /// Global phase (rad)
    pub phase: f64,
    /// Point where the phase is referenced
    pub origin: Vector3D,
}

impl PlaneWave {
    /// Create a unit-amplitude plane wave
    ///
    /// # Errors
    ///
    /// The polarization must not vanish.
    pub fn new(polarization: [Complex64; 2], theta: f64, phi: f64) -> Result<Self> {
        let norm = (polarization[0].norm_sqr() + polarization[1].norm_sqr()).sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(SourceError::InvalidParameter(
                "plane wave polarization must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            polarization: [polarization[0] / norm, polarization[1] / norm],
            theta,
            phi,
            amplitude: 1.0,
            phase: 0.0,
            origin: Vector3D::origin(),
        })
    }

    fn along_z(polarization: [Complex64; 2]) -> Self {
        Self {
            polarization,
            theta: 0.0,
            phi: 0.0,
            amplitude: 1.0,
            phase: 0.0,
            origin: Vector3D::origin(),
        }
    }

    /// x-polarized wave travelling along +z
    pub fn x_polarized() -> Self {
        Self::along_z([Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)])
    }

    /// y-polarized wave travelling along +z
    pub fn y_polarized() -> Self {
        Self::along_z([Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)])
    }

    /// Right-handed circularly polarized wave travelling along +z
    pub fn rhc() -> Self {
        Self::along_z([
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, FRAC_1_SQRT_2),
        ])
    }

    /// Left-handed circularly polarized wave travelling along +z
    pub fn lhc() -> Self {
        Self::along_z([
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, -FRAC_1_SQRT_2),
        ])
    }

    /// Set the amplitude
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the global phase
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Set the phase reference point
    pub fn with_origin(mut self, origin: Vector3D) -> Self {
        self.origin = origin;
        self
    }

    /// Unit propagation vector
    pub fn k_hat(&self) -> Vector3D {
        sph_basis_vectors(self.theta, self.phi)[0]
    }

    /// Cartesian polarization vector ê
    fn e_hat(&self) -> ComplexVector3 {
        let [_, tm, te] = sph_basis_vectors(self.theta, self.phi);
        let [p_tm, p_te] = self.polarization;
        [
            p_tm * tm.x + p_te * te.x,
            p_tm * tm.y + p_te * te.y,
            p_tm * tm.z + p_te * te.z,
        ]
    }

    /// Complex amplitude including the propagation phase at `point`
    fn amplitude_at(&self, point: &Vector3D, k: f64) -> Complex64 {
        let path = self.k_hat().dot(&(*point - self.origin));
        Complex64::from_polar(self.amplitude, self.phase + k * path)
    }
}

impl Source for PlaneWave {
    fn structure(&self, position: &Vector3D, k: f64, lmax: usize) -> Result<Coefficients> {
        let i = Complex64::i();
        let factor = 4.0 * PI * self.amplitude_at(position, k);
        let angular = AngularFunctions::new(lmax, self.theta);
        let [p_tm, p_te] = self.polarization;

        let mut p = zero_coefficients(lmax);
        for (r, n, m) in mode_indices(lmax) {
            let pi = angular.pi(n, m);
            let tau = angular.tau(n, m);
            let phase = Complex64::from_polar(gamma_n(n), -(m as f64) * self.phi);
            let e_dot_n = phase * (p_tm * tau - i * p_te * pi);
            let e_dot_m = phase * (-i * p_tm * pi - p_te * tau);
            let i_n = i.powu(n as u32);
            p[(ELECTRIC, r)] = factor * i_n * (-i) * e_dot_n;
            p[(MAGNETIC, r)] = factor * i_n * e_dot_m;
        }
        Ok(p)
    }

    fn e_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3> {
        let amplitude = self.amplitude_at(point, k);
        Ok(self.e_hat().map(|c| c * amplitude))
    }

    fn h_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3> {
        let e = self.e_field(point, k)?;
        let kh = self.k_hat();
        Ok([
            kh.y * e[2] - kh.z * e[1],
            kh.z * e[0] - kh.x * e[2],
            kh.x * e[1] - kh.y * e[0],
        ])
    }

    fn angular_spectrum(&self, theta: f64, phi: f64, k: f64) -> Result<[Complex64; 2]> {
        let [r_hat, theta_hat, phi_hat] = sph_basis_vectors(theta, phi);
        if 1.0 - r_hat.dot(&self.k_hat()) > DIRECTION_TOLERANCE {
            return Ok([Complex64::new(0.0, 0.0); 2]);
        }
        let e = self.e_field(&Vector3D::origin(), k)?;
        let project = |u: Vector3D| e[0] * u.x + e[1] * u.y + e[2] * u.z;
        Ok([project(theta_hat), project(phi_hat)])
    }

    /// |E0|²/(2η) with η = Z0·√(μ_b/ε_b)
    fn power_density(&self, eps_b: f64, mu_b: f64) -> Result<f64> {
        if eps_b <= 0.0 || mu_b <= 0.0 {
            return Err(SourceError::InvalidParameter(format!(
                "power density needs positive eps and mu, got eps = {}, mu = {}",
                eps_b, mu_b
            )));
        }
        Ok(self.amplitude * self.amplitude * (eps_b / mu_b).sqrt() / (2.0 * Z_0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{cart_to_sph, vec_sph_to_cart};
    use crate::vsh::{expand_e, expand_h, VshMode};
    use rstest::rstest;

    fn assert_close(a: &ComplexVector3, b: &ComplexVector3, tol: f64) {
        for c in 0..3 {
            assert!((a[c] - b[c]).norm() < tol, "component {}: {} vs {}", c, a[c], b[c]);
        }
    }

    #[rstest]
    #[case(PlaneWave::x_polarized())]
    #[case(PlaneWave::rhc())]
    #[case(PlaneWave::new([Complex64::new(0.3, 0.1), Complex64::new(-0.5, 0.8)], 1.1, -2.3).unwrap())]
    #[case(PlaneWave::new([Complex64::new(0.0, 1.0), Complex64::new(1.0, 0.0)], 2.5, 0.7).unwrap().with_phase(0.4))]
    fn test_expansion_reproduces_field(#[case] wave: PlaneWave) {
        let k = 1.0;
        let centre = Vector3D::new(0.4, -0.2, 0.9);
        let p = wave.structure(&centre, k, 12).unwrap();

        let point = Vector3D::new(0.9, 0.3, 0.5);
        let (r, theta, phi) = cart_to_sph(&point, &centre);
        let kc = Complex64::new(k, 0.0);
        let e = vec_sph_to_cart(&expand_e(&p, kc, VshMode::Incident, r, theta, phi).unwrap(), theta, phi);
        assert_close(&e, &wave.e_field(&point, k).unwrap(), 1e-9);

        let one = Complex64::new(1.0, 0.0);
        let h = vec_sph_to_cart(
            &expand_h(&p, kc, VshMode::Incident, one, one, r, theta, phi).unwrap(),
            theta,
            phi,
        );
        assert_close(&h, &wave.h_field(&point, k).unwrap(), 1e-9);
    }

    #[test]
    fn test_polarization_is_normalised() {
        let wave = PlaneWave::new([Complex64::new(3.0, 0.0), Complex64::new(0.0, 4.0)], 0.0, 0.0).unwrap();
        let norm = wave.polarization[0].norm_sqr() + wave.polarization[1].norm_sqr();
        assert!((norm - 1.0).abs() < 1e-14);
        assert!(PlaneWave::new([Complex64::new(0.0, 0.0); 2], 0.0, 0.0).is_err());
    }

    #[test]
    fn test_x_polarized_field() {
        let wave = PlaneWave::x_polarized();
        let e = wave.e_field(&Vector3D::new(0.0, 0.0, 0.25), 2.0 * PI).unwrap();
        // quarter wavelength: phase of π/2
        assert!((e[0] - Complex64::i()).norm() < 1e-12);
        let h = wave.h_field(&Vector3D::origin(), 1.0).unwrap();
        assert!((h[1] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_angular_spectrum_is_the_polarization_along_k() {
        let wave = PlaneWave::rhc().with_amplitude(3.0);
        let a = wave.angular_spectrum(0.0, 0.0, 1.0).unwrap();
        assert!((a[0] - Complex64::new(3.0 * FRAC_1_SQRT_2, 0.0)).norm() < 1e-12);
        assert!((a[1] - Complex64::new(0.0, 3.0 * FRAC_1_SQRT_2)).norm() < 1e-12);

        let tilted = PlaneWave::new([Complex64::new(0.6, 0.0), Complex64::new(0.0, 0.8)], 1.1, -2.3).unwrap();
        let b = tilted.angular_spectrum(1.1, -2.3, 1.0).unwrap();
        assert!((b[0] - Complex64::new(0.6, 0.0)).norm() < 1e-12);
        assert!((b[1] - Complex64::new(0.0, 0.8)).norm() < 1e-12);

        let off_axis = tilted.angular_spectrum(1.2, -2.3, 1.0).unwrap();
        assert_eq!(off_axis, [Complex64::new(0.0, 0.0); 2]);
    }

    #[test]
    fn test_angular_spectrum_phase_follows_origin() {
        let (k, shift) = (2.0 * PI, 0.125);
        let wave = PlaneWave::x_polarized()
            .with_phase(0.3)
            .with_origin(Vector3D::new(0.0, 0.0, shift));
        let a = wave.angular_spectrum(0.0, 0.0, k).unwrap();
        // the phase is referenced an eighth of a wavelength downstream
        assert!((a[0] - Complex64::from_polar(1.0, 0.3 - PI / 4.0)).norm() < 1e-12);
        assert!(a[1].norm() < 1e-14);
    }

    #[rstest]
    #[case(1.0, 1.0)]
    #[case(2.25, 1.0)]
    #[case(1.77, 1.2)]
    fn test_power_density_matches_poynting_vector(#[case] eps_b: f64, #[case] mu_b: f64) {
        let wave = PlaneWave::new([Complex64::new(0.3, 0.1), Complex64::new(-0.5, 0.8)], 0.7, 2.0)
            .unwrap()
            .with_amplitude(5.0);
        let point = Vector3D::new(0.2, -0.4, 0.9);
        let e = wave.e_field(&point, 3.0).unwrap();
        // physical H = √(ε/μ)·h / Z0
        let h = wave.h_field(&point, 3.0).unwrap().map(|c| c.conj() * (eps_b / mu_b).sqrt() / Z_0);
        let s = [
            0.5 * (e[1] * h[2] - e[2] * h[1]).re,
            0.5 * (e[2] * h[0] - e[0] * h[2]).re,
            0.5 * (e[0] * h[1] - e[1] * h[0]).re,
        ];
        let flux = Vector3D::new(s[0], s[1], s[2]).dot(&wave.k_hat());

        let density = wave.power_density(eps_b, mu_b).unwrap();
        assert!((density - flux).abs() < 1e-12 * density);
        assert!((density - 25.0 * (eps_b / mu_b).sqrt() / (2.0 * Z_0)).abs() < 1e-15);
    }

    #[test]
    fn test_power_density_scales_with_medium_index() {
        let wave = PlaneWave::x_polarized();
        let vacuum = wave.power_density(1.0, 1.0).unwrap();
        assert!((vacuum - 1.0 / (2.0 * Z_0)).abs() < 1e-18);
        let water = wave.power_density(1.33 * 1.33, 1.0).unwrap();
        assert!((water / vacuum - 1.33).abs() < 1e-12);
        assert!(wave.power_density(-1.0, 1.0).is_err());
    }
}

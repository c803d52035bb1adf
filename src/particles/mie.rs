/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Analytical Mie theory for homogeneous (optionally magnetic) spheres
//!
//! Scattering coefficients a_n (electric) and b_n (magnetic) and the interior
//! coefficients c_n (magnetic) and d_n (electric), in the Bohren–Huffman
//! convention. For the normalised VSH basis the sphere T-matrix is diagonal
//! with T_NN = −a_n and T_MM = −b_n.

use super::errors::{ParticleError, Result};
use crate::vsh::bessel::RadialFunctions;
use crate::vsh::{lmax_to_rmax, mode_indices, Coefficients, VshMode, ELECTRIC, MAGNETIC};
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Mie coefficients for orders n = 1..=lmax (index n − 1)
#[derive(Debug, Clone)]
pub struct MieCoefficients {
    /// Electric scattering coefficients
    pub an: Vec<Complex64>,
    /// Magnetic scattering coefficients
    pub bn: Vec<Complex64>,
    /// Magnetic interior coefficients
    pub cn: Vec<Complex64>,
    /// Electric interior coefficients
    pub dn: Vec<Complex64>,
}

impl MieCoefficients {
    /// Maximum multipole order held
    pub fn lmax(&self) -> usize {
        self.an.len()
    }
}

/// Compute the Mie coefficients of a sphere
///
/// # Arguments
///
/// * `lmax` - Maximum multipole order
/// * `radius` - Sphere radius (m)
/// * `k_b` - Wavenumber in the medium (1/m)
/// * `relative_index` - Particle index divided by medium index
/// * `mu_b` - Relative permeability of the medium
/// * `mu_p` - Relative permeability of the particle
pub fn mie_sphere(
    lmax: usize,
    radius: f64,
    k_b: f64,
    relative_index: Complex64,
    mu_b: Complex64,
    mu_p: Complex64,
) -> Result<MieCoefficients> {
    if radius <= 0.0 || !radius.is_finite() {
        return Err(ParticleError::InvalidGeometry(format!(
            "sphere radius must be positive, got {}",
            radius
        )));
    }
    let m = relative_index;
    let x = Complex64::new(k_b * radius, 0.0);
    let mx = m * x;

    let reg = RadialFunctions::new(VshMode::Incident, lmax, x)?;
    let out = RadialFunctions::new(VshMode::Outgoing, lmax, x)?;
    let int = RadialFunctions::new(VshMode::Interior, lmax, mx)?;

    let mut coefficients = MieCoefficients {
        an: Vec::with_capacity(lmax),
        bn: Vec::with_capacity(lmax),
        cn: Vec::with_capacity(lmax),
        dn: Vec::with_capacity(lmax),
    };

    for n in 1..=lmax {
        let (j, jt) = (reg.values[n], reg.riccati[n]);
        let (h, ht) = (out.values[n], out.riccati[n]);
        let (j1, j1t) = (int.values[n], int.riccati[n]);

        let a_num = mu_b * m * m * j1 * jt - mu_p * m * j * j1t;
        let a_den = mu_b * m * m * j1 * ht - mu_p * m * h * j1t;
        let b_num = mu_p * j1 * jt - mu_b * m * j * j1t;
        let b_den = mu_p * j1 * ht - mu_b * m * h * j1t;

        if a_den.norm() == 0.0 || b_den.norm() == 0.0 {
            return Err(ParticleError::TmatrixFailed(format!(
                "vanishing Mie denominator at n = {}",
                n
            )));
        }

        let wronskian = j * ht - h * jt;
        coefficients.an.push(a_num / a_den);
        coefficients.bn.push(b_num / b_den);
        coefficients.cn.push(mu_p * wronskian / b_den);
        coefficients.dn.push(mu_p * m * wronskian / a_den);
    }

    Ok(coefficients)
}

/// Diagonal sphere T-matrix of shape `[2 rmax, 2 rmax]`
pub fn sphere_tmatrix(coefficients: &MieCoefficients) -> Array2<Complex64> {
    let lmax = coefficients.lmax();
    let rmax = lmax_to_rmax(lmax);
    let mut t = Array2::<Complex64>::zeros((2 * rmax, 2 * rmax));
    for (r, n, _) in mode_indices(lmax) {
        t[(ELECTRIC * rmax + r, ELECTRIC * rmax + r)] = -coefficients.an[n - 1];
        t[(MAGNETIC * rmax + r, MAGNETIC * rmax + r)] = -coefficients.bn[n - 1];
    }
    t
}

/// Ratios of interior to incident coefficients, shape `[2, rmax]`
pub fn sphere_interior_ratios(coefficients: &MieCoefficients) -> Coefficients {
    let lmax = coefficients.lmax();
    let mut ratios = Coefficients::zeros((2, lmax_to_rmax(lmax)));
    for (r, n, _) in mode_indices(lmax) {
        ratios[(ELECTRIC, r)] = coefficients.dn[n - 1];
        ratios[(MAGNETIC, r)] = coefficients.cn[n - 1];
    }
    ratios
}

/// Single-sphere cross sections (scattering, absorption, extinction) in m²
pub fn mie_cross_sections(coefficients: &MieCoefficients, k_b: f64) -> (f64, f64, f64) {
    let mut scattering = 0.0;
    let mut extinction = 0.0;
    for (i, (a, b)) in coefficients.an.iter().zip(&coefficients.bn).enumerate() {
        let weight = (2 * (i + 1) + 1) as f64;
        scattering += weight * (a.norm_sqr() + b.norm_sqr());
        extinction += weight * (a + b).re;
    }
    let prefactor = 2.0 * PI / (k_b * k_b);
    let scattering = prefactor * scattering;
    let extinction = prefactor * extinction;
    (scattering, extinction - scattering, extinction)
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Evaluation of VSH expansions
//!
//! Fields are returned as spherical components (r, θ, φ) about the expansion
//! centre.
//!
//! * M_nm = γ_n z_n(kr) [iπ θ̂ − τ φ̂] e^{imφ}
//! * N_nm = γ_n [n(n+1) z_n/(kr) P̃ r̂ + z̃_n (τ θ̂ + iπ φ̂)] e^{imφ}
//!
//! with z̃_n = (1/kr) d[kr z_n(kr)]/d(kr).

use super::bessel::RadialFunctions;
use super::errors::{Result, VshError};
use super::legendre::AngularFunctions;
use super::{gamma_n, mode_indices, rmax_to_lmax, swap_polarizations, Coefficients, VshMode};
use super::{ELECTRIC, MAGNETIC};
use crate::geometry::ComplexVector3;
use num_complex::Complex64;

fn zero3() -> ComplexVector3 {
    [Complex64::new(0.0, 0.0); 3]
}

/// M and N for one mode given precomputed radial and angular functions
fn mode_vectors(
    n: usize,
    m: i32,
    radial: &RadialFunctions,
    angular: &AngularFunctions,
    x: Complex64,
    phi: f64,
) -> (ComplexVector3, ComplexVector3) {
    let i = Complex64::i();
    let phase = Complex64::from_polar(gamma_n(n), m as f64 * phi);
    let pi = angular.pi(n, m);
    let tau = angular.tau(n, m);

    let zn = radial.values[n] * phase;
    let zt = radial.riccati[n] * phase;
    let radial_part = radial.over_argument(n, x) * phase * ((n * (n + 1)) as f64) * angular.p(n, m);

    let m_vec = [Complex64::new(0.0, 0.0), i * pi * zn, -tau * zn];
    let n_vec = [radial_part, tau * zt, i * pi * zt];
    (m_vec, n_vec)
}

/// Normalised VSH (M_nm, N_nm) at one point
///
/// # Arguments
///
/// * `n`, `m` - Multipole degree and order
/// * `mode` - Radial family
/// * `k` - Wavenumber in the medium (complex inside absorbing particles)
/// * `r`, `theta`, `phi` - Spherical coordinates about the expansion centre
pub fn vsh_functions(
    n: usize,
    m: i32,
    mode: VshMode,
    k: Complex64,
    r: f64,
    theta: f64,
    phi: f64,
) -> Result<(ComplexVector3, ComplexVector3)> {
    if n == 0 || m.unsigned_abs() as usize > n {
        return Err(VshError::InvalidOrder(format!("(n, m) = ({}, {})", n, m)));
    }
    let x = k * r;
    let radial = RadialFunctions::new(mode, n, x)?;
    let angular = AngularFunctions::new(n, theta);
    Ok(mode_vectors(n, m, &radial, &angular, x, phi))
}

/// Electric field E = Σ p_N N + p_M M of an expansion
///
/// # Arguments
///
/// * `p` - Coefficients, shape `[2, rmax]`
/// * `k` - Wavenumber of the region the expansion lives in
/// * `mode` - Radial family of the expansion
/// * `r`, `theta`, `phi` - Evaluation point relative to the expansion centre
///
/// # Returns
///
/// Spherical components (E_r, E_θ, E_φ)
pub fn expand_e(
    p: &Coefficients,
    k: Complex64,
    mode: VshMode,
    r: f64,
    theta: f64,
    phi: f64,
) -> Result<ComplexVector3> {
    let lmax = rmax_to_lmax(p.ncols())?;
    let mut field = zero3();
    if lmax == 0 {
        return Ok(field);
    }

    let x = k * r;
    let radial = RadialFunctions::new(mode, lmax, x)?;
    let angular = AngularFunctions::new(lmax, theta);

    for (idx, n, m) in mode_indices(lmax) {
        let (m_vec, n_vec) = mode_vectors(n, m, &radial, &angular, x, phi);
        let pn = p[(ELECTRIC, idx)];
        let pm = p[(MAGNETIC, idx)];
        for c in 0..3 {
            field[c] += pn * n_vec[c] + pm * m_vec[c];
        }
    }
    Ok(field)
}

/// Magnetic field Z0·H of an expansion in a region with relative ε and μ
///
/// Z0·H = −i √(ε/μ) Σ (p_N M + p_M N)
pub fn expand_h(
    p: &Coefficients,
    k: Complex64,
    mode: VshMode,
    eps: Complex64,
    mu: Complex64,
    r: f64,
    theta: f64,
    phi: f64,
) -> Result<ComplexVector3> {
    let factor = -Complex64::i() * (eps / mu).sqrt();
    let field = expand_e(&swap_polarizations(p), k, mode, r, theta, phi)?;
    Ok(field.map(|c| c * factor))
}

/// Far-field electric field of an outgoing expansion
///
/// Uses h_n(kr) → (−i)^{n+1} e^{ikr}/(kr); the radial component vanishes.
pub fn expand_e_far(p: &Coefficients, k: f64, r: f64, theta: f64, phi: f64) -> Result<ComplexVector3> {
    let lmax = rmax_to_lmax(p.ncols())?;
    let kr = k * r;
    if kr <= 0.0 {
        return Err(VshError::Singular(
            "far-field expansion requires r > 0".to_string(),
        ));
    }

    let i = Complex64::i();
    let spherical_wave = Complex64::from_polar(1.0 / kr, kr);
    let angular = AngularFunctions::new(lmax, theta);

    let mut field = zero3();
    let mut minus_i_pow = Complex64::new(1.0, 0.0);
    for n in 1..=lmax {
        // (−i)^n
        minus_i_pow *= -i;
        let h_tilde = minus_i_pow * spherical_wave;
        let h = -i * h_tilde;
        let ni = n as i32;
        for m in -ni..=ni {
            let idx = super::mode_index(n, m);
            let phase = Complex64::from_polar(gamma_n(n), m as f64 * phi);
            let pi = angular.pi(n, m);
            let tau = angular.tau(n, m);
            let pn = p[(ELECTRIC, idx)] * phase;
            let pm = p[(MAGNETIC, idx)] * phase;
            field[1] += pn * h_tilde * tau + pm * h * i * pi;
            field[2] += pn * h_tilde * i * pi - pm * h * tau;
        }
    }
    Ok(field)
}

/// Far-field Z0·H of an outgoing expansion in a medium with relative ε and μ
pub fn expand_h_far(
    p: &Coefficients,
    k: f64,
    eps: Complex64,
    mu: Complex64,
    r: f64,
    theta: f64,
    phi: f64,
) -> Result<ComplexVector3> {
    let factor = -Complex64::i() * (eps / mu).sqrt();
    let field = expand_e_far(&swap_polarizations(p), k, r, theta, phi)?;
    Ok(field.map(|c| c * factor))
}

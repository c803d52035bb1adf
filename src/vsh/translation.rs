/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Addition theorem for vector spherical harmonics
//!
//! An outgoing expansion about a source centre is re-expanded about a target
//! centre displaced by d = r_target − r_source:
//!
//! * M³_nm = Σ A_{νμ,nm} M_νμ + B_{νμ,nm} N_νμ
//! * N³_nm = Σ A_{νμ,nm} N_νμ + B_{νμ,nm} M_νμ
//!
//! where the target-side functions are regular (inside the sphere of radius
//! |d|) or outgoing (outside it). A and B are built from the scalar addition
//! coefficients written with Gaunt integrals.

use super::bessel::{spherical_hankel1, spherical_jn};
use super::errors::{Result, VshError};
use super::legendre::AngularFunctions;
use super::{gamma_n, lmax_to_rmax, mode_indices, rmax_to_lmax, Coefficients, VshMode};
use super::{ELECTRIC, MAGNETIC};
use crate::geometry::{cart_to_sph, Vector3D};
use crate::utils::math::gaunt_coefficient;
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Translation matrices A and B, shape `[rmax_out, rmax_in]`
#[derive(Debug, Clone)]
pub struct TranslationCoefficients {
    /// Coefficients coupling like harmonics (M→M, N→N)
    pub a: Array2<Complex64>,
    /// Coefficients coupling unlike harmonics (M→N, N→M)
    pub b: Array2<Complex64>,
}

/// i^e for any integer exponent
fn i_pow(e: i32) -> Complex64 {
    match e.rem_euclid(4) {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// Precomputed radial and angular factors of the displacement
struct ScalarAddition {
    radial: Vec<Complex64>,
    angular: AngularFunctions,
    phi: f64,
}

impl ScalarAddition {
    /// p-th term of the scalar coefficient β_{νμ,nm}
    fn term(&self, nu: usize, mu: i32, n: usize, m: i32, p: usize) -> Complex64 {
        let q = mu - m;
        if q.unsigned_abs() as usize > p {
            return Complex64::new(0.0, 0.0);
        }
        let sign = if mu.rem_euclid(2) == 0 { 1.0 } else { -1.0 };
        let gaunt = sign * gaunt_coefficient(n as i32, m, nu as i32, -mu, p as i32, q);
        if gaunt == 0.0 {
            return Complex64::new(0.0, 0.0);
        }
        let y_conj = Complex64::from_polar(self.angular.p(p, q), -(q as f64) * self.phi);
        4.0 * PI * i_pow(nu as i32 + p as i32 - n as i32) * self.radial[p] * y_conj * gaunt
    }

    /// Range of p contributing to (ν, n)
    fn p_range(nu: usize, n: usize) -> std::ops::RangeInclusive<usize> {
        nu.abs_diff(n)..=(nu + n)
    }

    /// Full scalar coefficient β_{νμ,nm}
    fn alpha(&self, nu: usize, mu: i32, n: usize, m: i32) -> Complex64 {
        if mu.unsigned_abs() as usize > nu {
            return Complex64::new(0.0, 0.0);
        }
        Self::p_range(nu, n)
            .map(|p| self.term(nu, mu, n, m, p))
            .sum()
    }
}

/// VSH translation coefficients
///
/// # Arguments
///
/// * `lmax_out` - Multipole order of the re-expansion about the target
/// * `lmax_in` - Multipole order of the outgoing expansion about the source
/// * `displacement` - r_target − r_source (metres)
/// * `k` - Wavenumber of the medium
/// * `mode` - `Incident` for a regular re-expansion, `Outgoing` for an
///   outgoing re-expansion valid outside the displacement sphere
///
/// # Returns
///
/// A and B of shape `[rmax(lmax_out), rmax(lmax_in)]`
pub fn vsh_translation(
    lmax_out: usize,
    lmax_in: usize,
    displacement: &Vector3D,
    k: f64,
    mode: VshMode,
) -> Result<TranslationCoefficients> {
    let (d, theta, phi) = cart_to_sph(displacement, &Vector3D::origin());
    let kd = Complex64::new(k * d, 0.0);
    let pmax = lmax_out + lmax_in;

    let radial = match mode {
        VshMode::Incident => {
            if d == 0.0 {
                return Err(VshError::Singular(
                    "outgoing to regular translation over zero distance".to_string(),
                ));
            }
            spherical_hankel1(pmax, kd)?
        }
        VshMode::Outgoing => spherical_jn(pmax, kd)?,
        other => {
            return Err(VshError::InvalidOrder(format!(
                "translation into {:?} waves is not defined",
                other
            )))
        }
    };

    let scalar = ScalarAddition {
        radial,
        angular: AngularFunctions::new(pmax, theta),
        phi,
    };

    let rmax_out = lmax_to_rmax(lmax_out);
    let rmax_in = lmax_to_rmax(lmax_in);
    let mut a = Array2::<Complex64>::zeros((rmax_out, rmax_in));
    let mut b = Array2::<Complex64>::zeros((rmax_out, rmax_in));

    let d_z = displacement.z;
    let d_plus = Complex64::new(displacement.x, displacement.y);
    let d_minus = Complex64::new(displacement.x, -displacement.y);
    let ik = Complex64::new(0.0, k);

    for (r_out, nu, mu) in mode_indices(lmax_out) {
        let nuf = nu as f64;
        let muf = mu as f64;
        for (r_in, n, m) in mode_indices(lmax_in) {
            let gamma = gamma_n(n) * gamma_n(nu);
            let nf = n as f64;

            let mut a_sum = Complex64::new(0.0, 0.0);
            for p in ScalarAddition::p_range(nu, n) {
                let pf = p as f64;
                let weight = 0.5 * (nf * (nf + 1.0) + nuf * (nuf + 1.0) - pf * (pf + 1.0));
                if weight != 0.0 {
                    a_sum += weight * scalar.term(nu, mu, n, m, p);
                }
            }
            a[(r_out, r_in)] = gamma * a_sum;

            let mut b_sum = muf * d_z * scalar.alpha(nu, mu, n, m);
            let lower = ((nuf - muf + 1.0) * (nuf + muf)).sqrt();
            if lower > 0.0 {
                b_sum += 0.5 * d_minus * lower * scalar.alpha(nu, mu - 1, n, m);
            }
            let upper = ((nuf + muf + 1.0) * (nuf - muf)).sqrt();
            if upper > 0.0 {
                b_sum += 0.5 * d_plus * upper * scalar.alpha(nu, mu + 1, n, m);
            }
            b[(r_out, r_in)] = ik * gamma * b_sum;
        }
    }

    Ok(TranslationCoefficients { a, b })
}

/// Apply translation coefficients to an outgoing expansion
///
/// a_N = A p_N + B p_M, a_M = B p_N + A p_M
pub fn translate_coefficients(
    p: &Coefficients,
    translation: &TranslationCoefficients,
) -> Result<Coefficients> {
    let (rmax_out, rmax_in) = translation.a.dim();
    if p.ncols() != rmax_in {
        return Err(VshError::DimensionMismatch(format!(
            "coefficients with {} modes translated by a matrix expecting {}",
            p.ncols(),
            rmax_in
        )));
    }
    rmax_to_lmax(rmax_out)?;

    let pn = p.row(ELECTRIC);
    let pm = p.row(MAGNETIC);
    let a_pn = translation.a.dot(&pn);
    let a_pm = translation.a.dot(&pm);
    let b_pn = translation.b.dot(&pn);
    let b_pm = translation.b.dot(&pm);

    let mut out = Coefficients::zeros((2, rmax_out));
    out.row_mut(ELECTRIC).assign(&(&a_pn + &b_pm));
    out.row_mut(MAGNETIC).assign(&(&b_pn + &a_pm));
    Ok(out)
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Wigner D-matrices and rotation of multipole coefficients
//!
//! For an active rotation R = Rz(α) Ry(β) Rz(γ) the coefficients of a
//! rotated field are p'_{nm'} = Σ_m D^n_{m'm}(α, β, γ) p_{nm}, with
//! D^n_{m'm} = e^{−im'α} d^n_{m'm}(β) e^{−imγ}.

use super::errors::{Result, VshError};
use super::{lmax_to_rmax, mode_index, rmax_to_lmax, Coefficients};
use crate::geometry::Quaternion;
use crate::utils::math::ln_factorial;
use ndarray::Array2;
use num_complex::Complex64;

/// Wigner small-d matrix element d^n_{m'm}(β)
pub fn wigner_d_small(n: usize, m_prime: i32, m: i32, beta: f64) -> f64 {
    let j = n as i32;
    if m_prime.abs() > j || m.abs() > j {
        return 0.0;
    }

    let lf = |k: i32| ln_factorial(k as u32);
    let ln_norm = 0.5 * (lf(j + m_prime) + lf(j - m_prime) + lf(j + m) + lf(j - m));
    let (s, c) = (0.5 * beta).sin_cos();

    let s_min = 0.max(m - m_prime);
    let s_max = (j + m).min(j - m_prime);
    let mut sum = 0.0;
    for k in s_min..=s_max {
        let ln_den = lf(j + m - k) + lf(k) + lf(m_prime - m + k) + lf(j - m_prime - k);
        let cos_pow = 2 * j + m - m_prime - 2 * k;
        let sin_pow = m_prime - m + 2 * k;
        let sign = if (m_prime - m + k).rem_euclid(2) == 0 {
            1.0
        } else {
            -1.0
        };
        sum += sign * (ln_norm - ln_den).exp() * c.powi(cos_pow) * s.powi(sin_pow);
    }
    sum
}

/// Wigner D-matrix element D^n_{m'm}(α, β, γ)
pub fn wigner_d(n: usize, m_prime: i32, m: i32, alpha: f64, beta: f64, gamma: f64) -> Complex64 {
    let d = wigner_d_small(n, m_prime, m, beta);
    Complex64::from_polar(d, -(m_prime as f64) * alpha - (m as f64) * gamma)
}

/// Block-diagonal rotation matrix over all modes up to `lmax`, shape `[rmax, rmax]`
pub fn wigner_d_matrix(lmax: usize, rotation: &Quaternion) -> Array2<Complex64> {
    let (alpha, beta, gamma) = rotation.to_euler_zyz();
    let rmax = lmax_to_rmax(lmax);
    let mut d = Array2::<Complex64>::zeros((rmax, rmax));
    for n in 1..=lmax {
        let ni = n as i32;
        for m_prime in -ni..=ni {
            for m in -ni..=ni {
                d[(mode_index(n, m_prime), mode_index(n, m))] =
                    wigner_d(n, m_prime, m, alpha, beta, gamma);
            }
        }
    }
    d
}

/// Rotate expansion coefficients by a quaternion (both polarisations)
pub fn rotate_coefficients(p: &Coefficients, rotation: &Quaternion) -> Result<Coefficients> {
    let lmax = rmax_to_lmax(p.ncols())?;
    let d = wigner_d_matrix(lmax, rotation);
    let mut out = p.clone();
    for pol in 0..2 {
        out.row_mut(pol).assign(&d.dot(&p.row(pol)));
    }
    Ok(out)
}

/// Rotate a T-matrix of shape `[2 rmax, 2 rmax]`: T' = D T D†
pub fn rotate_tmatrix(tmatrix: &Array2<Complex64>, rotation: &Quaternion) -> Result<Array2<Complex64>> {
    let (rows, cols) = tmatrix.dim();
    if rows != cols || rows % 2 != 0 {
        return Err(VshError::DimensionMismatch(format!(
            "T-matrix of shape {}x{}",
            rows, cols
        )));
    }
    let rmax = rows / 2;
    let lmax = rmax_to_lmax(rmax)?;
    let d = wigner_d_matrix(lmax, rotation);

    let mut big = Array2::<Complex64>::zeros((rows, rows));
    for pol in 0..2 {
        let offset = pol * rmax;
        for i in 0..rmax {
            for j in 0..rmax {
                big[(offset + i, offset + j)] = d[(i, j)];
            }
        }
    }
    let big_adjoint = big.t().mapv(|c| c.conj());
    Ok(big.dot(tmatrix).dot(&big_adjoint))
}

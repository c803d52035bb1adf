/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Vector spherical harmonics
//!
//! Multipole modes are enumerated by a single index r = n² + n + m - 1 over
//! n = 1..=lmax, m = -n..=n. Coefficient arrays have shape `[2, rmax]`: row
//! [`ELECTRIC`] multiplies N-type (electric) harmonics and row [`MAGNETIC`]
//! multiplies M-type (magnetic) harmonics.

pub mod bessel;
pub mod errors;
pub mod expansion;
pub mod legendre;
pub mod rotation;
pub mod translation;

pub use errors::{Result, VshError};
pub use expansion::{expand_e, expand_e_far, expand_h, expand_h_far, vsh_functions};

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Multipole coefficients, shape `[2, rmax]`
pub type Coefficients = Array2<Complex64>;

/// Row of the N-type (electric) coefficients
pub const ELECTRIC: usize = 0;
/// Row of the M-type (magnetic) coefficients
pub const MAGNETIC: usize = 1;

/// Radial behaviour of a VSH expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VshMode {
    /// Outgoing waves, spherical Hankel functions of the first kind
    Outgoing,
    /// Regular waves in the surrounding medium, spherical Bessel j_n
    Incident,
    /// Regular waves inside a particle, j_n with the particle wavenumber
    Interior,
    /// Incoming waves, spherical Hankel functions of the second kind
    Ingoing,
}

impl VshMode {
    /// True for the families that are finite at the origin
    pub fn is_regular(&self) -> bool {
        matches!(self, VshMode::Incident | VshMode::Interior)
    }
}

/// Number of modes for a maximum multipole order
pub fn lmax_to_rmax(lmax: usize) -> usize {
    lmax * (lmax + 2)
}

/// Maximum multipole order for a number of modes
pub fn rmax_to_lmax(rmax: usize) -> Result<usize> {
    let lmax = ((rmax as f64 + 1.0).sqrt() - 1.0).round() as usize;
    if lmax_to_rmax(lmax) != rmax {
        return Err(VshError::InvalidOrder(format!(
            "{} is not a valid number of multipole modes",
            rmax
        )));
    }
    Ok(lmax)
}

/// Mode index of (n, m)
pub fn mode_index(n: usize, m: i32) -> usize {
    ((n * n + n) as i64 - 1 + m as i64) as usize
}

/// All modes up to `lmax` as (r, n, m) in index order
pub fn mode_indices(lmax: usize) -> Vec<(usize, usize, i32)> {
    let mut modes = Vec::with_capacity(lmax_to_rmax(lmax));
    for n in 1..=lmax {
        let ni = n as i32;
        for m in -ni..=ni {
            modes.push((modes.len(), n, m));
        }
    }
    modes
}

/// Zero-filled coefficient array for `lmax`
pub fn zero_coefficients(lmax: usize) -> Coefficients {
    Coefficients::zeros((2, lmax_to_rmax(lmax)))
}

/// Normalisation γ_n = 1/√(n(n+1))
pub fn gamma_n(n: usize) -> f64 {
    1.0 / ((n * (n + 1)) as f64).sqrt()
}

/// Flatten `[2, rmax]` coefficients to a vector indexed `pol * rmax + r`
pub fn flatten(p: &Coefficients) -> Array1<Complex64> {
    Array1::from_iter(p.iter().cloned())
}

/// Inverse of [`flatten`]
pub fn unflatten(v: &Array1<Complex64>) -> Result<Coefficients> {
    let rmax = v.len() / 2;
    Coefficients::from_shape_vec((2, rmax), v.to_vec())
        .map_err(|e| VshError::DimensionMismatch(e.to_string()))
}

/// Exchange the electric and magnetic rows
pub fn swap_polarizations(p: &Coefficients) -> Coefficients {
    let mut swapped = p.clone();
    swapped.row_mut(ELECTRIC).assign(&p.row(MAGNETIC));
    swapped.row_mut(MAGNETIC).assign(&p.row(ELECTRIC));
    swapped
}

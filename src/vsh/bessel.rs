/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Spherical Bessel and Hankel functions of complex argument
//!
//! All orders 0..=nmax are returned at once. j_n is computed by downward
//! (Miller) recurrence and normalised against j_0 or j_1; y_n by upward
//! recurrence.

use super::errors::{Result, VshError};
use super::VshMode;
use num_complex::Complex64;

/// Rescale the downward recurrence once values exceed this magnitude
const RESCALE_THRESHOLD: f64 = 1e250;

fn zero() -> Complex64 {
    Complex64::new(0.0, 0.0)
}

/// Spherical Bessel functions of the first kind j_0(z)..j_nmax(z)
///
/// # Arguments
///
/// * `nmax` - Highest order required
/// * `z` - Complex argument
///
/// # Returns
///
/// A vector of length nmax + 1
pub fn spherical_jn(nmax: usize, z: Complex64) -> Result<Vec<Complex64>> {
    if !z.re.is_finite() || !z.im.is_finite() {
        return Err(VshError::SpecialFunction(format!(
            "non-finite argument {} for j_n",
            z
        )));
    }

    let mut out = vec![zero(); nmax + 1];
    if z.norm() == 0.0 {
        out[0] = Complex64::new(1.0, 0.0);
        return Ok(out);
    }

    let j0 = z.sin() / z;
    if nmax == 0 {
        out[0] = j0;
        return Ok(out);
    }
    let j1 = z.sin() / (z * z) - z.cos() / z;

    let az = z.norm();
    let start = nmax.max(az.ceil() as usize) + 16 + (4.0 * az.cbrt()).ceil() as usize;

    let mut values = vec![zero(); start + 2];
    values[start] = Complex64::new(1e-30, 0.0);
    for n in (1..=start).rev() {
        let next = Complex64::new((2 * n + 1) as f64, 0.0) / z * values[n] - values[n + 1];
        values[n - 1] = next;
        if next.norm() > RESCALE_THRESHOLD {
            for v in values[(n - 1)..].iter_mut() {
                *v /= RESCALE_THRESHOLD;
            }
        }
    }

    let scale = if j0.norm() >= j1.norm() {
        j0 / values[0]
    } else {
        j1 / values[1]
    };

    for (slot, value) in out.iter_mut().zip(values.iter()) {
        *slot = value * scale;
    }
    Ok(out)
}

/// Spherical Bessel functions of the second kind y_0(z)..y_nmax(z)
pub fn spherical_yn(nmax: usize, z: Complex64) -> Result<Vec<Complex64>> {
    if z.norm() == 0.0 {
        return Err(VshError::Singular(
            "y_n is singular at the origin".to_string(),
        ));
    }

    let mut out = vec![zero(); nmax + 1];
    out[0] = -z.cos() / z;
    if nmax >= 1 {
        out[1] = -z.cos() / (z * z) - z.sin() / z;
    }
    for n in 1..nmax {
        out[n + 1] = Complex64::new((2 * n + 1) as f64, 0.0) / z * out[n] - out[n - 1];
    }
    Ok(out)
}

/// Spherical Hankel functions of the first kind h_n(z) = j_n + i y_n
pub fn spherical_hankel1(nmax: usize, z: Complex64) -> Result<Vec<Complex64>> {
    let j = spherical_jn(nmax, z)?;
    let y = spherical_yn(nmax, z)?;
    Ok(j.iter()
        .zip(y.iter())
        .map(|(jn, yn)| jn + Complex64::i() * yn)
        .collect())
}

/// Spherical Hankel functions of the second kind h_n(z) = j_n - i y_n
pub fn spherical_hankel2(nmax: usize, z: Complex64) -> Result<Vec<Complex64>> {
    let j = spherical_jn(nmax, z)?;
    let y = spherical_yn(nmax, z)?;
    Ok(j.iter()
        .zip(y.iter())
        .map(|(jn, yn)| jn - Complex64::i() * yn)
        .collect())
}

/// Radial function values and Riccati derivatives for one argument
#[derive(Debug, Clone)]
pub struct RadialFunctions {
    /// z_n(x) for n = 0..=nmax
    pub values: Vec<Complex64>,
    /// (1/x) d[x z_n(x)]/dx for n = 0..=nmax
    pub riccati: Vec<Complex64>,
    /// d z_n(x)/dx for n = 0..=nmax
    pub derivative: Vec<Complex64>,
}

impl RadialFunctions {
    /// Evaluate the radial function family selected by `mode` at `x`
    ///
    /// Regular families are finite at x = 0, where their limits are used.
    pub fn new(mode: VshMode, nmax: usize, x: Complex64) -> Result<Self> {
        if x.norm() == 0.0 {
            if mode.is_regular() {
                let mut values = vec![zero(); nmax + 1];
                let mut riccati = vec![zero(); nmax + 1];
                let mut derivative = vec![zero(); nmax + 1];
                values[0] = Complex64::new(1.0, 0.0);
                riccati[0] = Complex64::new(1.0, 0.0);
                if nmax >= 1 {
                    riccati[1] = Complex64::new(2.0 / 3.0, 0.0);
                    derivative[1] = Complex64::new(1.0 / 3.0, 0.0);
                }
                return Ok(Self {
                    values,
                    riccati,
                    derivative,
                });
            }
            return Err(VshError::Singular(format!(
                "{:?} radial functions at the origin",
                mode
            )));
        }

        let values = match mode {
            VshMode::Outgoing => spherical_hankel1(nmax + 1, x)?,
            VshMode::Ingoing => spherical_hankel2(nmax + 1, x)?,
            VshMode::Incident | VshMode::Interior => spherical_jn(nmax + 1, x)?,
        };

        let mut riccati = vec![zero(); nmax + 1];
        let mut derivative = vec![zero(); nmax + 1];
        riccati[0] = values[0] - values[1];
        derivative[0] = -values[1];
        for n in 1..=nmax {
            let nf = n as f64;
            riccati[n] = values[n - 1] - values[n] * nf / x;
            derivative[n] = values[n - 1] - values[n] * (nf + 1.0) / x;
        }

        let mut values = values;
        values.truncate(nmax + 1);
        Ok(Self {
            values,
            riccati,
            derivative,
        })
    }

    /// z_n(x)/x, finite at the origin for regular families
    pub fn over_argument(&self, n: usize, x: Complex64) -> Complex64 {
        if x.norm() == 0.0 {
            return if n == 1 {
                Complex64::new(1.0 / 3.0, 0.0)
            } else {
                zero()
            };
        }
        self.values[n] / x
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Mathematical utilities for multipole calculations
//!
//! Log-factorials, Wigner 3j symbols, Gaunt coefficients, Gauss–Legendre
//! quadrature and table interpolation.

use super::errors::{Result, UtilsError};
use once_cell::sync::Lazy;
use std::f64::consts::PI;

/// Largest argument held in the log-factorial table
const LN_FACTORIAL_TABLE_SIZE: usize = 512;

static LN_FACTORIAL_TABLE: Lazy<Vec<f64>> = Lazy::new(|| {
    let mut table = Vec::with_capacity(LN_FACTORIAL_TABLE_SIZE + 1);
    table.push(0.0);
    let mut acc = 0.0;
    for i in 1..=LN_FACTORIAL_TABLE_SIZE {
        acc += (i as f64).ln();
        table.push(acc);
    }
    table
});

/// Natural logarithm of n!
///
/// Values up to 512! come from a cached table; larger arguments fall back to
/// Stirling's series.
pub fn ln_factorial(n: u32) -> f64 {
    let n = n as usize;
    if n <= LN_FACTORIAL_TABLE_SIZE {
        return LN_FACTORIAL_TABLE[n];
    }
    let x = n as f64;
    x * x.ln() - x + 0.5 * (2.0 * PI * x).ln() + 1.0 / (12.0 * x) - 1.0 / (360.0 * x.powi(3))
}

/// Check the triangle inequality condition for angular momentum addition
fn triangle_condition(l1: i32, l2: i32, l3: i32) -> bool {
    l1 + l2 >= l3 && l1 + l3 >= l2 && l2 + l3 >= l1
}

/// Wigner 3j symbol
///
/// ```text
/// ( j1 j2 j3 )
/// ( m1 m2 m3 )
/// ```
///
/// Evaluated with the Racah formula in log-factorial form, so it stays
/// finite for the orders reached by translation coefficients.
///
/// # Returns
///
/// The value of the symbol, zero when a selection rule is violated
pub fn wigner_3j(j1: i32, j2: i32, j3: i32, m1: i32, m2: i32, m3: i32) -> f64 {
    if j1 < 0 || j2 < 0 || j3 < 0 {
        return 0.0;
    }
    if m1 + m2 + m3 != 0 || !triangle_condition(j1, j2, j3) {
        return 0.0;
    }
    if m1.abs() > j1 || m2.abs() > j2 || m3.abs() > j3 {
        return 0.0;
    }

    let lf = |k: i32| ln_factorial(k as u32);

    let ln_delta = lf(j1 + j2 - j3) + lf(j1 - j2 + j3) + lf(-j1 + j2 + j3) - lf(j1 + j2 + j3 + 1);
    let ln_norm = lf(j1 + m1) + lf(j1 - m1) + lf(j2 + m2) + lf(j2 - m2) + lf(j3 + m3) + lf(j3 - m3);
    let ln_prefactor = 0.5 * (ln_delta + ln_norm);

    let k_min = 0.max(j2 - j3 - m1).max(j1 - j3 + m2);
    let k_max = (j1 + j2 - j3).min(j1 - m1).min(j2 + m2);

    let mut sum = 0.0;
    for k in k_min..=k_max {
        let ln_den = lf(k)
            + lf(j1 + j2 - j3 - k)
            + lf(j1 - m1 - k)
            + lf(j2 + m2 - k)
            + lf(j3 - j2 + m1 + k)
            + lf(j3 - j1 - m2 + k);
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        sum += sign * (ln_prefactor - ln_den).exp();
    }

    let phase = if (j1 - j2 - m3).rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    };
    phase * sum
}

/// Gaunt coefficient: the integral of three spherical harmonics
///
/// ∫ Y_{l1 m1} Y_{l2 m2} Y_{l3 m3} dΩ over the unit sphere, with orthonormal
/// complex harmonics carrying the Condon–Shortley phase.
pub fn gaunt_coefficient(l1: i32, m1: i32, l2: i32, m2: i32, l3: i32, m3: i32) -> f64 {
    if m1 + m2 + m3 != 0 || (l1 + l2 + l3) % 2 != 0 {
        return 0.0;
    }
    let w0 = wigner_3j(l1, l2, l3, 0, 0, 0);
    if w0 == 0.0 {
        return 0.0;
    }
    let wm = wigner_3j(l1, l2, l3, m1, m2, m3);
    let norm = ((2 * l1 + 1) * (2 * l2 + 1) * (2 * l3 + 1)) as f64 / (4.0 * PI);
    norm.sqrt() * w0 * wm
}

/// Gauss–Legendre quadrature nodes and weights on [-1, 1]
///
/// Nodes are returned in ascending order.
///
/// # Arguments
///
/// * `n` - Number of quadrature points
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    if n == 0 {
        return (nodes, weights);
    }

    let half = n.div_ceil(2);
    for i in 0..half {
        // Chebyshev estimate refined by Newton iteration on P_n
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..100 {
            let (p, d) = legendre_with_derivative(n, x);
            dp = d;
            let dx = p / d;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let (_, d) = legendre_with_derivative(n, x);
        if d != 0.0 {
            dp = d;
        }
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[i] = -x;
        nodes[n - 1 - i] = x;
        weights[i] = w;
        weights[n - 1 - i] = w;
    }

    (nodes, weights)
}

/// Legendre polynomial P_n(x) and its derivative
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let nf = n as f64;
    let dp = nf * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

/// Gauss–Legendre nodes and weights mapped onto the interval [a, b]
pub fn gauss_legendre_interval(n: usize, a: f64, b: f64) -> (Vec<f64>, Vec<f64>) {
    let (x, w) = gauss_legendre(n);
    let half = 0.5 * (b - a);
    let mid = 0.5 * (b + a);
    let nodes = x.iter().map(|&xi| mid + half * xi).collect();
    let weights = w.iter().map(|&wi| half * wi).collect();
    (nodes, weights)
}

/// Linear interpolation between two points
pub fn linear_interpolate(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }

    let t = (x - x0) / (x1 - x0);
    y0 * (1.0 - t) + y1 * t
}

/// Linear interpolation on a tabulated function
///
/// # Arguments
///
/// * `x` - The x-coordinate at which to interpolate
/// * `x_values` - Array of x coordinates (must be sorted in ascending order)
/// * `y_values` - Array of corresponding y coordinates
///
/// # Returns
///
/// The interpolated y-value at x, or an error if x lies outside the table
pub fn interpolate_table(x: f64, x_values: &[f64], y_values: &[f64]) -> Result<f64> {
    if x_values.len() != y_values.len() {
        return Err(UtilsError::DimensionMismatch(format!(
            "{} abscissae but {} ordinates",
            x_values.len(),
            y_values.len()
        )));
    }

    let (first, last) = match (x_values.first(), x_values.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => {
            return Err(UtilsError::Generic(
                "Empty arrays provided for interpolation".to_string(),
            ))
        }
    };

    if x < first || x > last {
        return Err(UtilsError::OutOfRange {
            value: x,
            min: first,
            max: last,
        });
    }

    if x_values.len() == 1 {
        return Ok(y_values[0]);
    }

    // first index whose abscissa is >= x
    let idx = x_values.partition_point(|&v| v < x).max(1);

    Ok(linear_interpolate(
        x,
        x_values[idx - 1],
        y_values[idx - 1],
        x_values[idx],
        y_values[idx],
    ))
}

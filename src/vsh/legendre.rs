/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Normalised associated Legendre functions and the VSH angular functions
//!
//! P̃_n^m(cos θ) is normalised so that Y_nm = P̃_n^m e^{imφ} is orthonormal on
//! the unit sphere and carries the Condon–Shortley phase. The angular
//! functions are
//!
//! * π_nm = m P̃_n^m / sin θ
//! * τ_nm = dP̃_n^m / dθ
//!
//! Both are evaluated through P̃/sin θ, which stays finite at the poles.

use std::f64::consts::PI;

/// Angular functions for all 0 <= n <= lmax, 0 <= m <= n at one polar angle
#[derive(Debug, Clone)]
pub struct AngularFunctions {
    lmax: usize,
    p: Vec<Vec<f64>>,
    pi: Vec<Vec<f64>>,
    tau: Vec<Vec<f64>>,
}

impl AngularFunctions {
    /// Evaluate P̃, π and τ at polar angle `theta`
    pub fn new(lmax: usize, theta: f64) -> Self {
        let (s, x) = theta.sin_cos();
        let mut p = vec![Vec::new(); lmax + 1];
        let mut pi = vec![Vec::new(); lmax + 1];
        let mut tau = vec![Vec::new(); lmax + 1];
        for n in 0..=lmax {
            p[n] = vec![0.0; n + 1];
            pi[n] = vec![0.0; n + 1];
            tau[n] = vec![0.0; n + 1];
        }

        // m = 0
        let mut p0 = vec![0.0; lmax + 2];
        p0[0] = 1.0 / (4.0 * PI).sqrt();
        if lmax >= 1 {
            p0[1] = 3.0f64.sqrt() * x * p0[0];
        }
        for n in 2..=lmax {
            let (a, b) = recurrence_coefficients(n, 0);
            p0[n] = a * (x * p0[n - 1] - b * p0[n - 2]);
        }

        // m >= 1 through Q = P̃ / sin θ
        let mut q = vec![vec![0.0; lmax + 1]; lmax + 1];
        let mut q_mm = -(3.0 / (8.0 * PI)).sqrt();
        for m in 1..=lmax {
            if m > 1 {
                q_mm *= -((2 * m + 1) as f64 / (2 * m) as f64).sqrt() * s;
            }
            q[m][m] = q_mm;
            if m < lmax {
                q[m][m + 1] = ((2 * m + 3) as f64).sqrt() * x * q_mm;
            }
            for n in (m + 2)..=lmax {
                let (a, b) = recurrence_coefficients(n, m);
                q[m][n] = a * (x * q[m][n - 1] - b * q[m][n - 2]);
            }
        }

        for n in 0..=lmax {
            p[n][0] = p0[n];
            if n >= 1 {
                // dP̃_n^0/dθ = √(n(n+1)) P̃_n^1
                tau[n][0] = ((n * (n + 1)) as f64).sqrt() * s * q[1][n];
            }
            for m in 1..=n {
                let nf = n as f64;
                let mf = m as f64;
                let q_prev = if n > m { q[m][n - 1] } else { 0.0 };
                p[n][m] = s * q[m][n];
                pi[n][m] = mf * q[m][n];
                tau[n][m] = nf * x * q[m][n]
                    - ((2.0 * nf + 1.0) * (nf * nf - mf * mf) / (2.0 * nf - 1.0)).sqrt() * q_prev;
            }
        }

        Self { lmax, p, pi, tau }
    }

    /// Highest degree held
    pub fn lmax(&self) -> usize {
        self.lmax
    }

    /// P̃_n^m for any -n <= m <= n (zero outside that range)
    pub fn p(&self, n: usize, m: i32) -> f64 {
        match self.lookup(n, m) {
            Some((am, sign)) => sign * self.p[n][am],
            None => 0.0,
        }
    }

    /// π_nm for any -n <= m <= n
    pub fn pi(&self, n: usize, m: i32) -> f64 {
        match self.lookup(n, m) {
            Some((am, sign)) if m < 0 => -sign * self.pi[n][am],
            Some((am, sign)) => sign * self.pi[n][am],
            None => 0.0,
        }
    }

    /// τ_nm for any -n <= m <= n
    pub fn tau(&self, n: usize, m: i32) -> f64 {
        match self.lookup(n, m) {
            Some((am, sign)) => sign * self.tau[n][am],
            None => 0.0,
        }
    }

    /// Index of |m| and the (-1)^m factor applied for negative orders
    fn lookup(&self, n: usize, m: i32) -> Option<(usize, f64)> {
        let am = m.unsigned_abs() as usize;
        if n > self.lmax || am > n {
            return None;
        }
        let sign = if m < 0 && am % 2 == 1 { -1.0 } else { 1.0 };
        Some((am, sign))
    }
}

/// Coefficients of P̃_n^m = a (x P̃_{n-1}^m - b P̃_{n-2}^m)
fn recurrence_coefficients(n: usize, m: usize) -> (f64, f64) {
    let nf = n as f64;
    let mf = m as f64;
    let a = ((4.0 * nf * nf - 1.0) / (nf * nf - mf * mf)).sqrt();
    let n1 = nf - 1.0;
    let b = ((n1 * n1 - mf * mf) / (4.0 * n1 * n1 - 1.0)).sqrt();
    (a, b)
}

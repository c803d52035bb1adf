/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Linear solvers for the interaction system
//!
//! The aggregate system (I − W·T) p_inc = p_src is solved either directly by
//! LU decomposition or iteratively with BiCGSTAB or CGS.

use super::errors::{InteractionError, Result};
use crate::utils::linear_algebra::{
    faer_vector_to_ndarray, inner_product, mat_vec, ndarray_to_faer, ndarray_to_faer_vector,
    vector_norm, LuFactorization,
};
use crate::utils::UtilsError;
use faer::{col, Mat};
use log::{debug, warn};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Breakdown threshold for the scalar recurrences of the Krylov solvers
const BREAKDOWN: f64 = 1e-300;

/// Methods for solving the interaction equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    /// Direct LU decomposition
    #[serde(alias = "lu")]
    LuDecomposition,
    /// Biconjugate gradient stabilised
    #[default]
    Bicgstab,
    /// Conjugate gradient squared
    #[serde(alias = "cgs")]
    IterativeCgs,
}

/// Solver for the interaction equations
#[derive(Debug, Clone)]
pub struct InteractionSolver {
    /// Method to use for solving the equations
    method: SolverMethod,
    /// Relative residual at which iterative methods stop
    tolerance: f64,
    /// Maximum number of iterations for iterative methods
    max_iterations: usize,
}

impl Default for InteractionSolver {
    fn default() -> Self {
        Self::new(SolverMethod::default())
    }
}

impl InteractionSolver {
    /// Create a solver with the specified method
    pub fn new(method: SolverMethod) -> Self {
        Self {
            method,
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }

    /// Set the relative residual tolerance for iterative methods
    pub fn set_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum number of iterations for iterative methods
    pub fn set_max_iterations(&mut self, max_iterations: usize) -> &mut Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Selected method
    pub fn method(&self) -> SolverMethod {
        self.method
    }

    /// Solve A x = b
    ///
    /// # Arguments
    ///
    /// * `matrix` - Square system matrix A
    /// * `rhs` - Right-hand side b
    pub fn solve(&self, matrix: &Array2<Complex64>, rhs: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        let (rows, cols) = matrix.dim();
        if rows != cols || rows != rhs.len() {
            return Err(InteractionError::DimensionMismatch(format!(
                "{}x{} system with a right-hand side of length {}",
                rows,
                cols,
                rhs.len()
            )));
        }

        let a = ndarray_to_faer(matrix);
        let b = ndarray_to_faer_vector(rhs);
        let x = match self.method {
            SolverMethod::LuDecomposition => self.solve_lu(&a, &b)?,
            SolverMethod::Bicgstab => self.solve_bicgstab(&a, &b)?,
            SolverMethod::IterativeCgs => self.solve_cgs(&a, &b)?,
        };
        Ok(faer_vector_to_ndarray(&x))
    }

    fn solve_lu(&self, a: &Mat<Complex64>, b: &col::Col<Complex64>) -> Result<col::Col<Complex64>> {
        let lu = LuFactorization::new(a).map_err(|e| match e {
            UtilsError::Math(msg) => InteractionError::SingularMatrix(msg),
            other => InteractionError::LinearAlgebra(other),
        })?;
        Ok(lu.solve_vector(b)?)
    }

    fn solve_bicgstab(&self, a: &Mat<Complex64>, b: &col::Col<Complex64>) -> Result<col::Col<Complex64>> {
        let n = b.nrows();
        let b_norm = vector_norm(b);
        let mut x = col::Col::<Complex64>::zeros(n);
        if b_norm == 0.0 {
            return Ok(x);
        }
        let target = self.tolerance * b_norm;

        let mut r = b.clone();
        let r_hat = r.clone();
        let mut p = col::Col::<Complex64>::zeros(n);
        let mut v = col::Col::<Complex64>::zeros(n);
        let one = Complex64::new(1.0, 0.0);
        let (mut rho, mut alpha, mut omega) = (one, one, one);

        for iter in 0..self.max_iterations {
            let rho_new = inner_product(&r_hat, &r)?;
            if rho_new.norm() < BREAKDOWN {
                return Err(InteractionError::IterationFailed(
                    "BiCGSTAB breakdown (rho ≈ 0)".to_string(),
                ));
            }
            let beta = (rho_new / rho) * (alpha / omega);
            for i in 0..n {
                p[i] = r[i] + beta * (p[i] - omega * v[i]);
            }
            v = mat_vec(a, &p)?;
            let denominator = inner_product(&r_hat, &v)?;
            if denominator.norm() < BREAKDOWN {
                return Err(InteractionError::IterationFailed(
                    "BiCGSTAB breakdown (r̂·v ≈ 0)".to_string(),
                ));
            }
            alpha = rho_new / denominator;

            let mut s = r.clone();
            for i in 0..n {
                s[i] -= alpha * v[i];
            }
            if vector_norm(&s) < target {
                for i in 0..n {
                    x[i] += alpha * p[i];
                }
                debug!("BiCGSTAB converged after {} iterations", iter + 1);
                return Ok(x);
            }

            let t = mat_vec(a, &s)?;
            let tt = inner_product(&t, &t)?;
            if tt.norm() < BREAKDOWN {
                return Err(InteractionError::IterationFailed(
                    "BiCGSTAB breakdown (t ≈ 0)".to_string(),
                ));
            }
            omega = inner_product(&t, &s)? / tt;
            for i in 0..n {
                x[i] += alpha * p[i] + omega * s[i];
                r[i] = s[i] - omega * t[i];
            }

            let residual = vector_norm(&r);
            if residual < target {
                debug!("BiCGSTAB converged after {} iterations", iter + 1);
                return Ok(x);
            }
            rho = rho_new;
        }

        warn!(
            "BiCGSTAB reached {} iterations without converging",
            self.max_iterations
        );
        Err(InteractionError::ConvergenceError(format!(
            "BiCGSTAB residual {:.3e} after {} iterations",
            vector_norm(&r) / b_norm,
            self.max_iterations
        )))
    }

    fn solve_cgs(&self, a: &Mat<Complex64>, b: &col::Col<Complex64>) -> Result<col::Col<Complex64>> {
        let n = b.nrows();
        let b_norm = vector_norm(b);
        let mut x = col::Col::<Complex64>::zeros(n);
        if b_norm == 0.0 {
            return Ok(x);
        }
        let target = self.tolerance * b_norm;

        let mut r = b.clone();
        let r_hat = r.clone();
        let mut u = r.clone();
        let mut p = r.clone();
        let mut q = col::Col::<Complex64>::zeros(n);
        let mut rho_prev = Complex64::new(0.0, 0.0);

        for iter in 0..self.max_iterations {
            let rho = inner_product(&r_hat, &r)?;
            if rho.norm() < BREAKDOWN {
                return Err(InteractionError::IterationFailed(
                    "CGS breakdown (rho ≈ 0)".to_string(),
                ));
            }

            if iter > 0 {
                let beta = rho / rho_prev;
                for i in 0..n {
                    u[i] = r[i] + beta * q[i];
                    p[i] = u[i] + beta * (q[i] + beta * p[i]);
                }
            }

            let v = mat_vec(a, &p)?;
            let denominator = inner_product(&r_hat, &v)?;
            if denominator.norm() < BREAKDOWN {
                return Err(InteractionError::IterationFailed(
                    "CGS breakdown (r̂·v ≈ 0)".to_string(),
                ));
            }
            let alpha = rho / denominator;

            let mut u_hat = col::Col::<Complex64>::zeros(n);
            for i in 0..n {
                q[i] = u[i] - alpha * v[i];
                u_hat[i] = u[i] + q[i];
                x[i] += alpha * u_hat[i];
            }
            let au = mat_vec(a, &u_hat)?;
            for i in 0..n {
                r[i] -= alpha * au[i];
            }

            if vector_norm(&r) < target {
                debug!("CGS converged after {} iterations", iter + 1);
                return Ok(x);
            }
            rho_prev = rho;
        }

        warn!("CGS reached {} iterations without converging", self.max_iterations);
        Err(InteractionError::ConvergenceError(format!(
            "CGS residual {:.3e} after {} iterations",
            vector_norm(&r) / b_norm,
            self.max_iterations
        )))
    }
}

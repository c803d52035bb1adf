/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Linear algebra glue between ndarray and faer
//!
//! Coefficient vectors and interaction matrices are assembled as ndarray
//! arrays; the linear solvers work on faer matrices.

use super::errors::{Result, UtilsError};
use faer::{col, Mat};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rayon::prelude::*;

/// Convert from ndarray::Array2<Complex64> to faer::Mat<Complex64>
pub fn ndarray_to_faer(array: &Array2<Complex64>) -> Mat<Complex64> {
    let (rows, cols) = array.dim();
    Mat::<Complex64>::from_fn(rows, cols, |i, j| array[(i, j)])
}

/// Convert from ndarray::Array1<Complex64> to faer::col::Col<Complex64>
pub fn ndarray_to_faer_vector(array: &Array1<Complex64>) -> col::Col<Complex64> {
    let mut result = col::Col::<Complex64>::zeros(array.len());
    for (i, value) in array.iter().enumerate() {
        result[i] = *value;
    }
    result
}

/// Convert from faer::col::Col<Complex64> to ndarray::Array1<Complex64>
pub fn faer_vector_to_ndarray(vector: &col::Col<Complex64>) -> Array1<Complex64> {
    Array1::from_shape_fn(vector.nrows(), |i| vector[i])
}

/// Conjugate inner product ⟨a, b⟩ = Σ conj(a_i) b_i
pub fn inner_product(a: &col::Col<Complex64>, b: &col::Col<Complex64>) -> Result<Complex64> {
    if a.nrows() != b.nrows() {
        return Err(UtilsError::DimensionMismatch(format!(
            "inner product of vectors with lengths {} and {}",
            a.nrows(),
            b.nrows()
        )));
    }

    let mut result = Complex64::new(0.0, 0.0);
    for i in 0..a.nrows() {
        result += a[i].conj() * b[i];
    }
    Ok(result)
}

/// Euclidean norm of a complex vector
pub fn vector_norm(v: &col::Col<Complex64>) -> f64 {
    let mut sum_squares = 0.0;
    for i in 0..v.nrows() {
        sum_squares += v[i].norm_sqr();
    }
    sum_squares.sqrt()
}

/// Matrix-vector product y = A x
///
/// Rows are distributed over the rayon pool for large systems.
pub fn mat_vec(a: &Mat<Complex64>, x: &col::Col<Complex64>) -> Result<col::Col<Complex64>> {
    let (rows, cols) = (a.nrows(), a.ncols());
    if cols != x.nrows() {
        return Err(UtilsError::DimensionMismatch(format!(
            "matrix with {} columns applied to vector of length {}",
            cols,
            x.nrows()
        )));
    }

    let row_product = |i: usize| {
        let mut sum = Complex64::new(0.0, 0.0);
        for j in 0..cols {
            sum += a[(i, j)] * x[j];
        }
        sum
    };

    let values: Vec<Complex64> = if rows * cols > 40_000 {
        (0..rows).into_par_iter().map(row_product).collect()
    } else {
        (0..rows).map(row_product).collect()
    };

    let mut y = col::Col::<Complex64>::zeros(rows);
    for (i, value) in values.into_iter().enumerate() {
        y[i] = value;
    }
    Ok(y)
}

/// Pivots smaller than this are treated as exact zeros
const SINGULAR_PIVOT: f64 = 1e-300;

/// LU factorisation with partial pivoting, P A = L U
///
/// L (unit lower) and U share one matrix; `piv[k]` is the original row
/// moved to position k.
#[derive(Debug, Clone)]
pub struct LuFactorization {
    lu: Mat<Complex64>,
    piv: Vec<usize>,
}

impl LuFactorization {
    /// Factorise a square matrix
    ///
    /// # Errors
    ///
    /// Fails for non-square or numerically singular matrices.
    pub fn new(a: &Mat<Complex64>) -> Result<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(UtilsError::DimensionMismatch(format!(
                "LU factorisation of a {}x{} matrix",
                n,
                a.ncols()
            )));
        }

        let mut lu = a.clone();
        let mut piv: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let mut pivot_row = k;
            let mut pivot_val = lu[(k, k)].norm();
            for i in (k + 1)..n {
                let val = lu[(i, k)].norm();
                if val > pivot_val {
                    pivot_row = i;
                    pivot_val = val;
                }
            }

            if pivot_val < SINGULAR_PIVOT {
                return Err(UtilsError::Math(format!(
                    "matrix is singular at column {}",
                    k
                )));
            }

            if pivot_row != k {
                piv.swap(k, pivot_row);
                for j in 0..n {
                    let temp = lu[(k, j)];
                    lu[(k, j)] = lu[(pivot_row, j)];
                    lu[(pivot_row, j)] = temp;
                }
            }

            let pivot = lu[(k, k)];
            for i in (k + 1)..n {
                let factor = lu[(i, k)] / pivot;
                lu[(i, k)] = factor;
                for j in (k + 1)..n {
                    let update = factor * lu[(k, j)];
                    lu[(i, j)] -= update;
                }
            }
        }

        Ok(Self { lu, piv })
    }

    /// Size of the factorised system
    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    /// Solve A X = B for every column of B
    pub fn solve(&self, b: &Mat<Complex64>) -> Result<Mat<Complex64>> {
        let n = self.dim();
        if b.nrows() != n {
            return Err(UtilsError::DimensionMismatch(format!(
                "right-hand side with {} rows for a system of size {}",
                b.nrows(),
                n
            )));
        }
        let nrhs = b.ncols();
        let mut x = Mat::<Complex64>::from_fn(n, nrhs, |i, j| b[(self.piv[i], j)]);

        for j in 0..nrhs {
            for i in 0..n {
                let mut sum = x[(i, j)];
                for k in 0..i {
                    sum -= self.lu[(i, k)] * x[(k, j)];
                }
                x[(i, j)] = sum;
            }
            for i in (0..n).rev() {
                let mut sum = x[(i, j)];
                for k in (i + 1)..n {
                    sum -= self.lu[(i, k)] * x[(k, j)];
                }
                x[(i, j)] = sum / self.lu[(i, i)];
            }
        }
        Ok(x)
    }

    /// Solve A x = b for a single vector
    pub fn solve_vector(&self, b: &col::Col<Complex64>) -> Result<col::Col<Complex64>> {
        let rhs = Mat::<Complex64>::from_fn(b.nrows(), 1, |i, _| b[i]);
        let x = self.solve(&rhs)?;
        let mut out = col::Col::<Complex64>::zeros(x.nrows());
        for i in 0..x.nrows() {
            out[i] = x[(i, 0)];
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_lu_solve_with_pivoting() {
        // zero leading entry forces a row swap
        let a = array![
            [Complex64::new(0.0, 0.0), Complex64::new(2.0, 1.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(3.0, -1.0)],
            [Complex64::new(4.0, 0.0), Complex64::new(1.0, 0.0), Complex64::new(0.0, 2.0)]
        ];
        let x_true = array![
            Complex64::new(1.0, -1.0),
            Complex64::new(0.5, 0.0),
            Complex64::new(-2.0, 1.0)
        ];
        let b = a.dot(&x_true);

        let lu = LuFactorization::new(&ndarray_to_faer(&a)).unwrap();
        let x = faer_vector_to_ndarray(&lu.solve_vector(&ndarray_to_faer_vector(&b)).unwrap());
        for i in 0..3 {
            assert!((x[i] - x_true[i]).norm() < 1e-12);
        }
    }

    #[test]
    fn test_lu_singular() {
        let a = Mat::<Complex64>::zeros(2, 2);
        assert!(LuFactorization::new(&a).is_err());
    }

    #[test]
    fn test_round_trip_conversion() {
        let a = array![
            [Complex64::new(1.0, 2.0), Complex64::new(0.0, -1.0)],
            [Complex64::new(3.0, 0.0), Complex64::new(-2.0, 0.5)]
        ];
        let m = ndarray_to_faer(&a);
        assert_eq!((m.nrows(), m.ncols()), (2, 2));
        assert_eq!(m[(1, 0)], Complex64::new(3.0, 0.0));
        assert_eq!(m[(0, 1)], Complex64::new(0.0, -1.0));

        let v = array![Complex64::new(1.0, 1.0), Complex64::new(2.0, -1.0)];
        assert_eq!(v, faer_vector_to_ndarray(&ndarray_to_faer_vector(&v)));
    }

    #[test]
    fn test_inner_product_and_norm() {
        let a = ndarray_to_faer_vector(&array![Complex64::new(0.0, 1.0), Complex64::new(1.0, 0.0)]);
        let b = ndarray_to_faer_vector(&array![Complex64::new(0.0, 1.0), Complex64::new(2.0, 0.0)]);
        let ip = inner_product(&a, &b).unwrap();
        assert_relative_eq!(ip.re, 3.0, epsilon = 1e-14);
        assert_relative_eq!(ip.im, 0.0, epsilon = 1e-14);
        assert_relative_eq!(vector_norm(&b), 5.0f64.sqrt(), epsilon = 1e-14);

        let short = col::Col::<Complex64>::zeros(1);
        assert!(inner_product(&a, &short).is_err());
    }

    #[test]
    fn test_mat_vec() {
        let a = array![
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)],
            [Complex64::new(2.0, 0.0), Complex64::new(1.0, 0.0)]
        ];
        let x = array![Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)];
        let y = faer_vector_to_ndarray(
            &mat_vec(&ndarray_to_faer(&a), &ndarray_to_faer_vector(&x)).unwrap(),
        );
        assert_eq!(y[0], Complex64::new(1.0, 1.0));
        assert_eq!(y[1], Complex64::new(3.0, 0.0));
    }
}

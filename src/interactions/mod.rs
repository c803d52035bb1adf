/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Particle interactions
//!
//! Couples the particles of a cluster through the translation addition
//! theorem and solves for the exciting coefficients of every particle.

pub mod errors;
pub mod matrix;
pub mod solver;

pub use errors::{InteractionError, Result};
pub use matrix::{cluster_coefficients, particle_aggregate_tmatrix, translation_block};
pub use solver::{InteractionSolver, SolverMethod};

use crate::geometry::Vector3D;
use crate::vsh::{flatten, unflatten, Coefficients};
use log::debug;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Scattered coefficients p_scat = T p_inc for one particle
pub fn apply_tmatrix(tmatrix: &Array2<Complex64>, p_inc: &Coefficients) -> Result<Coefficients> {
    if tmatrix.ncols() != p_inc.len() {
        return Err(InteractionError::DimensionMismatch(format!(
            "T-matrix of width {} applied to {} coefficients",
            tmatrix.ncols(),
            p_inc.len()
        )));
    }
    Ok(unflatten(&tmatrix.dot(&flatten(p_inc)))?)
}

/// Exciting coefficients of isolated particles: p_inc = p_src
pub fn solve_without_interactions(p_src: &[Coefficients]) -> Vec<Coefficients> {
    p_src.to_vec()
}

/// Exciting coefficients of coupled particles
///
/// Solves (I − W·T) p_inc = p_src for the stacked coefficients of all
/// particles.
pub fn solve_interactions(
    positions: &[Vector3D],
    tmatrices: &[Array2<Complex64>],
    p_src: &[Coefficients],
    k: f64,
    solver: &InteractionSolver,
) -> Result<Vec<Coefficients>> {
    if p_src.len() != positions.len() {
        return Err(InteractionError::DimensionMismatch(format!(
            "{} particles and {} source expansions",
            positions.len(),
            p_src.len()
        )));
    }
    let matrix = particle_aggregate_tmatrix(positions, tmatrices, k)?;
    let block = matrix.nrows() / positions.len();

    let mut rhs = Array1::<Complex64>::zeros(matrix.nrows());
    for (i, p) in p_src.iter().enumerate() {
        if p.len() != block {
            return Err(InteractionError::DimensionMismatch(format!(
                "source expansion {} has {} entries, expected {}",
                i,
                p.len(),
                block
            )));
        }
        rhs.slice_mut(ndarray::s![i * block..(i + 1) * block])
            .assign(&flatten(p));
    }

    debug!(
        "Solving {0}x{0} interaction system with {1:?}",
        matrix.nrows(),
        solver.method()
    );
    let solution = solver.solve(&matrix, &rhs)?;

    (0..positions.len())
        .map(|i| {
            let part = solution.slice(ndarray::s![i * block..(i + 1) * block]).to_owned();
            Ok(unflatten(&part)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vsh::{lmax_to_rmax, mode_index, zero_coefficients, ELECTRIC};

    #[test]
    fn test_single_particle_is_uncoupled() {
        let n = 2 * lmax_to_rmax(1);
        let t = Array2::from_diag_elem(n, Complex64::new(-0.2, 0.1));
        let mut p = zero_coefficients(1);
        p[(ELECTRIC, mode_index(1, 1))] = Complex64::new(1.0, 0.0);

        let coupled = solve_interactions(
            &[Vector3D::origin()],
            &[t.clone()],
            &[p.clone()],
            1.0,
            &InteractionSolver::default(),
        )
        .unwrap();
        let isolated = solve_without_interactions(&[p.clone()]);
        for (a, b) in coupled[0].iter().zip(isolated[0].iter()) {
            assert!((a - b).norm() < 1e-12);
        }

        let scattered = apply_tmatrix(&t, &p).unwrap();
        assert!((scattered[(ELECTRIC, mode_index(1, 1))] - Complex64::new(-0.2, 0.1)).norm() < 1e-14);
    }

    #[test]
    fn test_coupled_system_satisfies_self_consistency() {
        let lmax = 2;
        let n = 2 * lmax_to_rmax(lmax);
        let t = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                Complex64::new(-0.3, 0.2)
            } else {
                Complex64::new(0.0, 0.0)
            }
        });
        let positions = [Vector3D::origin(), Vector3D::new(3.0, 0.5, 0.0)];
        let mut p1 = zero_coefficients(lmax);
        p1[(ELECTRIC, mode_index(1, 0))] = Complex64::new(1.0, 0.0);
        let p2 = zero_coefficients(lmax);
        let k = 1.0;

        let p_inc = solve_interactions(
            &positions,
            &[t.clone(), t.clone()],
            &[p1.clone(), p2],
            k,
            &InteractionSolver::new(SolverMethod::LuDecomposition),
        )
        .unwrap();

        // p_inc,2 must equal the wave scattered by particle 1 re-expanded about 2
        let scattered = apply_tmatrix(&t, &p_inc[0]).unwrap();
        let translation = crate::vsh::translation::vsh_translation(
            lmax,
            lmax,
            &(positions[1] - positions[0]),
            k,
            crate::vsh::VshMode::Incident,
        )
        .unwrap();
        let expected = crate::vsh::translation::translate_coefficients(&scattered, &translation).unwrap();
        for (a, b) in p_inc[1].iter().zip(expected.iter()) {
            assert!((a - b).norm() < 1e-10);
        }
        assert!(p_inc[1].iter().any(|c| c.norm() > 1e-6));
    }
}

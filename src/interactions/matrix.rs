/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Interaction matrix of a particle aggregate
//!
//! The exciting field of particle i is the source plus the scattered waves
//! of every other particle re-expanded about i:
//!
//! p_inc,i = p_src,i + Σ_{j≠i} W_ij T_j p_inc,j
//!
//! so that (I − W·T) p_inc = p_src. Unknowns are ordered particle-major with
//! `2 rmax` entries per particle, indexed `pol * rmax + r`.

use super::errors::{InteractionError, Result};
use crate::geometry::Vector3D;
use crate::vsh::translation::{translate_coefficients, vsh_translation, TranslationCoefficients};
use crate::vsh::{lmax_to_rmax, rmax_to_lmax, zero_coefficients, Coefficients, VshMode};
use log::debug;
use ndarray::{s, Array2};
use num_complex::Complex64;
use rayon::prelude::*;

/// Translation block [[A, B], [B, A]] of shape `[2 rmax_out, 2 rmax_in]`
pub fn translation_block(translation: &TranslationCoefficients) -> Array2<Complex64> {
    let (rows, cols) = translation.a.dim();
    let mut block = Array2::<Complex64>::zeros((2 * rows, 2 * cols));
    block.slice_mut(s![..rows, ..cols]).assign(&translation.a);
    block.slice_mut(s![..rows, cols..]).assign(&translation.b);
    block.slice_mut(s![rows.., ..cols]).assign(&translation.b);
    block.slice_mut(s![rows.., cols..]).assign(&translation.a);
    block
}

/// Build the interaction matrix I − W·T
///
/// # Arguments
///
/// * `positions` - Particle centres (m)
/// * `tmatrices` - Lab-frame T-matrices, each `[2 rmax, 2 rmax]`
/// * `k` - Wavenumber of the medium (1/m)
///
/// # Returns
///
/// A square matrix of size `N · 2 rmax`
pub fn particle_aggregate_tmatrix(
    positions: &[Vector3D],
    tmatrices: &[Array2<Complex64>],
    k: f64,
) -> Result<Array2<Complex64>> {
    let count = positions.len();
    if tmatrices.len() != count || count == 0 {
        return Err(InteractionError::DimensionMismatch(format!(
            "{} positions and {} T-matrices",
            count,
            tmatrices.len()
        )));
    }
    let block_size = tmatrices[0].nrows();
    if tmatrices.iter().any(|t| t.dim() != (block_size, block_size)) {
        return Err(InteractionError::DimensionMismatch(
            "all T-matrices must share one shape".to_string(),
        ));
    }
    let lmax = rmax_to_lmax(block_size / 2)?;

    let pairs: Vec<(usize, usize)> = (0..count)
        .flat_map(|i| (0..count).filter(move |&j| j != i).map(move |j| (i, j)))
        .collect();
    debug!(
        "Building interaction matrix for {} particles ({} translation blocks)",
        count,
        pairs.len()
    );

    let blocks: Vec<(usize, usize, Array2<Complex64>)> = pairs
        .into_par_iter()
        .map(|(i, j)| -> Result<(usize, usize, Array2<Complex64>)> {
            let displacement = positions[i] - positions[j];
            let translation = vsh_translation(lmax, lmax, &displacement, k, VshMode::Incident)?;
            let w = translation_block(&translation);
            Ok((i, j, w.dot(&tmatrices[j])))
        })
        .collect::<Result<_>>()?;

    let size = count * block_size;
    let mut matrix = Array2::<Complex64>::eye(size);
    for (i, j, wt) in blocks {
        let rows = i * block_size..(i + 1) * block_size;
        let cols = j * block_size..(j + 1) * block_size;
        let mut view = matrix.slice_mut(s![rows, cols]);
        view -= &wt;
    }
    Ok(matrix)
}

/// Outgoing expansion of the whole cluster about `origin`
///
/// Each particle's scattered wave is translated outgoing → outgoing; the
/// result is valid outside the smallest sphere about `origin` that encloses
/// every particle.
pub fn cluster_coefficients(
    positions: &[Vector3D],
    p_scat: &[Coefficients],
    k: f64,
    origin: &Vector3D,
    lmax: usize,
) -> Result<Coefficients> {
    if positions.len() != p_scat.len() {
        return Err(InteractionError::DimensionMismatch(format!(
            "{} positions and {} coefficient sets",
            positions.len(),
            p_scat.len()
        )));
    }

    let parts: Vec<Coefficients> = positions
        .par_iter()
        .zip(p_scat.par_iter())
        .map(|(position, p)| -> Result<Coefficients> {
            let lmax_in = rmax_to_lmax(p.ncols())?;
            let displacement = *origin - *position;
            let translation = vsh_translation(lmax, lmax_in, &displacement, k, VshMode::Outgoing)?;
            Ok(translate_coefficients(p, &translation)?)
        })
        .collect::<Result<_>>()?;

    let mut total = zero_coefficients(lmax);
    for part in &parts {
        total += part;
    }
    debug_assert_eq!(total.ncols(), lmax_to_rmax(lmax));
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{cart_to_sph, vec_sph_to_cart};
    use crate::vsh::{expand_e, mode_index, ELECTRIC, MAGNETIC};

    fn diagonal_tmatrix(lmax: usize, value: Complex64) -> Array2<Complex64> {
        let n = 2 * lmax_to_rmax(lmax);
        Array2::from_diag_elem(n, value)
    }

    #[test]
    fn test_aggregate_shape_and_diagonal() {
        let positions = [Vector3D::origin(), Vector3D::new(2.0, 0.0, 0.0), Vector3D::new(0.0, 3.0, 1.0)];
        let t = diagonal_tmatrix(2, Complex64::new(-0.1, 0.05));
        let tmatrices = vec![t.clone(), t.clone(), t];
        let matrix = particle_aggregate_tmatrix(&positions, &tmatrices, 1.0).unwrap();
        assert_eq!(matrix.dim(), (48, 48));
        for i in 0..48 {
            assert_eq!(matrix[(i, i)], Complex64::new(1.0, 0.0));
        }
        assert!(matrix[(0, 16)].norm() > 0.0);

        let bad = particle_aggregate_tmatrix(&positions[..2], &tmatrices, 1.0);
        assert!(matches!(bad, Err(InteractionError::DimensionMismatch(_))));
    }

    #[test]
    fn test_cluster_expansion_reproduces_particle_fields() {
        let k = 1.0;
        let positions = [Vector3D::new(0.3, 0.0, 0.0), Vector3D::new(-0.2, 0.25, 0.1)];
        let mut p1 = zero_coefficients(1);
        p1[(ELECTRIC, mode_index(1, 0))] = Complex64::new(1.0, 0.0);
        let mut p2 = zero_coefficients(1);
        p2[(MAGNETIC, mode_index(1, 1))] = Complex64::new(0.0, 0.7);
        let p_scat = vec![p1, p2];

        let origin = Vector3D::origin();
        let cluster = cluster_coefficients(&positions, &p_scat, k, &origin, 14).unwrap();

        let point = Vector3D::new(2.0, -1.5, 1.0);
        let kc = Complex64::new(k, 0.0);
        let (r, theta, phi) = cart_to_sph(&point, &origin);
        let from_cluster = vec_sph_to_cart(
            &expand_e(&cluster, kc, VshMode::Outgoing, r, theta, phi).unwrap(),
            theta,
            phi,
        );

        let mut direct = [Complex64::new(0.0, 0.0); 3];
        for (position, p) in positions.iter().zip(&p_scat) {
            let (r, theta, phi) = cart_to_sph(&point, position);
            let e = vec_sph_to_cart(
                &expand_e(p, kc, VshMode::Outgoing, r, theta, phi).unwrap(),
                theta,
                phi,
            );
            for c in 0..3 {
                direct[c] += e[c];
            }
        }
        for c in 0..3 {
            assert!((from_cluster[c] - direct[c]).norm() < 1e-8);
        }
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Scattering, absorption and extinction cross sections
//!
//! For one particle with exciting coefficients p_inc, source coefficients
//! p_src and scattered coefficients p_scat in a medium with wavenumber k:
//!
//! * C_ext = −Re Σ p_src* p_scat / k²
//! * C_abs = −(Re Σ p_inc* p_scat + Σ |p_scat|²) / k²
//! * C_sca = C_ext − C_abs
//!
//! For the cluster expansion p_cl about the origin with source coefficients
//! p_0 there:
//!
//! * C_sca = Σ |p_cl|² / k²
//! * C_ext = −Re Σ p_0* p_cl / k²

use super::errors::{ClusterError, Result};
use super::Cluster;
use crate::vsh::{mode_indices, rmax_to_lmax, Coefficients};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Total cross sections (m²)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossSections {
    pub scattering: f64,
    pub absorption: f64,
    pub extinction: f64,
}

impl Add for CrossSections {
    type Output = CrossSections;

    fn add(self, other: CrossSections) -> CrossSections {
        CrossSections {
            scattering: self.scattering + other.scattering,
            absorption: self.absorption + other.absorption,
            extinction: self.extinction + other.extinction,
        }
    }
}

/// Cross sections resolved by polarization and degree
///
/// Arrays have shape `[2, lmax]`: row 0 electric, row 1 magnetic, column
/// n − 1 for multipole degree n.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionsPerMultipole {
    pub scattering: Array2<f64>,
    pub absorption: Array2<f64>,
    pub extinction: Array2<f64>,
}

impl CrossSectionsPerMultipole {
    /// Sum over all multipoles
    pub fn total(&self) -> CrossSections {
        CrossSections {
            scattering: self.scattering.sum(),
            absorption: self.absorption.sum(),
            extinction: self.extinction.sum(),
        }
    }

    /// Maximum degree resolved
    pub fn lmax(&self) -> usize {
        self.scattering.ncols()
    }
}

fn check_shapes(arrays: &[&Coefficients]) -> Result<usize> {
    let rmax = arrays[0].ncols();
    if arrays.iter().any(|p| p.dim() != (2, rmax)) {
        return Err(ClusterError::InvalidParameter(
            "coefficient arrays must share one shape".to_string(),
        ));
    }
    Ok(rmax_to_lmax(rmax)?)
}

/// Per-multipole cross sections of one particle
pub fn particle_cross_sections(
    p_scat: &Coefficients,
    p_inc: &Coefficients,
    p_src: &Coefficients,
    k: f64,
) -> Result<CrossSectionsPerMultipole> {
    let lmax = check_shapes(&[p_scat, p_inc, p_src])?;
    let k2 = k * k;
    let mut extinction = Array2::<f64>::zeros((2, lmax));
    let mut absorption = Array2::<f64>::zeros((2, lmax));

    for (r, n, _) in mode_indices(lmax) {
        for pol in 0..2 {
            let scat = p_scat[(pol, r)];
            extinction[(pol, n - 1)] -= (p_src[(pol, r)].conj() * scat).re / k2;
            absorption[(pol, n - 1)] -= ((p_inc[(pol, r)].conj() * scat).re + scat.norm_sqr()) / k2;
        }
    }

    Ok(CrossSectionsPerMultipole {
        scattering: &extinction - &absorption,
        absorption,
        extinction,
    })
}

/// Per-multipole cross sections of a cluster expansion about the origin
pub fn cluster_cross_sections(
    p_cluster: &Coefficients,
    p_src: &Coefficients,
    k: f64,
) -> Result<CrossSectionsPerMultipole> {
    let lmax = check_shapes(&[p_cluster, p_src])?;
    let k2 = k * k;
    let mut scattering = Array2::<f64>::zeros((2, lmax));
    let mut extinction = Array2::<f64>::zeros((2, lmax));

    for (r, n, _) in mode_indices(lmax) {
        for pol in 0..2 {
            let p = p_cluster[(pol, r)];
            scattering[(pol, n - 1)] += p.norm_sqr() / k2;
            extinction[(pol, n - 1)] -= (p_src[(pol, r)].conj() * p).re / k2;
        }
    }

    Ok(CrossSectionsPerMultipole {
        absorption: &extinction - &scattering,
        scattering,
        extinction,
    })
}

impl Cluster {
    /// Per-multipole cross sections of particle `i`
    pub fn cross_sections_per_multipole_of_particle(&self, i: usize) -> Result<CrossSectionsPerMultipole> {
        self.check_index(i)?;
        particle_cross_sections(&self.p_scat[i], &self.p_inc[i], &self.p_src[i], self.material_data.k_b)
    }

    /// Cross sections of particle `i`
    pub fn cross_sections_of_particle(&self, i: usize) -> Result<CrossSections> {
        Ok(self.cross_sections_per_multipole_of_particle(i)?.total())
    }

    /// Cross sections of the cluster, summed over particles
    pub fn cross_sections(&self) -> Result<CrossSections> {
        (0..self.len()).try_fold(CrossSections::default(), |total, i| {
            Ok(total + self.cross_sections_of_particle(i)?)
        })
    }

    /// Per-multipole cross sections of the cluster about its origin
    ///
    /// `lmax` defaults to the cluster's own order; higher orders are needed
    /// when the particles are spread over several wavelengths.
    pub fn cross_sections_per_multipole(&mut self, lmax: Option<usize>) -> Result<CrossSectionsPerMultipole> {
        let lmax = lmax.unwrap_or(self.lmax);
        let k = self.material_data.k_b;
        let p0 = self.source.structure(&self.origin, k, lmax)?;
        let p_cluster = self.solve_cluster_coefficients(Some(lmax))?;
        cluster_cross_sections(p_cluster, &p0, k)
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Optical materials
//!
//! Every material returns its relative permittivity and permeability at a
//! vacuum wavelength given in metres.

pub mod constant;
pub mod drude;
pub mod errors;
pub mod tabulated;

pub use constant::ConstantMaterial;
pub use drude::DrudeMaterial;
pub use errors::{MaterialError, Result};
pub use tabulated::TabulatedMaterial;

use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt::Debug;
use std::sync::Arc;

/// Frequency-dependent optical material
pub trait Material: Debug + Send + Sync {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Relative permittivity at a vacuum wavelength (m)
    fn eps(&self, wavelength: f64) -> Result<Complex64>;

    /// Relative permeability at a vacuum wavelength (m)
    fn mu(&self, _wavelength: f64) -> Result<Complex64> {
        Ok(Complex64::new(1.0, 0.0))
    }

    /// Complex refractive index √(εμ)
    fn index(&self, wavelength: f64) -> Result<Complex64> {
        Ok((self.eps(wavelength)? * self.mu(wavelength)?).sqrt())
    }
}

/// Material shared between particles
pub type SharedMaterial = Arc<dyn Material>;

/// Material properties of a cluster evaluated at one wavelength
#[derive(Debug, Clone)]
pub struct MaterialData {
    /// Vacuum wavelength (m)
    pub wavelength: f64,
    /// Permittivity of the medium
    pub eps_b: f64,
    /// Permeability of the medium
    pub mu_b: f64,
    /// Refractive index of the medium
    pub n_b: f64,
    /// Wavenumber in the medium (1/m)
    pub k_b: f64,
    /// Permittivity of each particle
    pub eps: Vec<Complex64>,
    /// Permeability of each particle
    pub mu: Vec<Complex64>,
    /// Refractive index of each particle
    pub n: Vec<Complex64>,
}

impl MaterialData {
    /// Evaluate the medium and particle materials at `wavelength`
    ///
    /// # Errors
    ///
    /// Fails when the medium absorbs or a material has no data at `wavelength`.
    pub fn evaluate(
        medium: &dyn Material,
        particles: &[SharedMaterial],
        wavelength: f64,
    ) -> Result<Self> {
        let eps_b = medium.eps(wavelength)?;
        let mu_b = medium.mu(wavelength)?;
        if eps_b.im.abs() > 1e-12 || mu_b.im.abs() > 1e-12 {
            return Err(MaterialError::AbsorbingMedium(format!(
                "{} has eps = {}, mu = {}",
                medium.name(),
                eps_b,
                mu_b
            )));
        }
        if eps_b.re <= 0.0 || mu_b.re <= 0.0 {
            return Err(MaterialError::InvalidParameter(format!(
                "medium {} must have positive eps and mu",
                medium.name()
            )));
        }

        let n_b = (eps_b.re * mu_b.re).sqrt();
        let k_b = 2.0 * PI * n_b / wavelength;

        let mut eps = Vec::with_capacity(particles.len());
        let mut mu = Vec::with_capacity(particles.len());
        let mut n = Vec::with_capacity(particles.len());
        for material in particles {
            let e = material.eps(wavelength)?;
            let m = material.mu(wavelength)?;
            eps.push(e);
            mu.push(m);
            n.push((e * m).sqrt());
        }

        Ok(Self {
            wavelength,
            eps_b: eps_b.re,
            mu_b: mu_b.re,
            n_b,
            k_b,
            eps,
            mu,
            n,
        })
    }
}

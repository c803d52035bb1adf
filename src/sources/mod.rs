/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Incident field sources
//!
//! A source provides its field everywhere in the medium and its regular VSH
//! expansion about any point. Magnetic fields are returned as Z0·H for a
//! medium with unit impedance; the cluster rescales them by √(ε_b/μ_b).

pub mod errors;
pub mod plane_wave;
pub mod point_dipole;

pub use errors::{Result, SourceError};
pub use plane_wave::PlaneWave;
pub use point_dipole::PointDipole;

use crate::geometry::{sph_to_cart, vec_cart_to_sph, ComplexVector3, Vector3D};
use crate::vsh::{zero_coefficients, Coefficients};
use num_complex::Complex64;
use std::fmt::Debug;
use std::ops::Add;
use std::sync::Arc;

/// Electromagnetic source illuminating a cluster
pub trait Source: Debug + Send + Sync {
    /// Regular expansion coefficients of the source about `position`
    ///
    /// # Arguments
    ///
    /// * `position` - Expansion centre (m)
    /// * `k` - Wavenumber in the medium (1/m)
    /// * `lmax` - Maximum multipole order
    fn structure(&self, position: &Vector3D, k: f64, lmax: usize) -> Result<Coefficients>;

    /// Cartesian electric field at `point`
    fn e_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3>;

    /// Cartesian Z0·H at `point` for a unit-impedance medium
    fn h_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3>;

    /// (E_θ, E_φ) on a sphere of `radius` about the coordinate origin
    fn e_angular(&self, theta: f64, phi: f64, k: f64, radius: f64) -> Result<[Complex64; 2]> {
        let point = sph_to_cart(radius, theta, phi, &Vector3D::origin());
        let e = vec_cart_to_sph(&self.e_field(&point, k)?, theta, phi);
        Ok([e[1], e[2]])
    }

    /// (Z0·H_θ, Z0·H_φ) on a sphere of `radius` about the coordinate origin
    fn h_angular(&self, theta: f64, phi: f64, k: f64, radius: f64) -> Result<[Complex64; 2]> {
        let point = sph_to_cart(radius, theta, phi, &Vector3D::origin());
        let h = vec_cart_to_sph(&self.h_field(&point, k)?, theta, phi);
        Ok([h[1], h[2]])
    }

    /// Angular spectrum (E_θ, E_φ) along (θ, φ), phase-referenced to the
    /// coordinate origin
    ///
    /// # Errors
    ///
    /// Sources without a far-field representation return
    /// [`SourceError::NotDefined`].
    fn angular_spectrum(&self, _theta: f64, _phi: f64, _k: f64) -> Result<[Complex64; 2]> {
        Err(SourceError::NotDefined("angular spectrum".to_string()))
    }

    /// Time-averaged power per unit area (W/m²) carried in a medium of
    /// relative permittivity `eps_b` and permeability `mu_b`
    fn power_density(&self, _eps_b: f64, _mu_b: f64) -> Result<f64> {
        Err(SourceError::NotDefined("power density".to_string()))
    }

    /// The source as a single point dipole, if it is one
    fn as_point_dipole(&self) -> Option<&PointDipole> {
        None
    }
}

/// Source shared between a cluster and its callers
pub type SharedSource = Arc<dyn Source>;

fn add_vectors(a: &mut ComplexVector3, b: ComplexVector3) {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
}

/// Superposition of sources
#[derive(Debug, Clone, Default)]
pub struct CombinedSource {
    sources: Vec<SharedSource>,
}

impl CombinedSource {
    /// Empty superposition
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source
    pub fn push<S: Source + 'static>(&mut self, source: S) {
        self.sources.push(Arc::new(source));
    }

    /// Add a shared source
    pub fn push_shared(&mut self, source: SharedSource) {
        self.sources.push(source);
    }

    /// Builder form of [`CombinedSource::push`]
    pub fn with<S: Source + 'static>(mut self, source: S) -> Self {
        self.push(source);
        self
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True without any source
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Member sources
    pub fn sources(&self) -> &[SharedSource] {
        &self.sources
    }
}

impl<T: Into<CombinedSource>> Add<T> for CombinedSource {
    type Output = CombinedSource;

    fn add(mut self, other: T) -> CombinedSource {
        self.sources.extend(other.into().sources);
        self
    }
}

/// `From` into a one-member [`CombinedSource`] and `+` with any other source
macro_rules! combinable_source {
    ($($source:ty),*) => {
        $(
            impl From<$source> for CombinedSource {
                fn from(source: $source) -> Self {
                    CombinedSource::new().with(source)
                }
            }

            impl<T: Into<CombinedSource>> Add<T> for $source {
                type Output = CombinedSource;

                fn add(self, other: T) -> CombinedSource {
                    CombinedSource::from(self) + other
                }
            }
        )*
    };
}

combinable_source!(PlaneWave, PointDipole);

impl Source for CombinedSource {
    fn structure(&self, position: &Vector3D, k: f64, lmax: usize) -> Result<Coefficients> {
        let mut total = zero_coefficients(lmax);
        for source in &self.sources {
            total += &source.structure(position, k, lmax)?;
        }
        Ok(total)
    }

    fn e_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3> {
        let mut total = [Complex64::new(0.0, 0.0); 3];
        for source in &self.sources {
            add_vectors(&mut total, source.e_field(point, k)?);
        }
        Ok(total)
    }

    fn h_field(&self, point: &Vector3D, k: f64) -> Result<ComplexVector3> {
        let mut total = [Complex64::new(0.0, 0.0); 3];
        for source in &self.sources {
            add_vectors(&mut total, source.h_field(point, k)?);
        }
        Ok(total)
    }

    fn e_angular(&self, theta: f64, phi: f64, k: f64, radius: f64) -> Result<[Complex64; 2]> {
        let mut total = [Complex64::new(0.0, 0.0); 2];
        for source in &self.sources {
            let e = source.e_angular(theta, phi, k, radius)?;
            total[0] += e[0];
            total[1] += e[1];
        }
        Ok(total)
    }

    fn h_angular(&self, theta: f64, phi: f64, k: f64, radius: f64) -> Result<[Complex64; 2]> {
        let mut total = [Complex64::new(0.0, 0.0); 2];
        for source in &self.sources {
            let h = source.h_angular(theta, phi, k, radius)?;
            total[0] += h[0];
            total[1] += h[1];
        }
        Ok(total)
    }

    fn angular_spectrum(&self, theta: f64, phi: f64, k: f64) -> Result<[Complex64; 2]> {
        let mut total = [Complex64::new(0.0, 0.0); 2];
        for source in &self.sources {
            let a = source.angular_spectrum(theta, phi, k)?;
            total[0] += a[0];
            total[1] += a[1];
        }
        Ok(total)
    }

    // interference terms leave the sum undefined unless there is one member
    fn power_density(&self, eps_b: f64, mu_b: f64) -> Result<f64> {
        match self.sources.as_slice() {
            [single] => single.power_density(eps_b, mu_b),
            _ => Err(SourceError::NotDefined(
                "power density of a superposition".to_string(),
            )),
        }
    }
}

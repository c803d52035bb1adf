/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Generalized multiparticle Mie theory for a cluster of particles
//!
//! A [`Cluster`] holds the particles, the source, and the solved expansion
//! coefficients at one wavelength:
//!
//! * `p_src`  - regular expansion of the source about each particle
//! * `p_inc`  - exciting field of each particle (source plus the other particles)
//! * `p_scat` - outgoing expansion of the field scattered by each particle
//! * `p_int`  - interior expansion (spheres only)
//!
//! Fields, cross sections, forces and the local density of states are
//! evaluated from these coefficients in the submodules.

pub mod errors;
pub mod fields;
pub mod flux;
pub mod forces;
pub mod ldos;

pub use errors::{ClusterError, Result};
pub use fields::FieldOptions;
pub use flux::{CrossSections, CrossSectionsPerMultipole};

use crate::geometry::{Quaternion, Vector3D};
use crate::interactions::{
    apply_tmatrix, cluster_coefficients, solve_interactions, solve_without_interactions,
    InteractionSolver,
};
use crate::materials::{ConstantMaterial, Material, MaterialData, SharedMaterial};
use crate::particles::{Particle, TmatrixKey};
use crate::sources::{SharedSource, Source};
use crate::vsh::{zero_coefficients, Coefficients};
use log::{debug, info};
use ndarray::{Array2, Zip};
use num_complex::Complex64;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Point about which cluster-wide expansions are taken
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Origin {
    /// The coordinate origin
    #[default]
    Zero,
    /// Centre of geometry of the particles, kept current on updates
    Auto,
    /// A fixed point (m)
    Point(Vector3D),
}

impl Origin {
    fn resolve(&self, positions: &[Vector3D]) -> Vector3D {
        match self {
            Origin::Zero => Vector3D::origin(),
            Origin::Auto => Vector3D::centroid(positions),
            Origin::Point(point) => *point,
        }
    }
}

/// Builder for [`Cluster`]
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    particles: Vec<Particle>,
    source: Option<SharedSource>,
    wavelength: Option<f64>,
    lmax: usize,
    medium: SharedMaterial,
    origin: Origin,
    interactions: bool,
    solver: InteractionSolver,
    interface: Option<SharedMaterial>,
    symmetry: Option<String>,
}

impl Default for ClusterBuilder {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            source: None,
            wavelength: None,
            lmax: 2,
            medium: Arc::new(ConstantMaterial::vacuum()),
            origin: Origin::Zero,
            interactions: true,
            solver: InteractionSolver::default(),
            interface: None,
            symmetry: None,
        }
    }
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one particle
    pub fn particle(mut self, particle: Particle) -> Self {
        self.particles.push(particle);
        self
    }

    /// Add several particles
    pub fn particles<I: IntoIterator<Item = Particle>>(mut self, particles: I) -> Self {
        self.particles.extend(particles);
        self
    }

    pub fn source<S: Source + 'static>(mut self, source: S) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn shared_source(mut self, source: SharedSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Vacuum wavelength (m)
    pub fn wavelength(mut self, wavelength: f64) -> Self {
        self.wavelength = Some(wavelength);
        self
    }

    /// Maximum multipole order of every expansion
    pub fn lmax(mut self, lmax: usize) -> Self {
        self.lmax = lmax;
        self
    }

    /// Embedding medium (vacuum by default)
    pub fn medium<M: Material + 'static>(mut self, medium: M) -> Self {
        self.medium = Arc::new(medium);
        self
    }

    pub fn shared_medium(mut self, medium: SharedMaterial) -> Self {
        self.medium = medium;
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Couple the particles (default) or treat them as isolated
    pub fn interactions(mut self, interactions: bool) -> Self {
        self.interactions = interactions;
        self
    }

    pub fn solver(mut self, solver: InteractionSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Planar substrate below the cluster; rejected by [`ClusterBuilder::build`]
    pub fn interface(mut self, material: SharedMaterial) -> Self {
        self.interface = Some(material);
        self
    }

    /// Symmetry reduction; rejected by [`ClusterBuilder::build`]
    pub fn symmetry(mut self, symmetry: &str) -> Self {
        self.symmetry = Some(symmetry.to_string());
        self
    }

    /// Compute the T-matrices and solve the cluster
    pub fn build(self) -> Result<Cluster> {
        if let Some(interface) = &self.interface {
            return Err(ClusterError::NotSupported(format!(
                "interface with {} is not supported by the cluster solver",
                interface.name()
            )));
        }
        if let Some(symmetry) = &self.symmetry {
            return Err(ClusterError::NotSupported(format!(
                "symmetry '{}' is not supported by the cluster solver",
                symmetry
            )));
        }
        if self.particles.is_empty() {
            return Err(ClusterError::InvalidParameter(
                "a cluster needs at least one particle".to_string(),
            ));
        }
        let source = self
            .source
            .ok_or_else(|| ClusterError::InvalidParameter("no source given".to_string()))?;
        let wavelength = self
            .wavelength
            .ok_or_else(|| ClusterError::InvalidParameter("no wavelength given".to_string()))?;
        if !(wavelength > 0.0 && wavelength.is_finite()) {
            return Err(ClusterError::InvalidParameter(format!(
                "wavelength must be positive, got {}",
                wavelength
            )));
        }
        if self.lmax == 0 {
            return Err(ClusterError::InvalidParameter(
                "lmax must be at least 1".to_string(),
            ));
        }

        let materials: Vec<SharedMaterial> =
            self.particles.iter().map(|p| p.material.clone()).collect();
        let material_data = MaterialData::evaluate(self.medium.as_ref(), &materials, wavelength)?;

        let mut cluster = Cluster {
            positions: self.particles.iter().map(|p| p.position).collect(),
            particles: self.particles,
            source,
            wavelength,
            lmax: self.lmax,
            medium: self.medium,
            origin_mode: self.origin,
            origin: Vector3D::origin(),
            interactions: self.interactions,
            solver: self.solver,
            material_data,
            tmatrix_fixed: Vec::new(),
            tmatrix: Vec::new(),
            interior_ratios: Vec::new(),
            p_src: Vec::new(),
            p_inc: Vec::new(),
            p_scat: Vec::new(),
            p_int: Vec::new(),
            p_cluster: None,
        };
        cluster.origin = cluster.origin_mode.resolve(&cluster.positions);
        cluster.compute_tmatrices()?;
        cluster.solve()?;
        Ok(cluster)
    }
}

/// A solved cluster of particles in a source field
#[derive(Clone)]
pub struct Cluster {
    particles: Vec<Particle>,
    positions: Vec<Vector3D>,
    source: SharedSource,
    wavelength: f64,
    lmax: usize,
    medium: SharedMaterial,
    origin_mode: Origin,
    origin: Vector3D,
    interactions: bool,
    solver: InteractionSolver,
    material_data: MaterialData,
    tmatrix_fixed: Vec<Arc<Array2<Complex64>>>,
    tmatrix: Vec<Array2<Complex64>>,
    interior_ratios: Vec<Option<Arc<Coefficients>>>,
    p_src: Vec<Coefficients>,
    p_inc: Vec<Coefficients>,
    p_scat: Vec<Coefficients>,
    p_int: Vec<Coefficients>,
    p_cluster: Option<Coefficients>,
}

impl fmt::Debug for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("particles", &self.particles.len())
            .field("source", &self.source)
            .field("wavelength", &self.wavelength)
            .field("medium", &self.medium.name())
            .field("lmax", &self.lmax)
            .field("origin", &self.origin)
            .finish()
    }
}

impl Cluster {
    pub fn builder() -> ClusterBuilder {
        ClusterBuilder::new()
    }

    /// Body-frame T-matrices, shared between particles with equal keys
    fn compute_tmatrices(&mut self) -> Result<()> {
        let wavelength = self.wavelength;
        let (lmax, eps_b, mu_b) = (self.lmax, self.material_data.eps_b, self.material_data.mu_b);

        let keys = self
            .particles
            .iter()
            .map(|p| p.tmatrix_key(wavelength))
            .collect::<std::result::Result<Vec<TmatrixKey>, _>>()?;

        let mut first_of_key: HashMap<TmatrixKey, usize> = HashMap::new();
        for (i, key) in keys.iter().enumerate() {
            first_of_key.entry(key.clone()).or_insert(i);
        }
        let unique: Vec<(TmatrixKey, usize)> = first_of_key.into_iter().collect();
        debug!(
            "Computing {} distinct T-matrices for {} particles",
            unique.len(),
            self.particles.len()
        );

        type Entry = (Arc<Array2<Complex64>>, Option<Arc<Coefficients>>);
        let computed: HashMap<TmatrixKey, Entry> = unique
            .into_par_iter()
            .map(|(key, i)| -> Result<(TmatrixKey, Entry)> {
                let particle = &self.particles[i];
                let fixed = particle.compute_tmatrix_fixed(lmax, wavelength, eps_b, mu_b)?;
                let ratios = particle.interior_ratios(lmax, wavelength, eps_b, mu_b)?;
                Ok((key, (Arc::new(fixed), ratios.map(Arc::new))))
            })
            .collect::<Result<_>>()?;

        self.tmatrix_fixed.clear();
        self.interior_ratios.clear();
        for key in &keys {
            let (fixed, ratios) = &computed[key];
            self.tmatrix_fixed.push(fixed.clone());
            self.interior_ratios.push(ratios.clone());
        }
        self.rotate_tmatrices()
    }

    fn rotate_tmatrices(&mut self) -> Result<()> {
        self.tmatrix = self
            .particles
            .par_iter()
            .zip(self.tmatrix_fixed.par_iter())
            .map(|(particle, fixed)| -> Result<Array2<Complex64>> {
                Ok(particle.rotate_tmatrix(fixed)?)
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    /// Solve for the source, exciting, scattered and interior coefficients
    pub fn solve(&mut self) -> Result<()> {
        self.solve_source_decomposition()?;
        self.solve_coupling()
    }

    fn solve_source_decomposition(&mut self) -> Result<()> {
        let k = self.material_data.k_b;
        let lmax = self.lmax;
        let source = &self.source;
        self.p_src = self
            .positions
            .par_iter()
            .map(|position| -> Result<Coefficients> { Ok(source.structure(position, k, lmax)?) })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn solve_coupling(&mut self) -> Result<()> {
        self.p_inc = if self.interactions {
            solve_interactions(
                &self.positions,
                &self.tmatrix,
                &self.p_src,
                self.material_data.k_b,
                &self.solver,
            )?
        } else {
            solve_without_interactions(&self.p_src)
        };

        self.p_scat = self
            .tmatrix
            .iter()
            .zip(&self.p_inc)
            .map(|(t, p)| -> Result<Coefficients> { Ok(apply_tmatrix(t, p)?) })
            .collect::<Result<_>>()?;

        self.p_int = self
            .interior_ratios
            .iter()
            .zip(&self.p_inc)
            .map(|(ratios, p)| match ratios {
                Some(ratios) => {
                    let mut interior = p.clone();
                    Zip::from(&mut interior)
                        .and(&**ratios)
                        .for_each(|c, ratio| *c *= *ratio);
                    interior
                }
                None => zero_coefficients(self.lmax),
            })
            .collect();

        info!(
            "Solved cluster of {} particles at {:.2} nm (interactions: {})",
            self.particles.len(),
            self.wavelength * 1e9,
            self.interactions
        );
        Ok(())
    }

    /// Move and/or rotate the particles and solve again
    ///
    /// Orientation-only updates reuse the source decomposition.
    pub fn update(
        &mut self,
        positions: Option<&[Vector3D]>,
        orientations: Option<&[Quaternion]>,
    ) -> Result<()> {
        let count = self.particles.len();
        if let Some(positions) = positions {
            if positions.len() != count {
                return Err(ClusterError::InvalidParameter(format!(
                    "{} positions given for {} particles",
                    positions.len(),
                    count
                )));
            }
        }
        if let Some(orientations) = orientations {
            if orientations.len() != count {
                return Err(ClusterError::InvalidParameter(format!(
                    "{} orientations given for {} particles",
                    orientations.len(),
                    count
                )));
            }
        }

        if let Some(positions) = positions {
            for (particle, position) in self.particles.iter_mut().zip(positions) {
                particle.position = *position;
            }
            self.positions = positions.to_vec();
            if self.origin_mode == Origin::Auto {
                self.origin = self.origin_mode.resolve(&self.positions);
            }
        }
        if let Some(orientations) = orientations {
            for (particle, orientation) in self.particles.iter_mut().zip(orientations) {
                particle.orientation = *orientation;
            }
            self.rotate_tmatrices()?;
        }
        self.p_cluster = None;

        if positions.is_some() || orientations.is_none() {
            self.solve()
        } else {
            self.solve_coupling()
        }
    }

    /// Outgoing expansion of the whole cluster about its origin
    ///
    /// The result is stored and available from [`Cluster::p_cluster`].
    pub fn solve_cluster_coefficients(&mut self, lmax: Option<usize>) -> Result<&Coefficients> {
        let lmax = lmax.unwrap_or(self.lmax);
        let p = cluster_coefficients(
            &self.positions,
            &self.p_scat,
            self.material_data.k_b,
            &self.origin,
            lmax,
        )?;
        let stored = self.p_cluster.insert(p);
        Ok(&*stored)
    }

    fn check_index(&self, i: usize) -> Result<()> {
        if i >= self.particles.len() {
            return Err(ClusterError::IndexOutOfRange {
                index: i,
                count: self.particles.len(),
            });
        }
        Ok(())
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn positions(&self) -> &[Vector3D] {
        &self.positions
    }

    pub fn source(&self) -> &SharedSource {
        &self.source
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    pub fn medium(&self) -> &SharedMaterial {
        &self.medium
    }

    pub fn origin(&self) -> Vector3D {
        self.origin
    }

    pub fn interactions(&self) -> bool {
        self.interactions
    }

    pub fn material_data(&self) -> &MaterialData {
        &self.material_data
    }

    /// Lab-frame T-matrices
    pub fn tmatrices(&self) -> &[Array2<Complex64>] {
        &self.tmatrix
    }

    pub fn p_src(&self) -> &[Coefficients] {
        &self.p_src
    }

    pub fn p_inc(&self) -> &[Coefficients] {
        &self.p_inc
    }

    pub fn p_scat(&self) -> &[Coefficients] {
        &self.p_scat
    }

    pub fn p_int(&self) -> &[Coefficients] {
        &self.p_int
    }

    /// Cluster expansion from the last [`Cluster::solve_cluster_coefficients`]
    pub fn p_cluster(&self) -> Option<&Coefficients> {
        self.p_cluster.as_ref()
    }

    /// Exciting coefficients of particle `i`, optionally without the source
    fn exciting(&self, i: usize, source: bool) -> Coefficients {
        if source {
            self.p_inc[i].clone()
        } else {
            &self.p_inc[i] - &self.p_src[i]
        }
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! JSON job files
//!
//! A job describes a cluster and a wavelength sweep. Lengths and wavelengths
//! in the file are in nanometres and angles in radians; [`JobConfig::prepare`]
//! converts everything to SI units and builds the materials, particles and
//! source the solver works with.

use super::errors::{InputError, Result};
use crate::cluster::{ClusterBuilder, Origin};
use crate::geometry::{Quaternion, Vector3D};
use crate::interactions::{InteractionSolver, SolverMethod};
use crate::materials::{
    ConstantMaterial, DrudeMaterial, SharedMaterial, TabulatedMaterial,
};
use crate::particles::{Particle, Shape};
use crate::sources::{PlaneWave, PointDipole, SharedSource};
use crate::utils::constants::NM;
use log::{debug, info};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn default_lmax() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> usize {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

/// Wavelength sweep in nanometres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WavelengthSpec {
    /// `points` evenly spaced wavelengths between the two ends, inclusive
    Range { range: [f64; 2], points: usize },
    /// An explicit list
    List { values: Vec<f64> },
}

impl WavelengthSpec {
    /// Wavelengths in nanometres
    pub fn values(&self) -> Vec<f64> {
        match self {
            WavelengthSpec::Range { range, points } => match *points {
                0 => Vec::new(),
                1 => vec![range[0]],
                n => {
                    let step = (range[1] - range[0]) / (n - 1) as f64;
                    (0..n).map(|i| range[0] + step * i as f64).collect()
                }
            },
            WavelengthSpec::List { values } => values.clone(),
        }
    }
}

/// Material description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialSpec {
    /// Dispersionless material given by `eps` (`[re, im]`) or a real `index`
    Constant {
        #[serde(default)]
        eps: Option<[f64; 2]>,
        #[serde(default)]
        index: Option<f64>,
        #[serde(default)]
        mu: Option<[f64; 2]>,
    },
    /// Drude metal with energies in eV
    Drude {
        #[serde(default = "default_one")]
        eps_inf: f64,
        wp_ev: f64,
        gamma_ev: f64,
    },
    /// Table read from `file` (`wavelength_nm n k` rows) or given inline as
    /// wavelengths (nm) and permittivities
    Tabulated {
        #[serde(default)]
        file: Option<PathBuf>,
        #[serde(default)]
        wavelengths: Vec<f64>,
        #[serde(default)]
        eps: Vec<[f64; 2]>,
    },
    Vacuum,
    Air,
    Gold,
    Silver,
}

impl MaterialSpec {
    /// Build the material, resolving relative table paths against `base_dir`
    pub fn build(&self, name: &str, base_dir: Option<&Path>) -> Result<SharedMaterial> {
        let material: SharedMaterial = match self {
            MaterialSpec::Constant { eps, index, mu } => {
                let mu = mu.map_or(Complex64::new(1.0, 0.0), |[re, im]| Complex64::new(re, im));
                let eps = match (eps, index) {
                    (Some([re, im]), None) => Complex64::new(*re, *im),
                    (None, Some(n)) => Complex64::new(n * n, 0.0) / mu,
                    _ => {
                        return Err(InputError::Invalid(format!(
                            "material '{}' needs exactly one of eps and index",
                            name
                        )))
                    }
                };
                Arc::new(ConstantMaterial::new(eps, mu).with_name(name))
            }
            MaterialSpec::Drude {
                eps_inf,
                wp_ev,
                gamma_ev,
            } => Arc::new(DrudeMaterial::from_ev(*eps_inf, *wp_ev, *gamma_ev)?.with_name(name)),
            MaterialSpec::Tabulated {
                file: Some(file),
                ..
            } => {
                let path = match base_dir {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file.clone(),
                };
                debug!("Reading material table {}", path.display());
                Arc::new(TabulatedMaterial::from_file(name, path)?)
            }
            MaterialSpec::Tabulated {
                file: None,
                wavelengths,
                eps,
            } => Arc::new(TabulatedMaterial::new(
                name,
                wavelengths.iter().map(|w| w * NM).collect(),
                eps.iter().map(|[re, im]| Complex64::new(*re, *im)).collect(),
            )?),
            MaterialSpec::Vacuum => Arc::new(ConstantMaterial::vacuum()),
            MaterialSpec::Air => Arc::new(ConstantMaterial::air()),
            MaterialSpec::Gold => Arc::new(DrudeMaterial::gold()),
            MaterialSpec::Silver => Arc::new(DrudeMaterial::silver()),
        };
        Ok(material)
    }
}

/// Orientation as spherical angles of the body z axis or as a quaternion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrientationSpec {
    Spherical { theta: f64, phi: f64 },
    Quaternion { quaternion: [f64; 4] },
}

impl OrientationSpec {
    pub fn to_quaternion(&self) -> Result<Quaternion> {
        match self {
            OrientationSpec::Spherical { theta, phi } => Ok(Quaternion::from_spherical_coords(*theta, *phi)),
            OrientationSpec::Quaternion { quaternion } => Ok(Quaternion::from_components(*quaternion)?),
        }
    }
}

/// One particle of the job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpec {
    /// Geometry with lengths in nm
    pub shape: Shape,
    /// Centre in nm
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub orientation: Option<OrientationSpec>,
    /// Key into the job's `materials`
    pub material: String,
}

/// Plane-wave polarization by name or as a (TM, TE) Jones vector of
/// `[re, im]` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolarizationSpec {
    Named(String),
    Jones([[f64; 2]; 2]),
}

impl Default for PolarizationSpec {
    fn default() -> Self {
        PolarizationSpec::Named("x".to_string())
    }
}

impl PolarizationSpec {
    pub fn jones(&self) -> Result<[Complex64; 2]> {
        match self {
            PolarizationSpec::Named(name) => match name.to_lowercase().as_str() {
                "x" | "tm" => Ok(PlaneWave::x_polarized().polarization),
                "y" | "te" => Ok(PlaneWave::y_polarized().polarization),
                "rhc" => Ok(PlaneWave::rhc().polarization),
                "lhc" => Ok(PlaneWave::lhc().polarization),
                other => Err(InputError::Invalid(format!("unknown polarization '{}'", other))),
            },
            PolarizationSpec::Jones([[a_re, a_im], [b_re, b_im]]) => {
                Ok([Complex64::new(*a_re, *a_im), Complex64::new(*b_re, *b_im)])
            }
        }
    }
}

/// Incident field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    PlaneWave {
        #[serde(default)]
        polarization: PolarizationSpec,
        #[serde(default)]
        theta: f64,
        #[serde(default)]
        phi: f64,
        #[serde(default = "default_one")]
        amplitude: f64,
        #[serde(default)]
        phase: f64,
        /// Phase reference point in nm
        #[serde(default)]
        origin: [f64; 3],
    },
    PointDipole {
        /// Position in nm
        position: [f64; 3],
        direction: [f64; 3],
        #[serde(default = "default_one")]
        amplitude: f64,
    },
}

impl SourceSpec {
    pub fn build(&self) -> Result<SharedSource> {
        let source: SharedSource = match self {
            SourceSpec::PlaneWave {
                polarization,
                theta,
                phi,
                amplitude,
                phase,
                origin,
            } => Arc::new(
                PlaneWave::new(polarization.jones()?, *theta, *phi)?
                    .with_amplitude(*amplitude)
                    .with_phase(*phase)
                    .with_origin(Vector3D::from(*origin) * NM),
            ),
            SourceSpec::PointDipole {
                position,
                direction,
                amplitude,
            } => Arc::new(
                PointDipole::linear(Vector3D::from(*position) * NM, Vector3D::from(*direction))?
                    .with_amplitude(*amplitude),
            ),
        };
        Ok(source)
    }
}

/// Solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSpec {
    #[serde(default)]
    pub method: SolverMethod,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for SolverSpec {
    fn default() -> Self {
        Self {
            method: SolverMethod::default(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl SolverSpec {
    pub fn build(&self) -> InteractionSolver {
        let mut solver = InteractionSolver::new(self.method);
        solver
            .set_tolerance(self.tolerance)
            .set_max_iterations(self.max_iterations);
        solver
    }
}

/// `"zero"`, `"auto"` or a point in nm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginSpec {
    Named(String),
    Point([f64; 3]),
}

impl Default for OriginSpec {
    fn default() -> Self {
        OriginSpec::Named("zero".to_string())
    }
}

impl OriginSpec {
    pub fn to_origin(&self) -> Result<Origin> {
        match self {
            OriginSpec::Named(name) => match name.as_str() {
                "zero" => Ok(Origin::Zero),
                "auto" => Ok(Origin::Auto),
                other => Err(InputError::Invalid(format!("unknown origin '{}'", other))),
            },
            OriginSpec::Point(point) => Ok(Origin::Point(Vector3D::from(*point) * NM)),
        }
    }
}

/// Where and how spectra are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_true")]
    pub csv: bool,
    #[serde(default)]
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            csv: true,
            json: false,
        }
    }
}

/// Top-level job file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub title: Option<String>,
    pub wavelengths: WavelengthSpec,
    #[serde(default = "default_lmax")]
    pub lmax: usize,
    /// Surrounding medium, vacuum when absent
    #[serde(default)]
    pub medium: Option<MaterialSpec>,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialSpec>,
    pub particles: Vec<ParticleSpec>,
    pub source: SourceSpec,
    #[serde(default = "default_true")]
    pub interactions: bool,
    #[serde(default)]
    pub solver: SolverSpec,
    #[serde(default)]
    pub origin: OriginSpec,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<MaterialSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symmetry: Option<String>,
    /// Directory the job was read from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Read, parse and validate a job file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<JobConfig> {
    let path = path.as_ref();
    debug!("Loading job file {}", path.display());
    let content = fs::read_to_string(path)?;
    let mut config: JobConfig = serde_json::from_str(&content)?;
    config.base_dir = path.parent().map(Path::to_path_buf);
    config.validate()?;
    info!(
        "Loaded job with {} particles and {} wavelengths",
        config.particles.len(),
        config.wavelengths.values().len()
    );
    Ok(config)
}

impl JobConfig {
    /// Parse a job from a JSON string without validating it
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the job for errors that do not need material data
    pub fn validate(&self) -> Result<()> {
        if self.interface.is_some() {
            return Err(InputError::Unsupported("planar interfaces".to_string()));
        }
        if let Some(symmetry) = &self.symmetry {
            return Err(InputError::Unsupported(format!("symmetry '{}'", symmetry)));
        }

        let wavelengths = self.wavelengths.values();
        if wavelengths.is_empty() {
            return Err(InputError::Invalid("no wavelengths".to_string()));
        }
        if let Some(bad) = wavelengths.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(InputError::Invalid(format!("wavelength {} nm must be positive", bad)));
        }
        if self.lmax == 0 {
            return Err(InputError::Invalid("lmax must be at least 1".to_string()));
        }
        if self.particles.is_empty() {
            return Err(InputError::Invalid("no particles".to_string()));
        }

        for (i, particle) in self.particles.iter().enumerate() {
            if !self.materials.contains_key(&particle.material) {
                return Err(InputError::UnknownMaterial(format!(
                    "'{}' used by particle {}",
                    particle.material, i
                )));
            }
            particle.shape.validate()?;
        }

        if let SourceSpec::PlaneWave { polarization, .. } = &self.source {
            polarization.jones()?;
        }
        self.origin.to_origin()?;
        if self.solver.tolerance.is_nan() || self.solver.tolerance <= 0.0 || self.solver.max_iterations == 0 {
            return Err(InputError::Invalid(
                "solver tolerance and max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert the job to SI units and build its materials, particles and source
    pub fn prepare(&self) -> Result<Job> {
        self.validate()?;
        let base_dir = self.base_dir.as_deref();

        let medium = match &self.medium {
            Some(spec) => spec.build("medium", base_dir)?,
            None => Arc::new(ConstantMaterial::vacuum()),
        };

        let mut materials: HashMap<&str, SharedMaterial> = HashMap::new();
        for (name, spec) in &self.materials {
            materials.insert(name.as_str(), spec.build(name, base_dir)?);
        }

        let particles = self
            .particles
            .iter()
            .map(|spec| -> Result<Particle> {
                let material = materials
                    .get(spec.material.as_str())
                    .cloned()
                    .ok_or_else(|| InputError::UnknownMaterial(spec.material.clone()))?;
                let particle = Particle::new(spec.shape.scaled(NM), Vector3D::from(spec.position) * NM, material)?;
                Ok(match &spec.orientation {
                    Some(orientation) => particle.with_orientation(orientation.to_quaternion()?),
                    None => particle,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Job {
            title: self.title.clone(),
            wavelengths: self.wavelengths.values().into_iter().map(|w| w * NM).collect(),
            lmax: self.lmax,
            medium,
            particles,
            source: self.source.build()?,
            origin: self.origin.to_origin()?,
            interactions: self.interactions,
            solver: self.solver.build(),
            output: self.output.clone(),
        })
    }
}

/// A job ready to run, in SI units
#[derive(Debug, Clone)]
pub struct Job {
    pub title: Option<String>,
    /// Vacuum wavelengths (m)
    pub wavelengths: Vec<f64>,
    pub lmax: usize,
    pub medium: SharedMaterial,
    pub particles: Vec<Particle>,
    pub source: SharedSource,
    pub origin: Origin,
    pub interactions: bool,
    pub solver: InteractionSolver,
    pub output: OutputConfig,
}

impl Job {
    /// Cluster builder for one wavelength of the sweep
    pub fn builder(&self, wavelength: f64) -> ClusterBuilder {
        ClusterBuilder::new()
            .particles(self.particles.iter().cloned())
            .shared_source(self.source.clone())
            .shared_medium(self.medium.clone())
            .wavelength(wavelength)
            .lmax(self.lmax)
            .origin(self.origin)
            .interactions(self.interactions)
            .solver(self.solver.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DIMER: &str = r#"{
        "wavelengths": {"range": [400, 700], "points": 4},
        "lmax": 2,
        "medium": {"type": "constant", "index": 1.33},
        "materials": {"glass": {"type": "constant", "index": 1.5}},
        "particles": [
            {"shape": {"type": "sphere", "radius": 50}, "position": [-100, 0, 0], "material": "glass"},
            {"shape": {"type": "cylinder", "radius": 30, "height": 80}, "position": [100, 0, 0],
             "orientation": {"theta": 0.5, "phi": 0.0}, "material": "glass"}
        ],
        "source": {"type": "plane_wave", "polarization": "y"},
        "solver": {"method": "lu"}
    }"#;

    #[test]
    fn test_defaults_and_units() {
        let config = JobConfig::from_json(DIMER).unwrap();
        config.validate().unwrap();
        assert!(config.interactions);
        assert_eq!(config.origin, OriginSpec::Named("zero".to_string()));
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.solver.method, SolverMethod::LuDecomposition);

        let job = config.prepare().unwrap();
        assert_eq!(job.wavelengths.len(), 4);
        assert_relative_eq!(job.wavelengths[0], 400e-9, max_relative = 1e-12);
        assert_relative_eq!(job.wavelengths[3], 700e-9, max_relative = 1e-12);
        assert_relative_eq!(job.particles[0].enclosed_radius(), 50e-9, max_relative = 1e-12);
        assert_relative_eq!(job.particles[1].position.x, 100e-9, max_relative = 1e-12);
        assert_relative_eq!(job.medium.index(500e-9).unwrap().re, 1.33, max_relative = 1e-12);
    }

    #[test]
    fn test_explicit_values() {
        let spec: WavelengthSpec = serde_json::from_str(r#"{"values": [500, 600]}"#).unwrap();
        assert_eq!(spec.values(), vec![500.0, 600.0]);
        let single: WavelengthSpec = serde_json::from_str(r#"{"range": [550, 900], "points": 1}"#).unwrap();
        assert_eq!(single.values(), vec![550.0]);
    }

    #[test]
    fn test_rejections() {
        let mut config = JobConfig::from_json(DIMER).unwrap();
        config.particles[0].material = "silicon".to_string();
        assert!(matches!(config.validate(), Err(InputError::UnknownMaterial(_))));

        let mut config = JobConfig::from_json(DIMER).unwrap();
        config.symmetry = Some("mirror".to_string());
        assert!(matches!(config.validate(), Err(InputError::Unsupported(_))));

        let mut config = JobConfig::from_json(DIMER).unwrap();
        config.interface = Some(MaterialSpec::Vacuum);
        assert!(matches!(config.validate(), Err(InputError::Unsupported(_))));

        let mut config = JobConfig::from_json(DIMER).unwrap();
        config.origin = OriginSpec::Named("middle".to_string());
        assert!(matches!(config.validate(), Err(InputError::Invalid(_))));

        let mut config = JobConfig::from_json(DIMER).unwrap();
        config.wavelengths = WavelengthSpec::List { values: vec![500.0, -1.0] };
        assert!(matches!(config.validate(), Err(InputError::Invalid(_))));

        let constant = MaterialSpec::Constant {
            eps: Some([2.0, 0.0]),
            index: Some(1.5),
            mu: None,
        };
        assert!(constant.build("both", None).is_err());
    }

    #[test]
    fn test_source_and_orientation_forms() {
        let source: SourceSpec = serde_json::from_str(
            r#"{"type": "plane_wave", "polarization": [[1, 0], [0, 1]], "theta": 0.3, "amplitude": 2.0}"#,
        )
        .unwrap();
        assert!(source.build().is_ok());

        let shifted: SourceSpec = serde_json::from_str(
            r#"{"type": "plane_wave", "polarization": [[1, 0], [0, 0]], "amplitude": 2.0, "phase": 0.4, "origin": [0, 0, 100]}"#,
        )
        .unwrap();
        let wave = shifted.build().unwrap();
        // the phase is referenced at the origin point, 100 nm along the beam
        let e = wave.e_field(&Vector3D::new(0.0, 0.0, 100e-9), 1.2e7).unwrap();
        assert!((e[0] - Complex64::from_polar(2.0, 0.4)).norm() < 1e-12);
        let e0 = wave.e_field(&Vector3D::origin(), 1.2e7).unwrap();
        assert!((e0[0] - Complex64::from_polar(2.0, 0.4 - 1.2e7 * 100e-9)).norm() < 1e-12);

        let dipole: SourceSpec = serde_json::from_str(
            r#"{"type": "point_dipole", "position": [0, 0, 150], "direction": [0, 0, 1]}"#,
        )
        .unwrap();
        let built = dipole.build().unwrap();
        let dipole = built.as_point_dipole().unwrap();
        assert_relative_eq!(dipole.position.z, 150e-9, max_relative = 1e-12);

        let orientation: OrientationSpec = serde_json::from_str(r#"{"quaternion": [2, 0, 0, 0]}"#).unwrap();
        let q = orientation.to_quaternion().unwrap();
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);

        let origin: OriginSpec = serde_json::from_str("[0, 0, 10]").unwrap();
        assert_eq!(origin.to_origin().unwrap(), Origin::Point(Vector3D::new(0.0, 0.0, 10e-9)));
    }

    #[test]
    fn test_tabulated_material_relative_to_job() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("glass.txt"), "# nm n k\n400 1.50 0\n800 1.46 0\n").unwrap();
        let job = DIMER.replace(
            r#""glass": {"type": "constant", "index": 1.5}"#,
            r#""glass": {"type": "tabulated", "file": "glass.txt"}"#,
        );
        let job_path = dir.path().join("job.json");
        fs::write(&job_path, job).unwrap();

        let config = load_config(&job_path).unwrap();
        let prepared = config.prepare().unwrap();
        let n = prepared.particles[0].material.index(600e-9).unwrap();
        assert_relative_eq!(n.re, 1.48, max_relative = 1e-3);
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"wavelengths\": ").unwrap();
        assert!(matches!(load_config(file.path()), Err(InputError::Parse(_))));
        assert!(matches!(
            load_config("/nonexistent/job.json"),
            Err(InputError::Io(_))
        ));
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Wavelength sweeps and spectrum output

use crate::cluster::CrossSections;
use crate::input::{Job, JobConfig};
use crate::particles::{mie_cross_sections, mie_sphere};
use crate::utils::constants::NM;
use anyhow::{Context, Result};
use log::{debug, info};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::PI;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Cross sections at one wavelength, in nm and nm²
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumPoint {
    pub wavelength_nm: f64,
    pub scattering_nm2: f64,
    pub absorption_nm2: f64,
    pub extinction_nm2: f64,
}

impl SpectrumPoint {
    fn from_cross_sections(wavelength: f64, c: &CrossSections) -> Self {
        let area = NM * NM;
        Self {
            wavelength_nm: wavelength / NM,
            scattering_nm2: c.scattering / area,
            absorption_nm2: c.absorption / area,
            extinction_nm2: c.extinction / area,
        }
    }
}

/// Solve the cluster at one wavelength (m)
pub fn solve_wavelength(job: &Job, wavelength: f64) -> Result<SpectrumPoint> {
    let cluster = job
        .builder(wavelength)
        .build()
        .with_context(|| format!("solving at {:.2} nm", wavelength / NM))?;
    let point = SpectrumPoint::from_cross_sections(wavelength, &cluster.cross_sections()?);
    debug!(
        "λ={:.2} nm: C_ext={:.4e} nm², C_abs={:.4e} nm², C_sca={:.4e} nm²",
        point.wavelength_nm, point.extinction_nm2, point.absorption_nm2, point.scattering_nm2
    );
    Ok(point)
}

/// Run the whole sweep, wavelengths in parallel
pub fn run_spectrum(job: &Job) -> Result<Vec<SpectrumPoint>> {
    info!(
        "Sweeping {} wavelengths for {} particles (lmax={})",
        job.wavelengths.len(),
        job.particles.len(),
        job.lmax
    );
    job.wavelengths
        .par_iter()
        .map(|&wavelength| solve_wavelength(job, wavelength))
        .collect()
}

/// Single-sphere cross sections from Mie theory
///
/// Lengths are in nm; `eps` is the sphere's relative permittivity.
pub fn mie_point(
    radius_nm: f64,
    eps: Complex64,
    wavelength_nm: f64,
    lmax: usize,
    medium_index: f64,
) -> Result<SpectrumPoint> {
    if radius_nm <= 0.0 || wavelength_nm <= 0.0 || medium_index <= 0.0 || lmax == 0 {
        anyhow::bail!("radius, wavelength, medium index and lmax must be positive");
    }
    let wavelength = wavelength_nm * NM;
    let k = 2.0 * PI * medium_index / wavelength;
    let one = Complex64::new(1.0, 0.0);
    let mie = mie_sphere(lmax, radius_nm * NM, k, eps.sqrt() / medium_index, one, one)?;
    let (scattering, absorption, extinction) = mie_cross_sections(&mie, k);
    Ok(SpectrumPoint::from_cross_sections(
        wavelength,
        &CrossSections {
            scattering,
            absorption,
            extinction,
        },
    ))
}

/// Write spectra as CSV with a `#` metadata header
pub fn write_spectra_csv(spectra: &[SpectrumPoint], path: &Path, config: &JobConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    writeln!(file, "# gmt-rs cross-section spectra")?;
    writeln!(file, "# version: {}", crate::VERSION)?;
    if let Some(title) = &config.title {
        writeln!(file, "# title: {}", title)?;
    }
    writeln!(file, "# lmax: {}", config.lmax)?;
    writeln!(file, "# interactions: {}", config.interactions)?;
    for (i, particle) in config.particles.iter().enumerate() {
        writeln!(
            file,
            "# particle {}: {:?} at {:?} nm, material={}",
            i, particle.shape, particle.position, particle.material
        )?;
    }
    writeln!(file, "#")?;
    writeln!(file, "wavelength_nm,scattering_nm2,absorption_nm2,extinction_nm2")?;
    for point in spectra {
        writeln!(
            file,
            "{:.4},{:.6e},{:.6e},{:.6e}",
            point.wavelength_nm, point.scattering_nm2, point.absorption_nm2, point.extinction_nm2
        )?;
    }

    info!("Spectra written to {}", path.display());
    Ok(())
}

/// Write spectra as pretty-printed JSON
pub fn write_spectra_json(spectra: &[SpectrumPoint], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(spectra)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("Spectra (JSON) written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::load_config;
    use approx::assert_relative_eq;

    const SPHERE_JOB: &str = r#"{
        "title": "glass sphere",
        "wavelengths": {"values": [450, 600]},
        "lmax": 4,
        "materials": {"glass": {"type": "constant", "eps": [2.25, 0.0]}},
        "particles": [{"shape": {"type": "sphere", "radius": 80}, "material": "glass"}],
        "source": {"type": "plane_wave"}
    }"#;

    #[test]
    fn test_sweep_matches_mie() {
        let job = JobConfig::from_json(SPHERE_JOB).unwrap().prepare().unwrap();
        let spectra = run_spectrum(&job).unwrap();
        assert_eq!(spectra.len(), 2);

        for point in &spectra {
            let mie = mie_point(80.0, Complex64::new(2.25, 0.0), point.wavelength_nm, 4, 1.0).unwrap();
            assert_relative_eq!(point.wavelength_nm, mie.wavelength_nm, max_relative = 1e-12);
            assert_relative_eq!(point.extinction_nm2, mie.extinction_nm2, max_relative = 1e-9);
            assert_relative_eq!(point.scattering_nm2, mie.scattering_nm2, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_mie_point_rejects_bad_input() {
        assert!(mie_point(-1.0, Complex64::new(2.0, 0.0), 500.0, 3, 1.0).is_err());
        assert!(mie_point(50.0, Complex64::new(2.0, 0.0), 500.0, 0, 1.0).is_err());
    }

    #[test]
    fn test_outputs_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let job_path = dir.path().join("job.json");
        fs::write(&job_path, SPHERE_JOB).unwrap();
        let config = load_config(&job_path).unwrap();
        let spectra = run_spectrum(&config.prepare().unwrap()).unwrap();

        let out = dir.path().join("out");
        write_spectra_csv(&spectra, &out.join("spectra.csv"), &config).unwrap();
        write_spectra_json(&spectra, &out.join("spectra.json")).unwrap();

        let csv = fs::read_to_string(out.join("spectra.csv")).unwrap();
        assert!(csv.contains("# title: glass sphere"));
        let rows: Vec<&str> = csv.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows[0], "wavelength_nm,scattering_nm2,absorption_nm2,extinction_nm2");
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("450.0000,"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("spectra.json")).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert!(json[1]["extinction_nm2"].as_f64().unwrap() > 0.0);
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use gmt_rs::cli::{run_spectrum, solve_wavelength, write_spectra_csv};
use gmt_rs::input::{load_config, InputError, JobConfig};
use gmt_rs::utils::constants::NM;
use std::fs;
use std::path::PathBuf;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn test_cylinder_grid_demo_prepares() {
    let config = load_config(demo("cylinder_grid.json")).unwrap();
    let job = config.prepare().unwrap();

    assert_eq!(job.particles.len(), 9);
    assert_eq!(job.wavelengths.len(), 100);
    assert_relative_eq!(job.wavelengths[0], 400.0 * NM, max_relative = 1e-12);
    assert_relative_eq!(job.wavelengths[99], 1000.0 * NM, max_relative = 1e-12);
    assert_eq!(job.lmax, 3);
    assert_relative_eq!(job.particles[0].position.z, -40.0 * NM, max_relative = 1e-12);
    assert_relative_eq!(job.particles[8].position.z, 40.0 * NM, max_relative = 1e-12);

    // the last rod lies in the xy plane
    let axis = job.particles[8].orientation.rotate(&gmt_rs::geometry::Vector3D::new(0.0, 0.0, 1.0));
    assert!(axis.z.abs() < 1e-9);
}

#[test]
fn test_cylinder_grid_single_wavelength() {
    let job = load_config(demo("cylinder_grid.json")).unwrap().prepare().unwrap();
    let point = solve_wavelength(&job, 650.0 * NM).unwrap();
    assert!(point.extinction_nm2 > 0.0);
    assert!(point.absorption_nm2 > 0.0);
    assert_relative_eq!(
        point.extinction_nm2,
        point.scattering_nm2 + point.absorption_nm2,
        max_relative = 1e-9
    );
}

#[test]
fn test_dimer_demo_sweep() {
    let config = load_config(demo("dimer.json")).unwrap();
    let mut job = config.prepare().unwrap();
    job.wavelengths.truncate(3);
    let spectra = run_spectrum(&job).unwrap();
    assert_eq!(spectra.len(), 3);
    assert!(spectra.windows(2).all(|w| w[1].wavelength_nm > w[0].wavelength_nm));
    assert!(spectra.iter().all(|p| p.extinction_nm2 > 0.0));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("spectra.csv");
    write_spectra_csv(&spectra, &path, &config).unwrap();
    let csv = fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().filter(|l| !l.starts_with('#')).count(), 4);
}

#[test]
fn test_job_survives_a_round_trip() {
    let config = load_config(demo("dimer.json")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let mut reloaded = load_config(&path).unwrap();
    reloaded.base_dir = config.base_dir.clone();
    assert_eq!(reloaded, config);
}

#[test]
fn test_unsupported_features_are_rejected() {
    let json = r#"{
        "wavelengths": {"values": [500]},
        "materials": {"gold": {"type": "gold"}},
        "particles": [{"shape": {"type": "sphere", "radius": 20}, "material": "gold"}],
        "source": {"type": "plane_wave"},
        "interface": {"type": "constant", "index": 1.5}
    }"#;
    let config = JobConfig::from_json(json).unwrap();
    assert!(matches!(config.validate(), Err(InputError::Unsupported(_))));
    assert!(config.prepare().is_err());
}

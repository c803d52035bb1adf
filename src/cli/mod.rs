/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command line interface
//!
//! ```sh
//! gmt-rs run job.json --output results
//! gmt-rs validate job.json
//! gmt-rs mie --radius 50 --eps-re 2.25 --wavelength 600
//! ```

pub mod runner;

pub use runner::{mie_point, run_spectrum, solve_wavelength, write_spectra_csv, write_spectra_json, SpectrumPoint};

use crate::input::load_config;
use clap::{Parser, Subcommand};
use num_complex::Complex64;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gmt-rs")]
#[command(about = "Generalized multiparticle Mie theory for nanoparticle clusters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the wavelength sweep of a JSON job file
    Run {
        /// Path to the job file
        config: PathBuf,
        /// Output directory (overrides the job file setting)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a job file without solving it
    Validate {
        /// Path to the job file
        config: PathBuf,
    },
    /// Cross sections of a single sphere
    Mie {
        /// Sphere radius (nm)
        #[arg(long)]
        radius: f64,
        /// Real part of the sphere permittivity
        #[arg(long)]
        eps_re: f64,
        /// Imaginary part of the sphere permittivity
        #[arg(long, default_value_t = 0.0)]
        eps_im: f64,
        /// Vacuum wavelength (nm)
        #[arg(long)]
        wavelength: f64,
        /// Maximum multipole order
        #[arg(long, default_value_t = 10)]
        lmax: usize,
        /// Refractive index of the medium
        #[arg(long, default_value_t = 1.0)]
        medium_index: f64,
    },
}

/// Execute a parsed command line
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run { config, output } => {
            let job_config = load_config(&config)?;
            println!("Configuration: {}", config.display());
            let job = job_config.prepare()?;
            let spectra = run_spectrum(&job)?;

            let out_dir = output.unwrap_or_else(|| job.output.directory.clone());
            if job.output.csv {
                let path = out_dir.join("spectra.csv");
                write_spectra_csv(&spectra, &path, &job_config)?;
                println!("Spectra written to: {}", path.display());
            }
            if job.output.json {
                let path = out_dir.join("spectra.json");
                write_spectra_json(&spectra, &path)?;
                println!("Spectra (JSON) written to: {}", path.display());
            }
            println!("Simulation complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job_config = load_config(&config)?;
            job_config.prepare()?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Mie {
            radius,
            eps_re,
            eps_im,
            wavelength,
            lmax,
            medium_index,
        } => {
            let point = mie_point(radius, Complex64::new(eps_re, eps_im), wavelength, lmax, medium_index)?;
            println!("wavelength_nm,scattering_nm2,absorption_nm2,extinction_nm2");
            println!(
                "{:.4},{:.6e},{:.6e},{:.6e}",
                point.wavelength_nm, point.scattering_nm2, point.absorption_nm2, point.extinction_nm2
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["gmt-rs", "run", "job.json", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Run { config, output } => {
                assert_eq!(config, PathBuf::from("job.json"));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "gmt-rs",
            "mie",
            "--radius",
            "50",
            "--eps-re",
            "2.25",
            "--wavelength",
            "600",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Mie { lmax: 10, .. }));
        assert!(Cli::try_parse_from(["gmt-rs", "mie", "--radius", "50"]).is_err());
    }

    #[test]
    fn test_validate_reports_bad_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(
            &path,
            r#"{"wavelengths": {"values": [500]}, "particles": [], "source": {"type": "plane_wave"}}"#,
        )
        .unwrap();
        let cli = Cli::try_parse_from(["gmt-rs", "validate", path.to_str().unwrap()]).unwrap();
        assert!(execute(cli).is_err());
    }
}

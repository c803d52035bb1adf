/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Tabulated dispersive materials
//!
//! Permittivity values are linearly interpolated between tabulated vacuum
//! wavelengths; requests outside the table are errors.

use super::errors::{MaterialError, Result};
use super::Material;
use crate::utils::errors::UtilsError;
use crate::utils::math::interpolate_table;
use num_complex::Complex64;
use std::fs;
use std::path::Path;

/// Material defined by a permittivity table
#[derive(Debug, Clone)]
pub struct TabulatedMaterial {
    name: String,
    wavelengths: Vec<f64>,
    eps_re: Vec<f64>,
    eps_im: Vec<f64>,
    mu: Complex64,
}

impl TabulatedMaterial {
    /// Create a material from wavelengths (m) and permittivities
    ///
    /// # Errors
    ///
    /// The table needs at least two strictly increasing wavelengths and one
    /// permittivity per wavelength.
    pub fn new(name: &str, wavelengths: Vec<f64>, eps: Vec<Complex64>) -> Result<Self> {
        if wavelengths.len() != eps.len() {
            return Err(MaterialError::InvalidTable(format!(
                "{} wavelengths but {} permittivities",
                wavelengths.len(),
                eps.len()
            )));
        }
        if wavelengths.len() < 2 {
            return Err(MaterialError::InvalidTable(
                "at least two wavelengths are required".to_string(),
            ));
        }
        if wavelengths.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MaterialError::InvalidTable(
                "wavelengths must be strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            wavelengths,
            eps_re: eps.iter().map(|e| e.re).collect(),
            eps_im: eps.iter().map(|e| e.im).collect(),
            mu: Complex64::new(1.0, 0.0),
        })
    }

    /// Create a material from tabulated complex refractive indices n + iκ
    pub fn from_index(name: &str, wavelengths: Vec<f64>, index: Vec<Complex64>) -> Result<Self> {
        let eps = index.iter().map(|n| n * n).collect();
        Self::new(name, wavelengths, eps)
    }

    /// Read a whitespace-separated table of `wavelength_nm n k` rows
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_file<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut wavelengths = Vec::new();
        let mut index = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let values: Vec<f64> = line
                .split_whitespace()
                .map(|v| v.parse::<f64>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| {
                    MaterialError::InvalidTable(format!("line {}: {}", line_no + 1, e))
                })?;
            if values.len() < 3 {
                return Err(MaterialError::InvalidTable(format!(
                    "line {}: expected `wavelength_nm n k`",
                    line_no + 1
                )));
            }
            wavelengths.push(values[0] * 1e-9);
            index.push(Complex64::new(values[1], values[2]));
        }

        Self::from_index(name, wavelengths, index)
    }

    /// Set a constant relative permeability
    pub fn with_mu(mut self, mu: Complex64) -> Self {
        self.mu = mu;
        self
    }

    /// Tabulated wavelength range (m)
    pub fn wavelength_range(&self) -> (f64, f64) {
        (
            self.wavelengths[0],
            self.wavelengths[self.wavelengths.len() - 1],
        )
    }

    fn interpolate(&self, wavelength: f64, values: &[f64]) -> Result<f64> {
        interpolate_table(wavelength, &self.wavelengths, values).map_err(|e| match e {
            UtilsError::OutOfRange { value, min, max } => MaterialError::OutOfRange {
                wavelength: value,
                min,
                max,
            },
            other => MaterialError::InvalidTable(other.to_string()),
        })
    }
}

impl Material for TabulatedMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn eps(&self, wavelength: f64) -> Result<Complex64> {
        let re = self.interpolate(wavelength, &self.eps_re)?;
        let im = self.interpolate(wavelength, &self.eps_im)?;
        Ok(Complex64::new(re, im))
    }

    fn mu(&self, _wavelength: f64) -> Result<Complex64> {
        Ok(self.mu)
    }
}

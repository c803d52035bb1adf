/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Drude free-electron metals
//!
//! ε(ω) = ε∞ − ωp² / (ω² + iγω), with the exp(−iωt) time convention so that
//! absorbing metals have Im ε > 0.

use super::errors::{MaterialError, Result};
use super::Material;
use crate::utils::angular_frequency;
use num_complex::Complex64;

/// ħ in eV·s, converting photon energies to angular frequencies
const HBAR_EV_S: f64 = 6.582_119_569e-16;

/// Drude metal
#[derive(Debug, Clone, PartialEq)]
pub struct DrudeMaterial {
    /// High-frequency permittivity
    pub eps_inf: f64,
    /// Plasma frequency (rad/s)
    pub wp: f64,
    /// Damping rate (rad/s)
    pub gamma: f64,
    name: String,
}

impl DrudeMaterial {
    /// Create a Drude metal from angular frequencies in rad/s
    pub fn new(eps_inf: f64, wp: f64, gamma: f64) -> Result<Self> {
        if wp < 0.0 || gamma < 0.0 || eps_inf <= 0.0 {
            return Err(MaterialError::InvalidParameter(format!(
                "Drude parameters eps_inf={}, wp={}, gamma={}",
                eps_inf, wp, gamma
            )));
        }
        Ok(Self {
            eps_inf,
            wp,
            gamma,
            name: "Drude".to_string(),
        })
    }

    /// Create a Drude metal from energies in eV
    pub fn from_ev(eps_inf: f64, wp_ev: f64, gamma_ev: f64) -> Result<Self> {
        Self::new(eps_inf, wp_ev / HBAR_EV_S, gamma_ev / HBAR_EV_S)
    }

    /// Set a display name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Drude fit for gold in the visible and near infrared
    pub fn gold() -> Self {
        Self {
            eps_inf: 9.54,
            wp: 9.0 / HBAR_EV_S,
            gamma: 0.067 / HBAR_EV_S,
            name: "Au (Drude)".to_string(),
        }
    }

    /// Drude fit for silver in the visible and near infrared
    pub fn silver() -> Self {
        Self {
            eps_inf: 3.7,
            wp: 8.9 / HBAR_EV_S,
            gamma: 0.021 / HBAR_EV_S,
            name: "Ag (Drude)".to_string(),
        }
    }
}

impl Material for DrudeMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn eps(&self, wavelength: f64) -> Result<Complex64> {
        let omega = angular_frequency(wavelength);
        let denominator = Complex64::new(omega * omega, self.gamma * omega);
        Ok(self.eps_inf - self.wp * self.wp / denominator)
    }
}

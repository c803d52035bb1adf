/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Utility functions shared by the multipole solvers
//!
//! This module provides physical constants, special-function helpers and
//! the ndarray/faer glue used throughout the crate.

pub mod constants;
pub mod errors;
pub mod linear_algebra;
pub mod math;

pub use errors::{Result, UtilsError};

/// Vacuum wavenumber 2π/λ for a wavelength in metres
pub fn wavenumber(wavelength: f64) -> f64 {
    2.0 * std::f64::consts::PI / wavelength
}

/// Angular frequency ω = 2πc/λ for a vacuum wavelength in metres
pub fn angular_frequency(wavelength: f64) -> f64 {
    2.0 * std::f64::consts::PI * constants::SPEED_OF_LIGHT / wavelength
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wavenumber_and_frequency() {
        let wavelength = 600.0 * constants::NM;
        let k = wavenumber(wavelength);
        assert_relative_eq!(k * wavelength, 2.0 * std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(
            angular_frequency(wavelength),
            k * constants::SPEED_OF_LIGHT,
            max_relative = 1e-14
        );
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Local density of states at a point-dipole source
//!
//! The power emitted by a dipole is proportional to the real part of the
//! regular field projected on its conjugate direction. Relative to the same
//! dipole in the bare medium:
//!
//! ρ/ρ₀ = 1 + Re(d̂*·E_scat) / Re(d̂*·E_self)
//!
//! where E_self is the regular part of the dipole's own field. The projected
//! LDOS of the medium is ρ₀ = ω² n_b / (3π² c³).

use super::errors::{ClusterError, Result};
use super::fields::FieldOptions;
use super::Cluster;
use crate::utils::angular_frequency;
use crate::utils::constants::SPEED_OF_LIGHT;
use num_complex::Complex64;
use std::f64::consts::PI;

impl Cluster {
    /// LDOS at the position of the point-dipole source
    ///
    /// Returns the enhancement over the bare medium when `enhancement` is
    /// true, otherwise the projected LDOS in s/m³.
    ///
    /// # Errors
    ///
    /// The source must be a single point dipole.
    pub fn local_density_of_states(&self, enhancement: bool) -> Result<f64> {
        let dipole = self.source.as_point_dipole().ok_or_else(|| {
            ClusterError::NotDefined(format!(
                "the LDOS needs a single point-dipole source, not {:?}",
                self.source
            ))
        })?;

        let options = FieldOptions {
            interior: false,
            source: false,
            mask: false,
            far: false,
        };
        let scattered = self.e_field(std::slice::from_ref(&dipole.position), options)?;
        let self_field = dipole.regular_self_field();

        let project = |field: &[Complex64; 3]| -> f64 {
            field
                .iter()
                .zip(&dipole.direction)
                .map(|(f, d)| d.conj() * f)
                .sum::<Complex64>()
                .re
        };
        let ratio = 1.0 + project(&scattered[0]) / project(&self_field);
        if enhancement {
            return Ok(ratio);
        }

        let omega = angular_frequency(self.wavelength);
        let rho_0 = omega * omega * self.material_data.n_b / (3.0 * PI * PI * SPEED_OF_LIGHT.powi(3));
        Ok(ratio * rho_0)
    }
}

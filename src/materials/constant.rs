/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Dispersionless materials

use super::errors::Result;
use super::Material;
use num_complex::Complex64;

/// Material with wavelength-independent ε and μ
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantMaterial {
    eps: Complex64,
    mu: Complex64,
    name: String,
}

impl ConstantMaterial {
    /// Create a material from its permittivity and permeability
    pub fn new(eps: Complex64, mu: Complex64) -> Self {
        Self {
            eps,
            mu,
            name: format!("constant(eps={}, mu={})", eps, mu),
        }
    }

    /// Non-magnetic material with refractive index `n`
    pub fn from_index(n: f64) -> Self {
        Self::new(Complex64::new(n * n, 0.0), Complex64::new(1.0, 0.0)).with_name(&format!("n={}", n))
    }

    /// Set a display name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Vacuum (ε = μ = 1)
    pub fn vacuum() -> Self {
        Self::new(Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)).with_name("vacuum")
    }

    /// Air at optical frequencies
    pub fn air() -> Self {
        Self::new(Complex64::new(1.00058986, 0.0), Complex64::new(1.0, 0.0)).with_name("air")
    }
}

impl Material for ConstantMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn eps(&self, _wavelength: f64) -> Result<Complex64> {
        Ok(self.eps)
    }

    fn mu(&self, _wavelength: f64) -> Result<Complex64> {
        Ok(self.mu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_material() {
        let glass = ConstantMaterial::from_index(1.5);
        assert_relative_eq!(glass.eps(400e-9).unwrap().re, 2.25);
        assert_relative_eq!(glass.index(900e-9).unwrap().re, 1.5, epsilon = 1e-14);
        assert_eq!(ConstantMaterial::vacuum().name(), "vacuum");

        let magnetic = ConstantMaterial::new(Complex64::new(4.0, 0.0), Complex64::new(2.25, 0.0));
        assert_relative_eq!(magnetic.index(1e-6).unwrap().re, 3.0, epsilon = 1e-14);
    }
}

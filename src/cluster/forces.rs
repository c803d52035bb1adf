/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Optical forces and torques
//!
//! The time-averaged Maxwell stress tensor
//!
//! T = ½ Re[ε E E* + μ H H* − ½ (ε|E|² + μ|H|²) I]
//!
//! is integrated over a sphere around the particle, with the field built
//! from the particle's exciting (regular) and scattered (outgoing)
//! expansions. The θ integral uses Gauss–Legendre nodes in cos θ and the φ
//! integral the trapezoidal rule, both exact for the band-limited fields of
//! a truncated expansion.

use super::errors::Result;
use super::Cluster;
use crate::geometry::{sph_to_cart, vec_sph_to_cart, ComplexVector3, Vector3D};
use crate::utils::constants::EPSILON_0;
use crate::utils::math::gauss_legendre;
use crate::vsh::{expand_e, expand_h, rmax_to_lmax, Coefficients, VshMode};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Force (N) and torque (N·m) from the local expansions of one particle
///
/// # Arguments
///
/// * `p_scat` - Outgoing coefficients of the particle
/// * `p_inc` - Regular coefficients of the field exciting it
/// * `k` - Wavenumber of the medium (1/m)
/// * `eps_b`, `mu_b` - Relative permittivity and permeability of the medium
/// * `radius` - Radius of the integration sphere (m)
pub fn stress_tensor_integrals(
    p_scat: &Coefficients,
    p_inc: &Coefficients,
    k: f64,
    eps_b: f64,
    mu_b: f64,
    radius: f64,
) -> Result<([f64; 3], [f64; 3])> {
    let lmax = rmax_to_lmax(p_scat.ncols())?;
    let (cos_nodes, weights) = gauss_legendre(2 * lmax + 10);
    let n_phi = 4 * lmax + 8;
    let d_phi = 2.0 * PI / n_phi as f64;

    let kc = Complex64::new(k, 0.0);
    let eps = Complex64::new(eps_b, 0.0);
    let mu = Complex64::new(mu_b, 0.0);
    let area = radius * radius;

    let rows: Vec<([f64; 3], [f64; 3])> = cos_nodes
        .par_iter()
        .zip(weights.par_iter())
        .map(|(&cos_theta, &weight)| -> Result<([f64; 3], [f64; 3])> {
            let theta = cos_theta.clamp(-1.0, 1.0).acos();
            let mut force = [0.0; 3];
            let mut torque = [0.0; 3];
            for j in 0..n_phi {
                let phi = j as f64 * d_phi;
                let field = |mode: VshMode, p: &Coefficients| -> Result<(ComplexVector3, ComplexVector3)> {
                    let e = expand_e(p, kc, mode, radius, theta, phi)?;
                    let h = expand_h(p, kc, mode, eps, mu, radius, theta, phi)?;
                    Ok((vec_sph_to_cart(&e, theta, phi), vec_sph_to_cart(&h, theta, phi)))
                };
                let (e_scat, h_scat) = field(VshMode::Outgoing, p_scat)?;
                let (e_inc, h_inc) = field(VshMode::Incident, p_inc)?;
                let e: ComplexVector3 = std::array::from_fn(|c| e_scat[c] + e_inc[c]);
                let h: ComplexVector3 = std::array::from_fn(|c| h_scat[c] + h_inc[c]);

                let normal = sph_to_cart(1.0, theta, phi, &Vector3D::origin()).to_array();
                let traction = stress_traction(&e, &h, &normal, eps_b, mu_b);
                let w = weight * d_phi * area;
                for c in 0..3 {
                    force[c] += w * traction[c];
                }
                let moment = [
                    normal[1] * traction[2] - normal[2] * traction[1],
                    normal[2] * traction[0] - normal[0] * traction[2],
                    normal[0] * traction[1] - normal[1] * traction[0],
                ];
                for c in 0..3 {
                    torque[c] += w * radius * moment[c];
                }
            }
            Ok((force, torque))
        })
        .collect::<Result<_>>()?;

    let mut force = [0.0; 3];
    let mut torque = [0.0; 3];
    for (f, t) in rows {
        for c in 0..3 {
            force[c] += f[c];
            torque[c] += t[c];
        }
    }
    Ok((force, torque))
}

/// T·n̂ for E and G = Z0·H in a medium of relative ε and μ
fn stress_traction(e: &ComplexVector3, g: &ComplexVector3, normal: &[f64; 3], eps_b: f64, mu_b: f64) -> [f64; 3] {
    let project = |v: &ComplexVector3| -> Complex64 {
        v.iter().zip(normal).map(|(c, n)| c.conj() * *n).sum()
    };
    let e_n = project(e);
    let g_n = project(g);
    let energy = eps_b * e.iter().map(|c| c.norm_sqr()).sum::<f64>()
        + mu_b * g.iter().map(|c| c.norm_sqr()).sum::<f64>();
    std::array::from_fn(|c| {
        0.5 * EPSILON_0 * ((eps_b * e[c] * e_n + mu_b * g[c] * g_n).re - 0.5 * energy * normal[c])
    })
}

impl Cluster {
    fn stress_on_particle(&self, i: usize, source: bool) -> Result<([f64; 3], [f64; 3])> {
        self.check_index(i)?;
        let data = &self.material_data;
        stress_tensor_integrals(
            &self.p_scat[i],
            &self.exciting(i, source),
            data.k_b,
            data.eps_b,
            data.mu_b,
            self.particles[i].enclosed_radius(),
        )
    }

    /// Time-averaged force on particle `i` (N)
    ///
    /// With `source` false only the fields of the other particles act.
    pub fn force_on_particle(&self, i: usize, source: bool) -> Result<[f64; 3]> {
        Ok(self.stress_on_particle(i, source)?.0)
    }

    /// Time-averaged torque on particle `i` about its centre (N·m)
    pub fn torque_on_particle(&self, i: usize, source: bool) -> Result<[f64; 3]> {
        Ok(self.stress_on_particle(i, source)?.1)
    }

    /// Force on every particle
    pub fn force(&self, source: bool) -> Result<Vec<[f64; 3]>> {
        (0..self.len()).map(|i| self.force_on_particle(i, source)).collect()
    }

    /// Torque on every particle
    pub fn torque(&self, source: bool) -> Result<Vec<[f64; 3]>> {
        (0..self.len()).map(|i| self.torque_on_particle(i, source)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{ConstantMaterial, SharedMaterial};
    use crate::particles::{mie_cross_sections, mie_sphere, Particle, Shape};
    use crate::sources::PlaneWave;
    use crate::utils::constants::NM;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn sphere_cluster(material: SharedMaterial, radius: f64, wave: PlaneWave, lmax: usize) -> Cluster {
        let particle = Particle::new(Shape::Sphere { radius }, Vector3D::origin(), material).unwrap();
        Cluster::builder()
            .particle(particle)
            .source(wave)
            .wavelength(600.0 * NM)
            .lmax(lmax)
            .build()
            .unwrap()
    }

    #[test]
    fn test_radiation_pressure_on_sphere() {
        let radius = 80.0 * NM;
        let index = Complex64::new(1.5, 0.0);
        let lmax = 8;
        let cluster = sphere_cluster(
            Arc::new(ConstantMaterial::from_index(1.5)),
            radius,
            PlaneWave::x_polarized(),
            lmax,
        );

        let k = 2.0 * PI / (600.0 * NM);
        let one = Complex64::new(1.0, 0.0);
        let mie = mie_sphere(lmax, radius, k, index, one, one).unwrap();
        let (_, _, ext) = mie_cross_sections(&mie, k);
        let mut asymmetry = 0.0;
        for n in 1..=lmax {
            let nf = n as f64;
            let (a, b) = (mie.an[n - 1], mie.bn[n - 1]);
            if n < lmax {
                let (a1, b1) = (mie.an[n], mie.bn[n]);
                asymmetry += nf * (nf + 2.0) / (nf + 1.0) * (a * a1.conj() + b * b1.conj()).re;
            }
            asymmetry += (2.0 * nf + 1.0) / (nf * (nf + 1.0)) * (a * b.conj()).re;
        }
        let pressure = ext - 4.0 * PI / (k * k) * asymmetry;

        let force = cluster.force_on_particle(0, true).unwrap();
        assert_relative_eq!(force[2], 0.5 * EPSILON_0 * pressure, max_relative = 1e-6);
        assert!(force[0].abs() < 1e-9 * force[2]);
        assert!(force[1].abs() < 1e-9 * force[2]);

        let torque = cluster.torque_on_particle(0, true).unwrap();
        assert!(torque.iter().all(|t| t.abs() < 1e-9 * force[2] * radius));
    }

    #[test]
    fn test_circular_light_spins_absorbing_sphere() {
        let material: SharedMaterial = Arc::new(ConstantMaterial::new(
            Complex64::new(4.0, 1.0),
            Complex64::new(1.0, 0.0),
        ));
        let cluster = sphere_cluster(material, 50.0 * NM, PlaneWave::rhc(), 6);
        let absorption = cluster.cross_sections().unwrap().absorption;
        let k = cluster.material_data().k_b;

        let torque = cluster.torque(true).unwrap();
        assert_relative_eq!(torque[0][2], absorption * EPSILON_0 / (2.0 * k), max_relative = 1e-5);
        assert_eq!(cluster.force(false).unwrap().len(), 1);
        assert!(cluster.force_on_particle(1, true).is_err());
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Electric and magnetic fields of a solved cluster
//!
//! Magnetic fields are reported as Z0·H.

use super::errors::Result;
use super::Cluster;
use crate::geometry::{cart_to_sph, sph_to_cart, vec_cart_to_sph, vec_sph_to_cart, ComplexVector3, Vector3D};
use crate::vsh::{expand_e, expand_e_far, expand_h, expand_h_far, Coefficients, VshMode};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;

/// What to include when evaluating cluster fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions {
    /// Use the interior expansion inside particles that have one
    pub interior: bool,
    /// Add the source field
    pub source: bool,
    /// Zero the field inside the particles
    pub mask: bool,
    /// Use the far-field asymptotic expansions
    pub far: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            interior: true,
            source: true,
            mask: false,
            far: false,
        }
    }
}

impl FieldOptions {
    /// Scattered field only, evaluated with the far-field expansions
    pub fn far_field(source: bool) -> Self {
        Self {
            interior: false,
            source,
            mask: false,
            far: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Electric,
    Magnetic,
}

fn zero3() -> ComplexVector3 {
    [Complex64::new(0.0, 0.0); 3]
}

fn accumulate(total: &mut ComplexVector3, value: ComplexVector3) {
    for (t, v) in total.iter_mut().zip(value) {
        *t += v;
    }
}

impl Cluster {
    /// Cartesian field of an expansion centred on particle `i`
    fn expansion_field(
        &self,
        kind: FieldKind,
        p: &Coefficients,
        i: usize,
        point: &Vector3D,
        mode: VshMode,
        far: bool,
    ) -> Result<ComplexVector3> {
        let data = &self.material_data;
        let (r, theta, phi) = cart_to_sph(point, &self.positions[i]);
        let eps_b = Complex64::new(data.eps_b, 0.0);
        let mu_b = Complex64::new(data.mu_b, 0.0);

        let field = if mode == VshMode::Interior {
            let k_int = 2.0 * PI * data.n[i] / self.wavelength;
            match kind {
                FieldKind::Electric => expand_e(p, k_int, mode, r, theta, phi)?,
                FieldKind::Magnetic => expand_h(p, k_int, mode, data.eps[i], data.mu[i], r, theta, phi)?,
            }
        } else if far {
            match kind {
                FieldKind::Electric => expand_e_far(p, data.k_b, r, theta, phi)?,
                FieldKind::Magnetic => expand_h_far(p, data.k_b, eps_b, mu_b, r, theta, phi)?,
            }
        } else {
            let k = Complex64::new(data.k_b, 0.0);
            match kind {
                FieldKind::Electric => expand_e(p, k, mode, r, theta, phi)?,
                FieldKind::Magnetic => expand_h(p, k, mode, eps_b, mu_b, r, theta, phi)?,
            }
        };
        Ok(vec_sph_to_cart(&field, theta, phi))
    }

    fn source_field(&self, kind: FieldKind, point: &Vector3D) -> Result<ComplexVector3> {
        match kind {
            FieldKind::Electric => self.e_source(point),
            FieldKind::Magnetic => self.h_source(point),
        }
    }

    /// Index of the particle whose enclosing sphere contains `point`
    ///
    /// When enclosing spheres overlap the highest index wins.
    fn containing_particle(&self, point: &Vector3D) -> Option<usize> {
        (0..self.particles.len()).rev().find(|&i| {
            let radius = self.particles[i].enclosed_radius();
            point.distance(&self.positions[i]) < radius
        })
    }

    fn field_at(&self, kind: FieldKind, point: &Vector3D, options: FieldOptions) -> Result<ComplexVector3> {
        if !options.far {
            if let Some(i) = self.containing_particle(point) {
                if options.mask {
                    return Ok(zero3());
                }
                if options.interior && self.interior_ratios[i].is_some() {
                    return self.expansion_field(kind, &self.p_int[i], i, point, VshMode::Interior, false);
                }
            }
        }

        let mut total = zero3();
        for (i, p) in self.p_scat.iter().enumerate() {
            accumulate(
                &mut total,
                self.expansion_field(kind, p, i, point, VshMode::Outgoing, options.far)?,
            );
        }
        if options.source {
            accumulate(&mut total, self.source_field(kind, point)?);
        }
        Ok(total)
    }

    fn particle_field(&self, kind: FieldKind, i: usize, point: &Vector3D, source: bool) -> Result<ComplexVector3> {
        self.check_index(i)?;
        let mut total = self.expansion_field(kind, &self.p_scat[i], i, point, VshMode::Outgoing, false)?;
        let exciting = self.exciting(i, source);
        accumulate(
            &mut total,
            self.expansion_field(kind, &exciting, i, point, VshMode::Incident, false)?,
        );
        Ok(total)
    }

    /// Electric field near particle `i` from its local expansions
    ///
    /// The exciting field expansion only converges closer to particle `i`
    /// than to any other particle.
    pub fn e_field_from_particle(&self, i: usize, point: &Vector3D, source: bool) -> Result<ComplexVector3> {
        self.particle_field(FieldKind::Electric, i, point, source)
    }

    /// Z0·H near particle `i` from its local expansions
    pub fn h_field_from_particle(&self, i: usize, point: &Vector3D, source: bool) -> Result<ComplexVector3> {
        self.particle_field(FieldKind::Magnetic, i, point, source)
    }

    /// Electric field of the source
    pub fn e_source(&self, point: &Vector3D) -> Result<ComplexVector3> {
        Ok(self.source.e_field(point, self.material_data.k_b)?)
    }

    /// Z0·H of the source in the medium
    pub fn h_source(&self, point: &Vector3D) -> Result<ComplexVector3> {
        let factor = (self.material_data.eps_b / self.material_data.mu_b).sqrt();
        let h = self.source.h_field(point, self.material_data.k_b)?;
        Ok(h.map(|c| c * factor))
    }

    /// Angular spectrum of the source in the medium at each (θ, φ)
    pub fn source_angular_spectrum(&self, angles: &[(f64, f64)]) -> Result<Vec<[Complex64; 2]>> {
        let k = self.material_data.k_b;
        angles
            .iter()
            .map(|&(theta, phi)| Ok(self.source.angular_spectrum(theta, phi, k)?))
            .collect()
    }

    /// Power per unit area (W/m²) the source carries in the medium
    pub fn source_power_density(&self) -> Result<f64> {
        let data = &self.material_data;
        Ok(self.source.power_density(data.eps_b, data.mu_b)?)
    }

    /// Cartesian electric field at each point
    pub fn e_field(&self, points: &[Vector3D], options: FieldOptions) -> Result<Vec<ComplexVector3>> {
        points
            .par_iter()
            .map(|point| self.field_at(FieldKind::Electric, point, options))
            .collect()
    }

    /// Cartesian Z0·H at each point
    pub fn h_field(&self, points: &[Vector3D], options: FieldOptions) -> Result<Vec<ComplexVector3>> {
        points
            .par_iter()
            .map(|point| self.field_at(FieldKind::Magnetic, point, options))
            .collect()
    }

    fn spherical_field(
        &self,
        kind: FieldKind,
        points: &[[f64; 3]],
        options: FieldOptions,
    ) -> Result<Vec<ComplexVector3>> {
        points
            .par_iter()
            .map(|&[r, theta, phi]| {
                let point = sph_to_cart(r, theta, phi, &self.origin);
                let field = self.field_at(kind, &point, options)?;
                Ok(vec_cart_to_sph(&field, theta, phi))
            })
            .collect()
    }

    /// Electric field at (r, θ, φ) about the cluster origin, in spherical components
    pub fn e_field_spherical(&self, points: &[[f64; 3]], options: FieldOptions) -> Result<Vec<ComplexVector3>> {
        self.spherical_field(FieldKind::Electric, points, options)
    }

    /// Z0·H at (r, θ, φ) about the cluster origin, in spherical components
    pub fn h_field_spherical(&self, points: &[[f64; 3]], options: FieldOptions) -> Result<Vec<ComplexVector3>> {
        self.spherical_field(FieldKind::Magnetic, points, options)
    }

    fn angular_field(
        &self,
        kind: FieldKind,
        angles: &[(f64, f64)],
        radius: Option<f64>,
        source: bool,
    ) -> Result<Vec<[Complex64; 2]>> {
        let radius = radius.unwrap_or(2.0 * PI / self.material_data.k_b);
        let points: Vec<[f64; 3]> = angles.iter().map(|&(theta, phi)| [radius, theta, phi]).collect();
        let fields = self.spherical_field(kind, &points, FieldOptions::far_field(source))?;
        Ok(fields.into_iter().map(|f| [f[1], f[2]]).collect())
    }

    /// Far-field (E_θ, E_φ) at the given (θ, φ)
    ///
    /// `radius` defaults to one wavelength in the medium.
    pub fn e_angular(&self, angles: &[(f64, f64)], radius: Option<f64>, source: bool) -> Result<Vec<[Complex64; 2]>> {
        self.angular_field(FieldKind::Electric, angles, radius, source)
    }

    /// Far-field (Z0·H_θ, Z0·H_φ) at the given (θ, φ)
    pub fn h_angular(&self, angles: &[(f64, f64)], radius: Option<f64>, source: bool) -> Result<Vec<[Complex64; 2]>> {
        self.angular_field(FieldKind::Magnetic, angles, radius, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{ConstantMaterial, SharedMaterial};
    use crate::particles::{Particle, Shape};
    use crate::sources::{PlaneWave, Source};
    use crate::utils::constants::NM;
    use std::sync::Arc;

    fn single_sphere(material: SharedMaterial, radius: f64, lmax: usize) -> Cluster {
        let particle = Particle::new(Shape::Sphere { radius }, Vector3D::origin(), material).unwrap();
        Cluster::builder()
            .particle(particle)
            .source(PlaneWave::x_polarized())
            .wavelength(600.0 * NM)
            .lmax(lmax)
            .build()
            .unwrap()
    }

    fn max_difference(a: &ComplexVector3, b: &ComplexVector3) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).norm()).fold(0.0, f64::max)
    }

    #[test]
    fn test_index_matched_sphere_is_transparent() {
        let cluster = single_sphere(Arc::new(ConstantMaterial::vacuum()), 50.0 * NM, 6);
        let wave = PlaneWave::x_polarized();
        let k = cluster.material_data().k_b;
        let points = [
            Vector3D::new(10.0 * NM, -20.0 * NM, 15.0 * NM),
            Vector3D::new(200.0 * NM, 40.0 * NM, -90.0 * NM),
        ];
        let fields = cluster.e_field(&points, FieldOptions::default()).unwrap();
        for (point, field) in points.iter().zip(&fields) {
            let expected = wave.e_field(point, k).unwrap();
            assert!(max_difference(field, &expected) < 1e-6);
        }
    }

    #[test]
    fn test_tangential_field_is_continuous() {
        let glass: SharedMaterial = Arc::new(ConstantMaterial::from_index(1.5));
        let radius = 40.0 * NM;
        let cluster = single_sphere(glass, radius, 8);
        let (theta, phi) = (1.1, 0.6);
        let inside = sph_to_cart(radius * (1.0 - 1e-9), theta, phi, &Vector3D::origin());
        let outside = sph_to_cart(radius * (1.0 + 1e-9), theta, phi, &Vector3D::origin());

        let options = FieldOptions::default();
        for fields in [
            cluster.e_field(&[inside, outside], options).unwrap(),
            cluster.h_field(&[inside, outside], options).unwrap(),
        ] {
            let f_in = vec_cart_to_sph(&fields[0], theta, phi);
            let f_out = vec_cart_to_sph(&fields[1], theta, phi);
            assert!((f_in[1] - f_out[1]).norm() < 1e-5);
            assert!((f_in[2] - f_out[2]).norm() < 1e-5);
        }
    }

    #[test]
    fn test_mask_and_particle_fields() {
        let glass: SharedMaterial = Arc::new(ConstantMaterial::from_index(2.0));
        let cluster = single_sphere(glass, 80.0 * NM, 4);
        let inside = Vector3D::new(0.0, 10.0 * NM, 20.0 * NM);
        let options = FieldOptions {
            mask: true,
            ..FieldOptions::default()
        };
        let masked = cluster.e_field(&[inside], options).unwrap();
        assert!(masked[0].iter().all(|c| c.norm() == 0.0));

        let outside = Vector3D::new(150.0 * NM, -60.0 * NM, 90.0 * NM);
        let scattered = cluster
            .e_field(
                &[outside],
                FieldOptions {
                    source: false,
                    ..FieldOptions::default()
                },
            )
            .unwrap();
        let local = cluster.e_field_from_particle(0, &outside, false).unwrap();
        assert!(max_difference(&scattered[0], &local) < 1e-12);
        assert!(cluster.e_field_from_particle(3, &outside, true).is_err());
    }

    #[test]
    fn test_far_field_matches_near_expansion() {
        let glass: SharedMaterial = Arc::new(ConstantMaterial::from_index(1.5));
        let cluster = single_sphere(glass, 100.0 * NM, 5);
        let angles = [(0.3, 0.2), (1.4, 2.0), (2.6, -1.0)];
        let radius = 1e-3;
        let far = cluster.e_angular(&angles, Some(radius), false).unwrap();

        let points: Vec<[f64; 3]> = angles.iter().map(|&(t, p)| [radius, t, p]).collect();
        let near = cluster
            .e_field_spherical(
                &points,
                FieldOptions {
                    source: false,
                    ..FieldOptions::default()
                },
            )
            .unwrap();
        for (f, n) in far.iter().zip(&near) {
            let scale = n[1].norm().max(n[2].norm());
            assert!((f[0] - n[1]).norm() < 1e-3 * scale);
            assert!((f[1] - n[2]).norm() < 1e-3 * scale);
        }

        let h = cluster.h_angular(&angles, Some(radius), false).unwrap();
        for (e, h) in far.iter().zip(&h) {
            // transverse far field: |Z0 H| = |E| in vacuum
            let e_norm = (e[0].norm_sqr() + e[1].norm_sqr()).sqrt();
            let h_norm = (h[0].norm_sqr() + h[1].norm_sqr()).sqrt();
            assert!((e_norm - h_norm).abs() < 1e-9 * e_norm);
        }
    }

    #[test]
    fn test_source_power_density_in_water() {
        let particle = Particle::new(
            Shape::Sphere { radius: 30.0 * NM },
            Vector3D::origin(),
            Arc::new(ConstantMaterial::from_index(2.0)),
        )
        .unwrap();
        let cluster = Cluster::builder()
            .particle(particle)
            .source(PlaneWave::y_polarized().with_amplitude(10.0))
            .medium(ConstantMaterial::from_index(1.33))
            .wavelength(600.0 * NM)
            .lmax(2)
            .build()
            .unwrap();

        let intensity = cluster.source_power_density().unwrap();
        assert!((intensity - 100.0 * 1.33 / (2.0 * crate::utils::constants::Z_0)).abs() < 1e-9 * intensity);

        let spectrum = cluster.source_angular_spectrum(&[(0.0, 0.0), (0.5, 0.0)]).unwrap();
        assert!((spectrum[0][1] - Complex64::new(10.0, 0.0)).norm() < 1e-12);
        assert!(spectrum[0][0].norm() < 1e-12);
        assert_eq!(spectrum[1], [Complex64::new(0.0, 0.0); 2]);
    }
}

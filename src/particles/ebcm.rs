/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Extended boundary condition method for axisymmetric particles
//!
//! For each azimuthal order m the surface integrals
//!
//! Q_{X,Y} = ∮ n̂·(F_Y × ∇×D_X) + ρ n̂·(∇×F_Y × D_X) dS
//!
//! couple interior waves F_Y (wavenumber k₁) to dual waves D_X of the
//! medium, with ρ = μ_b/μ_p. Outgoing duals give Q, regular duals give RgQ
//! and the body-frame T-matrix is T = −RgQ Q⁻¹. The surface is described in
//! spherical coordinates r(θ) and integrated with Gauss–Legendre quadrature
//! split at edges.

use super::errors::{ParticleError, Result};
use super::Shape;
use crate::utils::linear_algebra::LuFactorization;
use crate::utils::math::gauss_legendre_interval;
use crate::vsh::bessel::RadialFunctions;
use crate::vsh::legendre::AngularFunctions;
use crate::vsh::{gamma_n, lmax_to_rmax, mode_index, VshMode, ELECTRIC, MAGNETIC};
use faer::Mat;
use log::debug;
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Orders added to the internal expansion before truncating back to lmax
const EXTRA_ORDERS: usize = 2;

type Vector3 = [Complex64; 3];

/// One quadrature node on the particle surface
#[derive(Debug, Clone, Copy)]
struct SurfacePoint {
    theta: f64,
    /// Quadrature weight including 2π sin θ
    weight: f64,
    r: f64,
    dr: f64,
}

/// Quadrature of the body-frame surface r(θ)
fn surface_points(shape: &Shape, order: usize) -> Result<Vec<SurfacePoint>> {
    let npts = 4 * order + 32;
    let mut points = Vec::new();
    let mut push_segment = |a: f64, b: f64, profile: &dyn Fn(f64) -> (f64, f64)| {
        let (nodes, weights) = gauss_legendre_interval(npts, a, b);
        for (theta, w) in nodes.into_iter().zip(weights) {
            let (r, dr) = profile(theta);
            points.push(SurfacePoint {
                theta,
                weight: 2.0 * PI * w * theta.sin(),
                r,
                dr,
            });
        }
    };

    match *shape {
        Shape::Sphere { radius } => {
            push_segment(0.0, PI, &|_| (radius, 0.0));
        }
        Shape::Spheroid { axial, transverse } => {
            let (a2, c2) = (transverse * transverse, axial * axial);
            let profile = |theta: f64| {
                let (s, c) = theta.sin_cos();
                let r = (s * s / a2 + c * c / c2).powf(-0.5);
                let dr = -r.powi(3) * s * c * (1.0 / a2 - 1.0 / c2);
                (r, dr)
            };
            push_segment(0.0, 0.5 * PI, &profile);
            push_segment(0.5 * PI, PI, &profile);
        }
        Shape::Cylinder { radius, height } => {
            let h2 = 0.5 * height;
            let edge = radius.atan2(h2);
            push_segment(0.0, edge, &|theta: f64| {
                let (s, c) = theta.sin_cos();
                (h2 / c, h2 * s / (c * c))
            });
            push_segment(edge, PI - edge, &|theta: f64| {
                let (s, c) = theta.sin_cos();
                (radius / s, -radius * c / (s * s))
            });
            push_segment(PI - edge, PI, &|theta: f64| {
                let (s, c) = theta.sin_cos();
                (-h2 / c, -h2 * s / (c * c))
            });
        }
    }

    if points.iter().any(|p| !p.r.is_finite() || p.r <= 0.0) {
        return Err(ParticleError::InvalidGeometry(format!(
            "degenerate surface for {:?}",
            shape
        )));
    }
    Ok(points)
}

/// Radial and angular functions at one surface node
struct NodeFunctions {
    point: SurfacePoint,
    angular: AngularFunctions,
    interior: RadialFunctions,
    x_interior: Complex64,
    regular: RadialFunctions,
    outgoing: RadialFunctions,
    x: Complex64,
}

/// M-type wave with e^{imφ} removed; `dual` flips the sign of m
fn m_wave(n: usize, m: i32, z: &RadialFunctions, angular: &AngularFunctions, dual: bool) -> Vector3 {
    let i = Complex64::i();
    let zn = z.values[n] * gamma_n(n);
    let pi = angular.pi(n, m);
    let tau = angular.tau(n, m);
    let sign = if dual { -1.0 } else { 1.0 };
    [Complex64::new(0.0, 0.0), sign * i * zn * pi, -zn * tau]
}

/// N-type wave with e^{imφ} removed; `dual` flips the sign of m
fn n_wave(
    n: usize,
    m: i32,
    z: &RadialFunctions,
    x: Complex64,
    angular: &AngularFunctions,
    dual: bool,
) -> Vector3 {
    let i = Complex64::i();
    let gamma = gamma_n(n);
    let zt = z.riccati[n] * gamma;
    let sign = if dual { -1.0 } else { 1.0 };
    [
        gamma * ((n * (n + 1)) as f64) * z.over_argument(n, x) * angular.p(n, m),
        zt * angular.tau(n, m),
        sign * i * zt * angular.pi(n, m),
    ]
}

/// n̂·(F × G) dS / (sin θ dθ dφ) on the surface r(θ)
fn surface_product(f: &Vector3, g: &Vector3, r: f64, dr: f64) -> Complex64 {
    r * r * (f[1] * g[2] - f[2] * g[1]) - r * dr * (f[2] * g[0] - f[0] * g[2])
}

/// Body-frame T-matrix of an axisymmetric particle, shape `[2 rmax, 2 rmax]`
///
/// # Arguments
///
/// * `shape` - Particle shape with its symmetry axis along body z
/// * `lmax` - Multipole order of the returned T-matrix
/// * `k_b` - Wavenumber of the medium (1/m)
/// * `relative_index` - Particle index divided by medium index
/// * `mu_b`, `mu_p` - Relative permeabilities of medium and particle
pub fn ebcm_tmatrix(
    shape: &Shape,
    lmax: usize,
    k_b: f64,
    relative_index: Complex64,
    mu_b: Complex64,
    mu_p: Complex64,
) -> Result<Array2<Complex64>> {
    shape.validate()?;
    let order = lmax + EXTRA_ORDERS;
    let k = Complex64::new(k_b, 0.0);
    let k1 = relative_index * k_b;
    let rho = mu_b / mu_p;

    let mut nodes = Vec::new();
    for point in surface_points(shape, order)? {
        let x = k * point.r;
        let x_interior = k1 * point.r;
        nodes.push(NodeFunctions {
            point,
            angular: AngularFunctions::new(order, point.theta),
            interior: RadialFunctions::new(VshMode::Interior, order, x_interior)?,
            x_interior,
            regular: RadialFunctions::new(VshMode::Incident, order, x)?,
            outgoing: RadialFunctions::new(VshMode::Outgoing, order, x)?,
            x,
        });
    }
    debug!(
        "EBCM for {:?}: {} surface nodes, internal order {}",
        shape,
        nodes.len(),
        order
    );

    let rmax = lmax_to_rmax(lmax);
    let mut tmatrix = Array2::<Complex64>::zeros((2 * rmax, 2 * rmax));

    let li = lmax as i32;
    for m in -li..=li {
        let n_min = m.unsigned_abs().max(1) as usize;
        let count = order - n_min + 1;
        let size = 2 * count;
        let mut q = Mat::<Complex64>::zeros(size, size);
        let mut rg_q = Mat::<Complex64>::zeros(size, size);

        for node in &nodes {
            let SurfacePoint { weight, r, dr, .. } = node.point;
            let a = &node.angular;

            let mut interior_m = Vec::with_capacity(count);
            let mut interior_n = Vec::with_capacity(count);
            let mut out_m = Vec::with_capacity(count);
            let mut out_n = Vec::with_capacity(count);
            let mut reg_m = Vec::with_capacity(count);
            let mut reg_n = Vec::with_capacity(count);
            for n in n_min..=order {
                interior_m.push(m_wave(n, m, &node.interior, a, false));
                interior_n.push(n_wave(n, m, &node.interior, node.x_interior, a, false));
                out_m.push(m_wave(n, m, &node.outgoing, a, true));
                out_n.push(n_wave(n, m, &node.outgoing, node.x, a, true));
                reg_m.push(m_wave(n, m, &node.regular, a, true));
                reg_n.push(n_wave(n, m, &node.regular, node.x, a, true));
            }

            let j = |f: &Vector3, g: &Vector3| surface_product(f, g, r, dr) * weight;

            for row in 0..count {
                for col in 0..count {
                    let (m1, n1) = (&interior_m[col], &interior_n[col]);
                    let blocks = |dual_m: &Vector3, dual_n: &Vector3| {
                        [
                            k * j(n1, dual_m) + rho * k1 * j(m1, dual_n),
                            k * j(m1, dual_m) + rho * k1 * j(n1, dual_n),
                            k * j(n1, dual_n) + rho * k1 * j(m1, dual_m),
                            k * j(m1, dual_n) + rho * k1 * j(n1, dual_m),
                        ]
                    };
                    let outgoing = blocks(&out_m[row], &out_n[row]);
                    let regular = blocks(&reg_m[row], &reg_n[row]);
                    let slots = [
                        (row, col),
                        (row, count + col),
                        (count + row, col),
                        (count + row, count + col),
                    ];
                    for (s, &(i, jj)) in slots.iter().enumerate() {
                        q[(i, jj)] += outgoing[s];
                        rg_q[(i, jj)] += regular[s];
                    }
                }
            }
        }

        // T Q = −RgQ  ⇔  Qᵀ Tᵀ = −RgQᵀ
        let q_t = Mat::<Complex64>::from_fn(size, size, |i, jj| q[(jj, i)]);
        let rhs = Mat::<Complex64>::from_fn(size, size, |i, jj| -rg_q[(jj, i)]);
        let lu = LuFactorization::new(&q_t).map_err(|e| {
            ParticleError::TmatrixFailed(format!("singular Q matrix at m = {}: {}", m, e))
        })?;
        let t_transposed = lu.solve(&rhs)?;

        let index = |local: usize| -> Option<usize> {
            let (pol, offset) = if local < count {
                (ELECTRIC, local)
            } else {
                (MAGNETIC, local - count)
            };
            let n = n_min + offset;
            (n <= lmax).then(|| pol * rmax + mode_index(n, m))
        };
        for i in 0..size {
            let Some(row) = index(i) else { continue };
            for jj in 0..size {
                let Some(col) = index(jj) else { continue };
                tmatrix[(row, col)] = t_transposed[(jj, i)];
            }
        }
    }

    Ok(tmatrix)
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use gmt_rs::cluster::{Cluster, FieldOptions};
use gmt_rs::geometry::{Quaternion, Vector3D};
use gmt_rs::interactions::{InteractionSolver, SolverMethod};
use gmt_rs::materials::{ConstantMaterial, DrudeMaterial, SharedMaterial};
use gmt_rs::particles::{Particle, Shape};
use gmt_rs::sources::PlaneWave;
use gmt_rs::utils::constants::NM;
use rstest::rstest;
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

fn gold() -> SharedMaterial {
    Arc::new(DrudeMaterial::gold())
}

fn sphere_at(x: f64, y: f64, material: SharedMaterial) -> Particle {
    Particle::new(Shape::Sphere { radius: 40.0 * NM }, Vector3D::new(x, y, 0.0), material).unwrap()
}

fn solve(particles: Vec<Particle>, wave: PlaneWave, solver: InteractionSolver) -> Cluster {
    Cluster::builder()
        .particles(particles)
        .source(wave)
        .wavelength(620.0 * NM)
        .lmax(4)
        .solver(solver)
        .build()
        .unwrap()
}

#[test]
fn test_dimer_is_invariant_under_rotation_about_z() {
    let lu = InteractionSolver::new(SolverMethod::LuDecomposition);
    let along_x = solve(
        vec![sphere_at(-50.0 * NM, 0.0, gold()), sphere_at(50.0 * NM, 0.0, gold())],
        PlaneWave::x_polarized(),
        lu.clone(),
    );
    let along_y = solve(
        vec![sphere_at(0.0, -50.0 * NM, gold()), sphere_at(0.0, 50.0 * NM, gold())],
        PlaneWave::y_polarized(),
        lu,
    );

    let a = along_x.cross_sections().unwrap();
    let b = along_y.cross_sections().unwrap();
    assert_relative_eq!(a.extinction, b.extinction, max_relative = 1e-8);
    assert_relative_eq!(a.absorption, b.absorption, max_relative = 1e-8);
    assert_relative_eq!(a.scattering, b.scattering, max_relative = 1e-8);
}

#[test]
fn test_coupling_vanishes_at_large_separation() {
    let far = 20_000.0 * NM;
    let coupled = solve(
        vec![sphere_at(-far, 0.0, gold()), sphere_at(far, 0.0, gold())],
        PlaneWave::x_polarized(),
        InteractionSolver::default(),
    );
    let single = solve(
        vec![sphere_at(0.0, 0.0, gold())],
        PlaneWave::x_polarized(),
        InteractionSolver::default(),
    );
    let pair = coupled.cross_sections().unwrap();
    let one = single.cross_sections().unwrap();
    assert_relative_eq!(pair.extinction, 2.0 * one.extinction, max_relative = 1e-2);
    assert_relative_eq!(pair.absorption, 2.0 * one.absorption, max_relative = 1e-2);

    let touching = solve(
        vec![sphere_at(-42.0 * NM, 0.0, gold()), sphere_at(42.0 * NM, 0.0, gold())],
        PlaneWave::x_polarized(),
        InteractionSolver::default(),
    );
    let close = touching.cross_sections().unwrap();
    assert!((close.extinction - 2.0 * one.extinction).abs() > 1e-2 * one.extinction);
}

#[rstest]
#[case(SolverMethod::LuDecomposition)]
#[case(SolverMethod::Bicgstab)]
#[case(SolverMethod::IterativeCgs)]
fn test_solvers_agree(#[case] method: SolverMethod) {
    let glass: SharedMaterial = Arc::new(ConstantMaterial::from_index(1.8));
    let particles = vec![
        sphere_at(-60.0 * NM, 0.0, glass.clone()),
        sphere_at(60.0 * NM, 10.0 * NM, glass.clone()),
        sphere_at(0.0, 100.0 * NM, glass),
    ];
    let reference = solve(
        particles.clone(),
        PlaneWave::rhc(),
        InteractionSolver::new(SolverMethod::LuDecomposition),
    );
    let cluster = solve(particles, PlaneWave::rhc(), InteractionSolver::new(method));

    for (p, q) in cluster.p_scat().iter().zip(reference.p_scat()) {
        let scale = q.iter().map(|c| c.norm()).fold(0.0, f64::max);
        for (a, b) in p.iter().zip(q.iter()) {
            assert!((a - b).norm() < 1e-7 * scale);
        }
    }
}

#[test]
fn test_rotated_nanorods_match() {
    let rod = |phi: f64| {
        Particle::new(
            Shape::Cylinder {
                radius: 25.0 * NM,
                height: 90.0 * NM,
            },
            Vector3D::origin(),
            gold(),
        )
        .unwrap()
        .with_orientation(Quaternion::from_spherical_coords(FRAC_PI_2, phi))
    };
    let rod_x = solve(vec![rod(0.0)], PlaneWave::x_polarized(), InteractionSolver::default());
    let rod_y = solve(vec![rod(FRAC_PI_2)], PlaneWave::y_polarized(), InteractionSolver::default());
    let cross_y = solve(vec![rod(FRAC_PI_2)], PlaneWave::x_polarized(), InteractionSolver::default());

    let a = rod_x.cross_sections().unwrap();
    let b = rod_y.cross_sections().unwrap();
    assert_relative_eq!(a.extinction, b.extinction, max_relative = 1e-8);
    assert_relative_eq!(a.absorption, b.absorption, max_relative = 1e-8);

    // light polarized across the rod misses the longitudinal resonance
    let c = cross_y.cross_sections().unwrap();
    assert!((a.extinction - c.extinction).abs() > 1e-3 * a.extinction);
}

#[test]
fn test_total_field_is_source_plus_scattered() {
    let cluster = solve(
        vec![sphere_at(-50.0 * NM, 0.0, gold()), sphere_at(50.0 * NM, 0.0, gold())],
        PlaneWave::x_polarized(),
        InteractionSolver::default(),
    );
    let points = [Vector3D::new(0.0, 0.0, 200.0 * NM), Vector3D::new(0.0, 150.0 * NM, 30.0 * NM)];
    let scattered_only = FieldOptions {
        interior: false,
        source: false,
        mask: false,
        far: false,
    };
    let total = cluster.e_field(&points, FieldOptions::default()).unwrap();
    let scattered = cluster.e_field(&points, scattered_only).unwrap();
    let incident: Vec<_> = points.iter().map(|p| cluster.e_source(p).unwrap()).collect();

    for ((t, s), i) in total.iter().zip(&scattered).zip(&incident) {
        for c in 0..3 {
            assert!((t[c] - s[c] - i[c]).norm() < 1e-12);
        }
    }
}

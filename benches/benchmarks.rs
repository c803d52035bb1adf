/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gmt_rs::cluster::Cluster;
use gmt_rs::geometry::Vector3D;
use gmt_rs::materials::{DrudeMaterial, SharedMaterial};
use gmt_rs::particles::{ebcm_tmatrix, mie_sphere, Particle, Shape};
use gmt_rs::sources::PlaneWave;
use gmt_rs::utils::constants::NM;
use gmt_rs::vsh::translation::vsh_translation;
use gmt_rs::vsh::VshMode;
use num_complex::Complex64;
use std::f64::consts::PI;
use std::sync::Arc;

fn tmatrix_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("T-matrices");
    let k = 2.0 * PI / (600.0 * NM);
    let index = Complex64::new(1.5, 0.01);
    let one = Complex64::new(1.0, 0.0);

    group.bench_function("mie_sphere_lmax10", |b| {
        b.iter(|| black_box(mie_sphere(10, black_box(100.0 * NM), k, index, one, one)))
    });

    let cylinder = Shape::Cylinder {
        radius: 40.0 * NM,
        height: 100.0 * NM,
    };
    group.bench_function("ebcm_cylinder_lmax4", |b| {
        b.iter(|| black_box(ebcm_tmatrix(black_box(&cylinder), 4, k, index, one, one)))
    });

    group.finish();
}

fn translation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Translation");
    let k = 2.0 * PI / (600.0 * NM);
    let displacement = Vector3D::new(120.0 * NM, -40.0 * NM, 75.0 * NM);

    group.bench_function("vsh_translation_lmax6", |b| {
        b.iter(|| black_box(vsh_translation(6, 6, black_box(&displacement), k, VshMode::Incident)))
    });

    group.finish();
}

fn cluster_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cluster");
    group.sample_size(10);
    let gold: SharedMaterial = Arc::new(DrudeMaterial::gold());
    let particles: Vec<Particle> = (0..9)
        .filter_map(|i| {
            let (x, y) = ((i % 3) as f64 - 1.0, (i / 3) as f64 - 1.0);
            Particle::new(
                Shape::Sphere { radius: 40.0 * NM },
                Vector3D::new(x * 120.0 * NM, y * 120.0 * NM, 0.0),
                gold.clone(),
            )
            .ok()
        })
        .collect();

    group.bench_function("solve_3x3_spheres_lmax3", |b| {
        b.iter(|| {
            let cluster = Cluster::builder()
                .particles(particles.clone())
                .source(PlaneWave::x_polarized())
                .wavelength(600.0 * NM)
                .lmax(3)
                .build();
            black_box(cluster.map(|c| c.cross_sections()))
        })
    });

    group.finish();
}

criterion_group!(benches, tmatrix_benchmark, translation_benchmark, cluster_benchmark);
criterion_main!(benches);

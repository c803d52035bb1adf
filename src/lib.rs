/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # gmt-rs
//!
//! Generalized multiparticle Mie theory (GMT) for electromagnetic scattering
//! by clusters of nanoparticles.
//!
//! Each particle is described by a T-matrix in a basis of vector spherical
//! harmonics. The interaction equations couple the particles through VSH
//! translation coefficients; once solved, the cluster gives fields, cross
//! sections, optical forces and torques, and the local density of states.
//!
//! ```no_run
//! use gmt_rs::cluster::Cluster;
//! use gmt_rs::geometry::Vector3D;
//! use gmt_rs::materials::DrudeMaterial;
//! use gmt_rs::particles::{Particle, Shape};
//! use gmt_rs::sources::PlaneWave;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let gold = Arc::new(DrudeMaterial::gold());
//! let dimer = [-60e-9, 60e-9]
//!     .into_iter()
//!     .map(|x| Particle::new(Shape::Sphere { radius: 40e-9 }, Vector3D::new(x, 0.0, 0.0), gold.clone()))
//!     .collect::<Result<Vec<_>, _>>()?;
//! let cluster = Cluster::builder()
//!     .particles(dimer)
//!     .source(PlaneWave::x_polarized())
//!     .wavelength(600e-9)
//!     .lmax(3)
//!     .build()?;
//! println!("{:?}", cluster.cross_sections()?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod cluster;
pub mod geometry;
pub mod input;
pub mod interactions;
pub mod materials;
pub mod particles;
pub mod sources;
pub mod utils;
pub mod vsh;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

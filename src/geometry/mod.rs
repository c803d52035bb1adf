/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Positions, rotations and spherical coordinate frames

pub mod coordinates;
pub mod errors;
pub mod quaternion;
pub mod vector;

pub use coordinates::{
    cart_to_sph, sph_basis_vectors, sph_to_cart, vec_cart_to_sph, vec_sph_to_cart,
    ComplexVector3,
};
pub use errors::{GeometryError, Result};
pub use quaternion::Quaternion;
pub use vector::Vector3D;

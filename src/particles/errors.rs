/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the particles module

use crate::materials::MaterialError;
use crate::utils::UtilsError;
use crate::vsh::VshError;

/// Error types for particle T-matrix calculations
#[derive(Debug, thiserror::Error)]
pub enum ParticleError {
    #[error("Invalid particle geometry: {0}")]
    InvalidGeometry(String),

    #[error("T-matrix calculation failed: {0}")]
    TmatrixFailed(String),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("VSH error: {0}")]
    Vsh(#[from] VshError),

    #[error("Linear algebra error: {0}")]
    LinearAlgebra(#[from] UtilsError),
}

/// Result type for particle operations
pub type Result<T> = std::result::Result<T, ParticleError>;

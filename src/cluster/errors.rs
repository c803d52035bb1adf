/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for cluster calculations

use crate::interactions::InteractionError;
use crate::materials::MaterialError;
use crate::particles::ParticleError;
use crate::sources::SourceError;
use crate::vsh::VshError;
use thiserror::Error;

/// Result type for cluster operations
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors raised while building or solving a cluster
#[derive(Error, Debug)]
pub enum ClusterError {
    /// An option that the solver does not implement
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Missing or invalid builder input
    #[error("Invalid cluster parameter: {0}")]
    InvalidParameter(String),

    /// Particle index past the end of the cluster
    #[error("Particle index {index} out of range for {count} particles")]
    IndexOutOfRange { index: usize, count: usize },

    /// Quantity that is undefined for the current source
    #[error("Not defined: {0}")]
    NotDefined(String),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("Particle error: {0}")]
    Particle(#[from] ParticleError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Interaction error: {0}")]
    Interaction(#[from] InteractionError),

    #[error("VSH error: {0}")]
    Vsh(#[from] VshError),
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the sources module

use crate::geometry::GeometryError;
use crate::vsh::VshError;

/// Error types for incident field sources
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Invalid source parameter: {0}")]
    InvalidParameter(String),

    #[error("Source field is singular: {0}")]
    Singular(String),

    #[error("Not defined for this source: {0}")]
    NotDefined(String),

    #[error("VSH error: {0}")]
    Vsh(#[from] VshError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

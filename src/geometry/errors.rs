/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the geometry module

/// Error types for the geometry module
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Zero-length vector: {0}")]
    ZeroLength(String),

    #[error("Invalid quaternion: {0}")]
    InvalidQuaternion(String),
}

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, GeometryError>;

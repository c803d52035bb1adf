/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the vsh module

/// Error types for vector spherical harmonic operations
#[derive(Debug, thiserror::Error)]
pub enum VshError {
    #[error("Invalid multipole order: {0}")]
    InvalidOrder(String),

    #[error("Singular evaluation: {0}")]
    Singular(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Special function error: {0}")]
    SpecialFunction(String),
}

/// Result type for vsh operations
pub type Result<T> = std::result::Result<T, VshError>;

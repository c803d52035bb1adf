/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the interactions module

use crate::utils::UtilsError;
use crate::vsh::VshError;
use thiserror::Error;

/// Result type for interaction operations
pub type Result<T> = std::result::Result<T, InteractionError>;

/// Errors raised while coupling particles
#[derive(Error, Debug)]
pub enum InteractionError {
    /// Inputs with incompatible shapes
    #[error("Matrix dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An iterative solver did not reach the tolerance
    #[error("Solver failed to converge: {0}")]
    ConvergenceError(String),

    /// An iterative solver broke down
    #[error("Iterative solver failed: {0}")]
    IterationFailed(String),

    /// The interaction matrix cannot be factorised
    #[error("Singular interaction matrix: {0}")]
    SingularMatrix(String),

    /// Error from the translation coefficients
    #[error("VSH error: {0}")]
    Vsh(#[from] VshError),

    /// Error from the linear algebra helpers
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(#[from] UtilsError),
}

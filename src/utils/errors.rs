/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the utils module

use thiserror::Error;

/// Errors that can occur in the utils module
#[derive(Error, Debug)]
pub enum UtilsError {
    /// Generic error with a message
    #[error("Utility error: {0}")]
    Generic(String),

    /// Math-related errors
    #[error("Math error: {0}")]
    Math(String),

    /// Interpolation outside the tabulated range
    #[error("Value {value} outside of tabulated range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// Vectors or matrices with incompatible shapes
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Alias for Math-related errors
pub type MathError = UtilsError;

/// A specialized Result type for utils operations
pub type Result<T> = std::result::Result<T, UtilsError>;

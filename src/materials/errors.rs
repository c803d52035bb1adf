/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the materials module

/// Error types for material evaluation
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("Wavelength {wavelength:.4e} m is outside the tabulated range [{min:.4e}, {max:.4e}] m")]
    OutOfRange { wavelength: f64, min: f64, max: f64 },

    #[error("Invalid material table: {0}")]
    InvalidTable(String),

    #[error("The surrounding medium must be non-absorbing: {0}")]
    AbsorbingMedium(String),

    #[error("Invalid material parameter: {0}")]
    InvalidParameter(String),

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
}

/// Result type for material operations
pub type Result<T> = std::result::Result<T, MaterialError>;

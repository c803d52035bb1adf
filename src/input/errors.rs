/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for job files

use crate::geometry::GeometryError;
use crate::materials::MaterialError;
use crate::particles::ParticleError;
use crate::sources::SourceError;
use std::io;
use thiserror::Error;

/// Errors that can occur while reading or preparing a job
#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid job: {0}")]
    Invalid(String),

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("Particle error: {0}")]
    Particle(#[from] ParticleError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

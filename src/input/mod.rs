/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Job file handling
//!
//! Reads JSON job files describing a cluster, its source and a wavelength
//! sweep, and converts them into ready-to-solve [`Job`]s.

pub mod config;
pub mod errors;

pub use config::{
    load_config, Job, JobConfig, MaterialSpec, OrientationSpec, OriginSpec, OutputConfig, ParticleSpec,
    PolarizationSpec, SolverSpec, SourceSpec, WavelengthSpec,
};
pub use errors::{InputError, Result};

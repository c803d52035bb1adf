/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Physical constants (SI)

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Vacuum permittivity (F/m)
pub const EPSILON_0: f64 = 8.854_187_812_8e-12;

/// Vacuum permeability (H/m)
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// Impedance of free space (Ohm)
pub const Z_0: f64 = 376.730_313_668;

/// One nanometre in metres
pub const NM: f64 = 1e-9;

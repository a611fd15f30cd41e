//! Solid mechanics functionality for `fedyn`.
//!
//! Provides hyperelastic constitutive models and a linear tetrahedral element built on the
//! generic element contract of `fedyn`.
pub mod materials;

mod tetrahedron;

pub use tetrahedron::*;

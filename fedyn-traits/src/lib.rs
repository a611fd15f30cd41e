//! Scalar and allocator traits shared by the `fedyn` crates.
//!
//! Element buffers in `fedyn` are fixed-size `nalgebra` types whose sizes come from an element's
//! node and dof dimensions. This crate holds the trait bounds that generic element code has to
//! restate for such buffers, so that the root crate and element crates agree on them.
use nalgebra::RealField;

pub use nalgebra;

/// The scalar type of element computations.
///
/// Elements pass scalars around by value (scales, tangent weights, damping coefficients), hence
/// the `Copy` requirement on top of [`RealField`]. `f32` and `f64` both qualify.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

pub mod allocators;

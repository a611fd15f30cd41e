//! Per-element kernels for implicit finite element elastodynamics.
//!
//! The central piece is [`FemElement`](element::FemElement), a generic element base that
//! implements residual, stiffness, mass, damping, tangent and external force evaluation once,
//! on top of the physics-specific hooks of a concrete element type
//! (see [`FemElementKernel`](element::FemElementKernel)). Dispatch to the concrete element is
//! resolved at compile time, and all local buffers are fixed-size `nalgebra` types, so
//! evaluating an element never allocates.
pub mod allocators;
pub mod constitutive;
pub mod damping;
pub mod element;
pub mod index;
pub mod parallel;
pub mod state;

pub extern crate nalgebra;

pub use fedyn_traits::Real;

//! Parallel evaluation of many independent elements.
//!
//! Every element reads the shared state and writes only to its own output, so evaluations of
//! different elements can run concurrently without locking. The helpers here evaluate a slice
//! of elements with `rayon` and leave the outputs element-local; accumulating them into global
//! operators is up to the caller.
use crate::allocators::FemElementAllocator;
use crate::element::{ElementMatrix, ElementVector, FemElement, FemElementKernel};
use crate::state::FemState;
use nalgebra::{DefaultAllocator, Vector3};
use rayon::prelude::*;

/// Computes the data of every element for the given state.
pub fn compute_data_par<E>(elements: &[FemElement<E>], state: &FemState<E::T>) -> Vec<E::Data>
where
    E: FemElementKernel,
    E::Data: Send,
    FemElement<E>: Sync,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    elements
        .par_iter()
        .map(|element| element.compute_data(state))
        .collect()
}

/// Calculates the residual of every element, overwriting `residuals`.
///
/// # Panics
///
/// Panics if `data` or `residuals` do not have one entry per element.
pub fn calc_residuals_par<E>(elements: &[FemElement<E>], data: &[E::Data], residuals: &mut [ElementVector<E>])
where
    E: FemElementKernel,
    E::Data: Sync,
    ElementVector<E>: Send,
    FemElement<E>: Sync,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    assert_eq!(elements.len(), data.len(), "need one data entry per element");
    assert_eq!(elements.len(), residuals.len(), "need one residual per element");
    residuals
        .par_iter_mut()
        .zip(elements)
        .zip(data)
        .for_each(|((residual, element), data)| element.calc_residual(data, residual));
}

/// Calculates the tangent matrix of every element with the same weights, overwriting `tangents`.
///
/// # Panics
///
/// Panics if `data` or `tangents` do not have one entry per element.
pub fn calc_tangent_matrices_par<E>(
    elements: &[FemElement<E>],
    data: &[E::Data],
    weights: &Vector3<E::T>,
    tangents: &mut [ElementMatrix<E>],
) where
    E: FemElementKernel,
    E::Data: Sync,
    ElementMatrix<E>: Send,
    FemElement<E>: Sync,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    assert_eq!(elements.len(), data.len(), "need one data entry per element");
    assert_eq!(elements.len(), tangents.len(), "need one tangent matrix per element");
    tangents
        .par_iter_mut()
        .zip(elements)
        .zip(data)
        .for_each(|((tangent, element), data)| element.calc_tangent_matrix(data, weights, tangent));
}

/// Adds `scale` times the external force of every element into `forces`.
///
/// # Panics
///
/// Panics if `data` or `forces` do not have one entry per element.
pub fn add_scaled_external_forces_par<E>(
    elements: &[FemElement<E>],
    data: &[E::Data],
    scale: E::T,
    forces: &mut [ElementVector<E>],
) where
    E: FemElementKernel,
    E::Data: Sync,
    ElementVector<E>: Send,
    FemElement<E>: Sync,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    assert_eq!(elements.len(), data.len(), "need one data entry per element");
    assert_eq!(elements.len(), forces.len(), "need one force vector per element");
    forces
        .par_iter_mut()
        .zip(elements)
        .zip(data)
        .for_each(|((force, element), data)| element.add_scaled_external_force(data, scale, force));
}

//! Helper traits for allocator trait bounds.
//!
//! Element buffers are sized by type-level dimensions, so generic element code has to state
//! which buffers `DefaultAllocator` must be able to produce. For `nalgebra`'s `Const`
//! dimensions these bounds are always satisfied and every buffer lives on the stack.
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Scalar, U1};

/// An allocator for vectors and square matrices of a single dimension.
pub trait DimAllocator<T: Scalar, D: DimName>: Allocator<T, D> + Allocator<T, D, D> + Allocator<T, U1, D> {}

impl<T, D> DimAllocator<T, D> for DefaultAllocator
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D> + Allocator<T, D, D> + Allocator<T, U1, D>,
{
}

/// An allocator for the local buffers of an element with `NodalDim` nodes and `DofDim` degrees
/// of freedom.
///
/// Covers nodal vectors, dof vectors, dof-by-dof matrices and the `3 x NodalDim` matrices
/// used to hold per-node positions or shape function gradients column by column.
pub trait ElementBufferAllocator<T: Scalar, NodalDim: DimName, DofDim: DimName>:
    DimAllocator<T, DofDim> + Allocator<T, NodalDim> + Allocator<T, nalgebra::U3, NodalDim>
{
}

impl<T, NodalDim, DofDim> ElementBufferAllocator<T, NodalDim, DofDim> for DefaultAllocator
where
    T: Scalar,
    NodalDim: DimName,
    DofDim: DimName,
    DefaultAllocator: DimAllocator<T, DofDim> + Allocator<T, NodalDim> + Allocator<T, nalgebra::U3, NodalDim>,
{
}

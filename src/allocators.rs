//! Helper traits for allocator trait bounds.
use crate::index::FemNodeIndex;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Scalar};

/// Allocator bounds needed by [`FemElement`](crate::element::FemElement) for an element with
/// `NodalDim` nodes and `DofDim` degrees of freedom.
pub trait FemElementAllocator<T, NodalDim, DofDim>:
    ElementBufferAllocator<T, NodalDim, DofDim> + Allocator<FemNodeIndex, NodalDim>
where
    T: Scalar,
    NodalDim: DimName,
    DofDim: DimName,
{
}

impl<T, NodalDim, DofDim> FemElementAllocator<T, NodalDim, DofDim> for DefaultAllocator
where
    T: Scalar,
    NodalDim: DimName,
    DofDim: DimName,
    DefaultAllocator: ElementBufferAllocator<T, NodalDim, DofDim> + Allocator<FemNodeIndex, NodalDim>,
{
}

pub use fedyn_traits::allocators::*;

//! Type-safe indices for elements and nodes within a model.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// The index of an element within its model.
///
/// An index is valid by construction: there is no "invalid" sentinel value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FemElementIndex(usize);

/// The index of a node within its model.
///
/// The degrees of freedom of node `i` occupy the entries `3 * i .. 3 * i + 3` of the
/// generalized coordinate vectors of a [`FemState`](crate::state::FemState).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FemNodeIndex(usize);

macro_rules! impl_index {
    ($index:ident, $label:literal) => {
        impl $index {
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            pub const fn index(&self) -> usize {
                self.0
            }
        }

        impl From<usize> for $index {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$index> for usize {
            fn from(index: $index) -> Self {
                index.0
            }
        }

        impl Display for $index {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

impl_index!(FemElementIndex, "FemElementIndex");
impl_index!(FemNodeIndex, "FemNodeIndex");

impl FemNodeIndex {
    /// The first entry of this node's block in a global dof vector.
    ///
    /// Only meaningful for nodes whose block fits in `usize`, see [`dof_end`](Self::dof_end).
    pub const fn first_dof(&self) -> usize {
        3 * self.0
    }

    /// One past the last entry of this node's block in a global dof vector, or `None` if the
    /// block cannot be addressed with `usize`.
    pub fn dof_end(&self) -> Option<usize> {
        self.0.checked_mul(3)?.checked_add(3)
    }
}

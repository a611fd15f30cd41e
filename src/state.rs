//! The global state of a discretized body.
use crate::Real;
use eyre::ensure;
use log::debug;
use nalgebra::{DVector, DVectorView};

/// Generalized positions, velocities and accelerations of all nodes of a model.
///
/// All three vectors share the same global dof numbering: node `i` owns the entries
/// `3 * i .. 3 * i + 3`. Elements only ever read from a state.
#[derive(Debug, Clone, PartialEq)]
pub struct FemState<T: Real> {
    q: DVector<T>,
    v: DVector<T>,
    a: DVector<T>,
}

impl<T: Real> FemState<T> {
    /// Creates a state from positions, velocities and accelerations.
    ///
    /// Fails if the three vectors do not have the same length, or if the length is not
    /// a multiple of three.
    pub fn new(q: DVector<T>, v: DVector<T>, a: DVector<T>) -> eyre::Result<Self> {
        ensure!(
            q.len() == v.len() && q.len() == a.len(),
            "positions, velocities and accelerations must have the same length (got {}, {} and {})",
            q.len(),
            v.len(),
            a.len()
        );
        ensure!(
            q.len() % 3 == 0,
            "the number of dofs must be a multiple of 3 (got {})",
            q.len()
        );
        debug!("Created FEM state with {} nodes", q.len() / 3);
        Ok(Self { q, v, a })
    }

    /// Creates a state at rest at the given positions.
    pub fn from_positions(q: DVector<T>) -> eyre::Result<Self> {
        let n = q.len();
        Self::new(q, DVector::zeros(n), DVector::zeros(n))
    }

    pub fn num_dofs(&self) -> usize {
        self.q.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.q.len() / 3
    }

    pub fn positions(&self) -> DVectorView<'_, T> {
        DVectorView::from(&self.q)
    }

    pub fn velocities(&self) -> DVectorView<'_, T> {
        DVectorView::from(&self.v)
    }

    pub fn accelerations(&self) -> DVectorView<'_, T> {
        DVectorView::from(&self.a)
    }

    pub fn set_positions(&mut self, q: DVector<T>) -> eyre::Result<()> {
        self.ensure_num_dofs(q.len(), "positions")?;
        self.q = q;
        Ok(())
    }

    pub fn set_velocities(&mut self, v: DVector<T>) -> eyre::Result<()> {
        self.ensure_num_dofs(v.len(), "velocities")?;
        self.v = v;
        Ok(())
    }

    pub fn set_accelerations(&mut self, a: DVector<T>) -> eyre::Result<()> {
        self.ensure_num_dofs(a.len(), "accelerations")?;
        self.a = a;
        Ok(())
    }

    fn ensure_num_dofs(&self, len: usize, what: &str) -> eyre::Result<()> {
        ensure!(
            len == self.num_dofs(),
            "new {} have length {}, but the state has {} dofs",
            what,
            len,
            self.num_dofs()
        );
        Ok(())
    }
}

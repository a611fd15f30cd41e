//! The interface between elements and the stress-strain law of their material.
use crate::Real;
use nalgebra::{Matrix3, Vector3};

/// A hyperelastic stress-strain law in three dimensions.
///
/// Elements own their constitutive model by value and only ever query it, so implementations
/// typically carry their material parameters directly.
pub trait ConstitutiveModel<T: Real> {
    /// Compute the energy density $\psi = \psi(\vec F)$.
    fn compute_energy_density(&self, deformation_gradient: &Matrix3<T>) -> T;

    /// Compute the First Piola-Kirchhoff stress tensor $\vec P = \vec P(\vec F)$.
    fn compute_stress_tensor(&self, deformation_gradient: &Matrix3<T>) -> Matrix3<T>;

    /// Compute the stress contraction operator $\mathcal{C}_{\vec P}(\vec F, \vec a, \vec b)$.
    ///
    /// The contraction operator is defined by
    /// $$
    /// \mathcal{C}\_{\vec P} (\vec F, \vec a, \vec b)
    ///     := a_k \pd{P_{ik}}{F_{jm}} (\vec F) \\, b_m \enspace \vec e_i \otimes \vec e_j.
    /// $$
    /// With $\vec a = \nabla N_I$ and $\vec b = \nabla N_J$ this is the $(I, J)$ block of the
    /// element stiffness matrix per unit reference volume.
    fn compute_stress_contraction(
        &self,
        deformation_gradient: &Matrix3<T>,
        a: &Vector3<T>,
        b: &Vector3<T>,
    ) -> Matrix3<T>;
}

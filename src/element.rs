//! The element contract and the generic element base.
//!
//! A concrete element type describes itself through [`FemElementTraits`] and supplies its
//! physics through [`FemElementKernel`]. [`FemElement`] then provides residual, stiffness,
//! mass, damping, tangent and external force evaluation for that type. Everything is resolved
//! statically, and all local buffers are fixed-size `nalgebra` types sized by the element's
//! dimensions, so no evaluation allocates.
//!
//! A typical evaluation of one element within one Newton iteration computes the data once and
//! shares it between all subsequent calls, which keeps residual and tangent consistent:
//!
//! ```ignore
//! let data = element.compute_data(&state);
//! element.calc_residual(&data, &mut residual);
//! element.calc_tangent_matrix(&data, &weights, &mut tangent);
//! ```
use crate::allocators::FemElementAllocator;
use crate::damping::DampingModel;
use crate::index::{FemElementIndex, FemNodeIndex};
use crate::state::FemState;
use crate::Real;
use log::trace;
use nalgebra::{convert, DVectorView, DefaultAllocator, DimName, OMatrix, OVector, Vector3};
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// A local vector with one entry per degree of freedom of the element `E`.
pub type ElementVector<E> = OVector<<E as FemElementTraits>::T, <E as FemElementTraits>::DofDim>;

/// A local square matrix with one row and column per degree of freedom of the element `E`.
pub type ElementMatrix<E> =
    OMatrix<<E as FemElementTraits>::T, <E as FemElementTraits>::DofDim, <E as FemElementTraits>::DofDim>;

/// The global node indices of the nodes of the element `E`, in local node order.
pub type NodeIndices<E> = OVector<FemNodeIndex, <E as FemElementTraits>::NodalDim>;

/// Compile-time description of a concrete element type.
///
/// The number of degrees of freedom must be three times the number of nodes, since every node
/// carries exactly three translational dofs. This is checked when an element of the type is
/// constructed, and a violation is a compile-time error.
pub trait FemElementTraits: Sized {
    /// The scalar type.
    type T: Real;
    /// Per-element, state-dependent data computed once per evaluation.
    type Data: Default;
    /// The stress-strain law used by the element.
    type ConstitutiveModel;
    /// The number of nodes, as a type-level dimension.
    type NodalDim: DimName;
    /// The number of degrees of freedom, as a type-level dimension.
    type DofDim: DimName;

    /// The number of quadrature points in each element.
    const NUM_QUADRATURE_POINTS: usize;
    /// The dimension of the reference domain of the element.
    const NUM_NATURAL_DIMENSION: usize;
}

/// The physics-specific hooks of a concrete element type.
///
/// The hooks are associated functions that receive the [`FemElement`] being evaluated, so that
/// they can read its node indices, constitutive model and other fields alongside the
/// per-element constants stored in the concrete type itself (see [`FemElement::kernel`]).
/// Callers go through the corresponding methods on [`FemElement`], which uphold the buffer
/// contracts documented on each hook.
///
/// Data computation, residual, stiffness and mass are required. A type that leaves one of them
/// out is rejected by the compiler with an error that names both the missing hook and the
/// type:
///
/// ```compile_fail,E0046
/// use fedyn::element::{FemElement, FemElementKernel, FemElementTraits};
/// use fedyn::nalgebra::{U2, U6};
///
/// struct IncompleteElement;
///
/// impl FemElementTraits for IncompleteElement {
///     type T = f64;
///     type Data = ();
///     type ConstitutiveModel = ();
///     type NodalDim = U2;
///     type DofDim = U6;
///     const NUM_QUADRATURE_POINTS: usize = 1;
///     const NUM_NATURAL_DIMENSION: usize = 1;
/// }
///
/// impl FemElementKernel for IncompleteElement {}
/// ```
pub trait FemElementKernel: FemElementTraits
where
    DefaultAllocator: FemElementAllocator<Self::T, Self::NodalDim, Self::DofDim>,
{
    /// Computes the per-element data for the given state.
    fn compute_data(element: &FemElement<Self>, state: &FemState<Self::T>) -> Self::Data;

    /// Accumulates the element residual into `residual`.
    ///
    /// The residual is $\vec M \vec a - \vec f_e(\vec x) - \vec f_v(\vec x, \vec v) - \vec f_{ext}$,
    /// where $\vec f_e$ is the elastic force, $\vec f_v$ the damping force and
    /// $\vec f_{ext}$ the external force. `residual` is zero on entry.
    fn calc_residual(element: &FemElement<Self>, data: &Self::Data, residual: &mut ElementVector<Self>);

    /// Adds `scale` times the stiffness matrix into `stiffness`.
    fn add_scaled_stiffness_matrix(
        element: &FemElement<Self>,
        data: &Self::Data,
        scale: Self::T,
        stiffness: &mut ElementMatrix<Self>,
    );

    /// Adds `scale` times the mass matrix into `mass`.
    fn add_scaled_mass_matrix(
        element: &FemElement<Self>,
        data: &Self::Data,
        scale: Self::T,
        mass: &mut ElementMatrix<Self>,
    );

    /// Adds `scale` times any *non-gravity* external force specific to the element.
    ///
    /// Does nothing by default.
    fn add_scaled_external_force(
        element: &FemElement<Self>,
        data: &Self::Data,
        scale: Self::T,
        force: &mut ElementVector<Self>,
    ) {
        let _ = (element, data, scale, force);
    }

    /// Adds `scale` times the gravity force on the nodes of the element.
    ///
    /// The default is the consistent load computed from the full mass matrix, see
    /// [`add_scaled_consistent_gravity_force`]. Elements with a cheaper closed form may
    /// override it.
    fn add_scaled_gravity_force(
        element: &FemElement<Self>,
        data: &Self::Data,
        scale: Self::T,
        force: &mut ElementVector<Self>,
    ) {
        add_scaled_consistent_gravity_force(element, data, scale, force);
    }
}

/// Adds the consistent gravity load `scale * M * g` into `force`.
///
/// Here `M` is the element mass matrix and `g` is the element's gravity vector stacked once per
/// node. The full mass matrix is evaluated, which is quadratic in the number of dofs.
pub fn add_scaled_consistent_gravity_force<E>(
    element: &FemElement<E>,
    data: &E::Data,
    scale: E::T,
    force: &mut ElementVector<E>,
) where
    E: FemElementKernel,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    let mut mass_matrix = ElementMatrix::<E>::zeros();
    element.add_scaled_mass_matrix(data, nalgebra::one::<E::T>(), &mut mass_matrix);
    let mut stacked_gravity = ElementVector::<E>::zeros();
    for i in 0..E::NodalDim::dim() {
        stacked_gravity
            .fixed_rows_mut::<3>(3 * i)
            .copy_from(element.gravity_vector());
    }
    force.gemv(scale, &mass_matrix, &stacked_gravity, nalgebra::one::<E::T>());
}

/// The gravitational acceleration elements start out with, $(0, 0, -9.81)$.
pub fn default_gravity<T: Real>() -> Vector3<T> {
    Vector3::new(T::zero(), T::zero(), convert(-9.81))
}

struct DofLayout<NodalDim, DofDim>(PhantomData<(NodalDim, DofDim)>);

impl<NodalDim: DimName, DofDim: DimName> DofLayout<NodalDim, DofDim> {
    const VALID: () = assert!(
        DofDim::USIZE == 3 * NodalDim::USIZE,
        "an element must have exactly three degrees of freedom per node"
    );
}

/// Extracts the dofs of the given nodes from a global dof vector.
///
/// For local node `i`, the block `3 * n .. 3 * n + 3` of `state_dofs` with
/// `n = node_indices[i]` is copied to the entries `3 * i .. 3 * i + 3` of the result.
///
/// # Panics
///
/// Panics if the block of any node lies outside of `state_dofs`.
pub fn extract_element_dofs<'a, T, NodalDim, DofDim>(
    node_indices: &OVector<FemNodeIndex, NodalDim>,
    state_dofs: impl Into<DVectorView<'a, T>>,
) -> OVector<T, DofDim>
where
    T: Real,
    NodalDim: DimName,
    DofDim: DimName,
    DefaultAllocator: FemElementAllocator<T, NodalDim, DofDim>,
{
    let () = DofLayout::<NodalDim, DofDim>::VALID;
    let state_dofs = state_dofs.into();
    let mut element_dofs = OVector::<T, DofDim>::zeros();
    for (i, node) in node_indices.iter().enumerate() {
        assert!(
            node.dof_end().map_or(false, |end| end <= state_dofs.len()),
            "dofs of node {} are out of bounds for a dof vector of length {}",
            node.index(),
            state_dofs.len()
        );
        let first = node.first_dof();
        element_dofs
            .fixed_rows_mut::<3>(3 * i)
            .copy_from(&state_dofs.fixed_rows::<3>(first));
    }
    element_dofs
}

/// A single element of a discretized body.
///
/// `FemElement` holds the data common to all element types and implements the assembly
/// operations generically, dispatching to the concrete element type `E` only for the hooks of
/// [`FemElementKernel`]. Elements are move-only: they can be stored in a `Vec`, but never
/// duplicated.
///
/// The operations fall into two groups with different buffer contracts:
///
/// - [`calc_residual`](Self::calc_residual) and [`calc_tangent_matrix`](Self::calc_tangent_matrix)
///   overwrite their output.
/// - The `add_scaled_*` operations only add into their output. Callers that want the plain
///   quantity have to zero the buffer first.
pub struct FemElement<E>
where
    E: FemElementTraits,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    element_index: FemElementIndex,
    node_indices: NodeIndices<E>,
    constitutive_model: E::ConstitutiveModel,
    damping_model: DampingModel<E::T>,
    gravity: Vector3<E::T>,
    kernel: E,
}

impl<E> FemElement<E>
where
    E: FemElementTraits,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    /// Creates an element with the default gravity $(0, 0, -9.81)$.
    ///
    /// The order of `node_indices` must match the local node numbering of `E`.
    pub fn new(
        element_index: FemElementIndex,
        node_indices: NodeIndices<E>,
        constitutive_model: E::ConstitutiveModel,
        damping_model: DampingModel<E::T>,
        kernel: E,
    ) -> Self {
        let () = DofLayout::<E::NodalDim, E::DofDim>::VALID;
        trace!(
            "Creating element {} with nodes {:?}",
            element_index,
            node_indices.as_slice()
        );
        Self {
            element_index,
            node_indices,
            constitutive_model,
            damping_model,
            gravity: default_gravity(),
            kernel,
        }
    }

    pub fn num_nodes() -> usize {
        E::NodalDim::dim()
    }

    pub fn num_dofs() -> usize {
        E::DofDim::dim()
    }

    pub fn num_quadrature_points() -> usize {
        E::NUM_QUADRATURE_POINTS
    }

    pub fn num_natural_dimension() -> usize {
        E::NUM_NATURAL_DIMENSION
    }

    /// The index of this element within the model.
    pub fn element_index(&self) -> FemElementIndex {
        self.element_index
    }

    /// Indices of the nodes of this element within the model.
    pub fn node_indices(&self) -> &NodeIndices<E> {
        &self.node_indices
    }

    pub fn constitutive_model(&self) -> &E::ConstitutiveModel {
        &self.constitutive_model
    }

    pub fn damping_model(&self) -> &DampingModel<E::T> {
        &self.damping_model
    }

    /// The concrete element, holding its per-element constants.
    pub fn kernel(&self) -> &E {
        &self.kernel
    }

    pub fn gravity_vector(&self) -> &Vector3<E::T> {
        &self.gravity
    }

    pub fn set_gravity_vector(&mut self, gravity: Vector3<E::T>) {
        self.gravity = gravity;
    }

    /// Extracts the dofs of the nodes of this element from the given global dof vector.
    ///
    /// See [`extract_element_dofs`].
    pub fn extract_element_dofs<'a>(&self, state_dofs: impl Into<DVectorView<'a, E::T>>) -> ElementVector<E> {
        extract_element_dofs(&self.node_indices, state_dofs)
    }
}

impl<E> FemElement<E>
where
    E: FemElementKernel,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    /// Computes the per-element data associated with the given state.
    pub fn compute_data(&self, state: &FemState<E::T>) -> E::Data {
        E::compute_data(self, state)
    }

    /// Calculates the element residual $\vec M \vec a - \vec f_e - \vec f_v - \vec f_{ext}$.
    ///
    /// All values in `residual` are overwritten.
    pub fn calc_residual(&self, data: &E::Data, residual: &mut ElementVector<E>) {
        residual.fill(nalgebra::zero::<E::T>());
        E::calc_residual(self, data, residual);
    }

    /// Adds `scale` times the stiffness matrix (the derivative of the residual with respect to
    /// the positions) into `stiffness`.
    pub fn add_scaled_stiffness_matrix(&self, data: &E::Data, scale: E::T, stiffness: &mut ElementMatrix<E>) {
        E::add_scaled_stiffness_matrix(self, data, scale, stiffness);
    }

    /// Adds `scale` times the mass matrix (the derivative of the residual with respect to
    /// the accelerations) into `mass`.
    pub fn add_scaled_mass_matrix(&self, data: &E::Data, scale: E::T, mass: &mut ElementMatrix<E>) {
        E::add_scaled_mass_matrix(self, data, scale, mass);
    }

    /// Adds `scale` times the damping matrix $\vec D = \alpha \vec M + \beta \vec K$ into
    /// `damping`.
    ///
    /// Both the mass and the stiffness matrix are recomputed, which may be expensive.
    pub fn add_scaled_damping_matrix(&self, data: &E::Data, scale: E::T, damping: &mut ElementMatrix<E>) {
        let alpha = self.damping_model.mass_coeff_alpha();
        let beta = self.damping_model.stiffness_coeff_beta();
        self.add_scaled_mass_matrix(data, scale * alpha, damping);
        self.add_scaled_stiffness_matrix(data, scale * beta, damping);
    }

    /// Calculates the tangent matrix $w_0 \vec K + w_1 \vec D + w_2 \vec M$ for the weights
    /// $(w_0, w_1, w_2)$.
    ///
    /// The damping matrix is never formed. Instead the Rayleigh form of $\vec D$ is folded into
    /// the weights, giving $(w_0 + w_1 \beta) \vec K + (w_2 + w_1 \alpha) \vec M$.
    /// All values in `tangent` are overwritten.
    pub fn calc_tangent_matrix(&self, data: &E::Data, weights: &Vector3<E::T>, tangent: &mut ElementMatrix<E>) {
        tangent.fill(nalgebra::zero::<E::T>());
        let alpha = self.damping_model.mass_coeff_alpha();
        let beta = self.damping_model.stiffness_coeff_beta();
        self.add_scaled_stiffness_matrix(data, weights[0] + weights[1] * beta, tangent);
        self.add_scaled_mass_matrix(data, weights[2] + weights[1] * alpha, tangent);
    }

    /// Adds `scale` times the total external force on the element into `force`.
    ///
    /// Gravity is always included, followed by any force specific to the element type.
    pub fn add_scaled_external_force(&self, data: &E::Data, scale: E::T, force: &mut ElementVector<E>) {
        E::add_scaled_gravity_force(self, data, scale, force);
        E::add_scaled_external_force(self, data, scale, force);
    }
}

impl<E> Debug for FemElement<E>
where
    E: FemElementTraits + Debug,
    E::ConstitutiveModel: Debug,
    DefaultAllocator: FemElementAllocator<E::T, E::NodalDim, E::DofDim>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FemElement")
            .field("element_index", &self.element_index)
            .field("node_indices", &self.node_indices.as_slice())
            .field("constitutive_model", &self.constitutive_model)
            .field("damping_model", &self.damping_model)
            .field("gravity", &self.gravity)
            .field("kernel", &self.kernel)
            .finish()
    }
}

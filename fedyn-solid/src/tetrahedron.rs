use eyre::{ensure, eyre};
use fedyn::constitutive::ConstitutiveModel;
use fedyn::damping::DampingModel;
use fedyn::element::{
    extract_element_dofs, ElementMatrix, ElementVector, FemElement, FemElementKernel, FemElementTraits, NodeIndices,
};
use fedyn::index::{FemElementIndex, FemNodeIndex};
use fedyn::nalgebra::{DVectorView, Matrix3, Matrix3x4, Point3, SVector, Vector3, U12, U4};
use fedyn::state::FemState;
use fedyn::Real;
use itertools::iproduct;
use log::warn;
use numeric_literals::replace_float_literals;
use std::marker::PhantomData;

/// A linear (4-node) tetrahedral element for three-dimensional elasticity.
///
/// The element uses a single quadrature point at the centroid, which integrates the
/// (constant) deformation gradient exactly. Node ordering follows the reference tetrahedron
/// with vertices $(0, 0, 0)$, $(1, 0, 0)$, $(0, 1, 0)$ and $(0, 0, 1)$.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTetrahedron<T, M>
where
    T: Real,
{
    // Column I is the gradient of basis function I with respect to the reference positions.
    shape_gradients: Matrix3x4<T>,
    reference_volume: T,
    density: T,
    marker: PhantomData<M>,
}

/// State-dependent data of a [`LinearTetrahedron`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTetrahedronData<T: Real> {
    pub element_q: SVector<T, 12>,
    pub element_v: SVector<T, 12>,
    pub element_a: SVector<T, 12>,
    pub deformation_gradient: Matrix3<T>,
    pub first_piola_stress: Matrix3<T>,
}

impl<T: Real> Default for LinearTetrahedronData<T> {
    fn default() -> Self {
        Self {
            element_q: SVector::zeros(),
            element_v: SVector::zeros(),
            element_a: SVector::zeros(),
            deformation_gradient: Matrix3::zeros(),
            first_piola_stress: Matrix3::zeros(),
        }
    }
}

impl<T, M> LinearTetrahedron<T, M>
where
    T: Real,
    M: ConstitutiveModel<T>,
{
    /// Creates the element constants from the reference positions of its four vertices.
    ///
    /// Fails if the density is not positive or the tetrahedron is degenerate. An inverted
    /// vertex ordering is accepted, but logged.
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    pub fn from_reference_positions(vertices: &[Point3<T>; 4], density: T) -> eyre::Result<Self> {
        ensure!(density > T::zero(), "density must be positive, got {}", density);
        let [x0, x1, x2, x3] = vertices;
        let dm = Matrix3::from_columns(&[x1 - x0, x2 - x0, x3 - x0]);
        let det = dm.determinant();
        let dm_inv = dm
            .try_inverse()
            .ok_or_else(|| eyre!("cannot create a tetrahedron from degenerate reference positions"))?;
        let signed_volume = det / 6.0;
        ensure!(
            signed_volume != T::zero(),
            "cannot create a tetrahedron with zero reference volume"
        );
        if signed_volume < 0.0 {
            warn!(
                "Tetrahedron has inverted vertex ordering (signed reference volume {})",
                signed_volume
            );
        }

        #[rustfmt::skip]
        let reference_gradients = Matrix3x4::new(
            -1.0, 1.0, 0.0, 0.0,
            -1.0, 0.0, 1.0, 0.0,
            -1.0, 0.0, 0.0, 1.0);

        Ok(Self {
            shape_gradients: dm_inv.transpose() * reference_gradients,
            reference_volume: signed_volume.abs(),
            density,
            marker: PhantomData,
        })
    }

    /// Builds a complete element, reading its reference positions from the global reference
    /// position vector of the model.
    pub fn build_element<'a>(
        element_index: FemElementIndex,
        node_indices: [FemNodeIndex; 4],
        reference_positions: impl Into<DVectorView<'a, T>>,
        constitutive_model: M,
        damping_model: DampingModel<T>,
        density: T,
    ) -> eyre::Result<FemElement<Self>> {
        let reference_positions = reference_positions.into();
        for node in &node_indices {
            ensure!(
                node.dof_end().map_or(false, |end| end <= reference_positions.len()),
                "node {} of element {} has no reference position",
                node.index(),
                element_index
            );
        }
        let node_indices = NodeIndices::<Self>::from(node_indices);
        let element_q: SVector<T, 12> = extract_element_dofs(&node_indices, reference_positions);
        let vertices = [0, 1, 2, 3].map(|i| Point3::from(element_q.fixed_rows::<3>(3 * i).into_owned()));
        let kernel = Self::from_reference_positions(&vertices, density)?;
        Ok(FemElement::new(
            element_index,
            node_indices,
            constitutive_model,
            damping_model,
            kernel,
        ))
    }

    pub fn reference_volume(&self) -> T {
        self.reference_volume
    }

    pub fn density(&self) -> T {
        self.density
    }

    /// The gradients of the basis functions with respect to the reference positions, one per column.
    pub fn shape_gradients(&self) -> &Matrix3x4<T> {
        &self.shape_gradients
    }

    fn shape_gradient(&self, node: usize) -> Vector3<T> {
        self.shape_gradients.column(node).into_owned()
    }
}

impl<T, M> FemElementTraits for LinearTetrahedron<T, M>
where
    T: Real,
    M: ConstitutiveModel<T>,
{
    type T = T;
    type Data = LinearTetrahedronData<T>;
    type ConstitutiveModel = M;
    type NodalDim = U4;
    type DofDim = U12;

    const NUM_QUADRATURE_POINTS: usize = 1;
    const NUM_NATURAL_DIMENSION: usize = 3;
}

impl<T, M> FemElementKernel for LinearTetrahedron<T, M>
where
    T: Real,
    M: ConstitutiveModel<T>,
{
    #[allow(non_snake_case)]
    fn compute_data(element: &FemElement<Self>, state: &FemState<T>) -> LinearTetrahedronData<T> {
        let element_q = element.extract_element_dofs(state.positions());
        let element_v = element.extract_element_dofs(state.velocities());
        let element_a = element.extract_element_dofs(state.accelerations());

        // Columns are the current vertex positions, so F = sum_I x_I (grad N_I)^T
        let x = Matrix3x4::from_column_slice(element_q.as_slice());
        let F = x * element.kernel().shape_gradients.transpose();
        let P = element.constitutive_model().compute_stress_tensor(&F);

        LinearTetrahedronData {
            element_q,
            element_v,
            element_a,
            deformation_gradient: F,
            first_piola_stress: P,
        }
    }

    fn calc_residual(element: &FemElement<Self>, data: &LinearTetrahedronData<T>, residual: &mut ElementVector<Self>) {
        let kernel = element.kernel();

        // The elastic force on node I is -V P grad N_I
        let elastic_force = data.first_piola_stress * kernel.shape_gradients * kernel.reference_volume;
        *residual += SVector::<T, 12>::from_column_slice(elastic_force.as_slice());

        let mut mass = ElementMatrix::<Self>::zeros();
        element.add_scaled_mass_matrix(data, T::one(), &mut mass);
        residual.gemv(T::one(), &mass, &data.element_a, T::one());

        let mut damping = ElementMatrix::<Self>::zeros();
        element.add_scaled_damping_matrix(data, T::one(), &mut damping);
        residual.gemv(T::one(), &damping, &data.element_v, T::one());

        element.add_scaled_external_force(data, -T::one(), residual);
    }

    fn add_scaled_stiffness_matrix(
        element: &FemElement<Self>,
        data: &LinearTetrahedronData<T>,
        scale: T,
        stiffness: &mut ElementMatrix<Self>,
    ) {
        let kernel = element.kernel();
        let model = element.constitutive_model();
        let gradients = [0, 1, 2, 3].map(|i| kernel.shape_gradient(i));
        let s = scale * kernel.reference_volume;
        for (i, j) in iproduct!(0..4, 0..4) {
            let contraction =
                model.compute_stress_contraction(&data.deformation_gradient, &gradients[i], &gradients[j]);
            let mut block = stiffness.fixed_view_mut::<3, 3>(3 * i, 3 * j);
            block += contraction * s;
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn add_scaled_mass_matrix(
        element: &FemElement<Self>,
        _data: &LinearTetrahedronData<T>,
        scale: T,
        mass: &mut ElementMatrix<Self>,
    ) {
        // Consistent mass for linear basis functions: M_IJ = rho V (1 + delta_IJ) / 20
        let kernel = element.kernel();
        let m = scale * kernel.density * kernel.reference_volume / 20.0;
        for (i, j) in iproduct!(0..4, 0..4) {
            let m_ij = if i == j { 2.0 * m } else { m };
            for d in 0..3 {
                mass[(3 * i + d, 3 * j + d)] += m_ij;
            }
        }
    }

    /// Every row of the consistent mass matrix sums to $\rho V / 4$ per direction, so the
    /// gravity load is the same on all four nodes.
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn add_scaled_gravity_force(
        element: &FemElement<Self>,
        _data: &LinearTetrahedronData<T>,
        scale: T,
        force: &mut ElementVector<Self>,
    ) {
        let kernel = element.kernel();
        let nodal_force = element.gravity_vector() * (scale * kernel.density * kernel.reference_volume / 4.0);
        for i in 0..4 {
            let mut f_i = force.fixed_rows_mut::<3>(3 * i);
            f_i += nodal_force;
        }
    }
}

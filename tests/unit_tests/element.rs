use fedyn::damping::DampingModel;
use fedyn::element::{
    default_gravity, extract_element_dofs, ElementMatrix, ElementVector, FemElement, FemElementKernel,
    FemElementTraits,
};
use fedyn::index::{FemElementIndex, FemNodeIndex};
use fedyn::nalgebra::{vector, DVector, SMatrix, SVector, Vector2, Vector3, U2, U6};
use fedyn::state::FemState;
use matrixcompare::assert_matrix_eq;
use proptest::prelude::*;

/// A two-node test element whose kernels add fixed, known quantities.
#[derive(Debug)]
struct FixedElement {
    residual: SVector<f64, 6>,
    stiffness: SMatrix<f64, 6, 6>,
    mass: SMatrix<f64, 6, 6>,
    extra_force: SVector<f64, 6>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct FixedData {
    element_q: [f64; 6],
}

impl FemElementTraits for FixedElement {
    type T = f64;
    type Data = FixedData;
    type ConstitutiveModel = ();
    type NodalDim = U2;
    type DofDim = U6;

    const NUM_QUADRATURE_POINTS: usize = 2;
    const NUM_NATURAL_DIMENSION: usize = 1;
}

impl FemElementKernel for FixedElement {
    fn compute_data(element: &FemElement<Self>, state: &FemState<f64>) -> FixedData {
        let q = element.extract_element_dofs(state.positions());
        let mut element_q = [0.0; 6];
        element_q.copy_from_slice(q.as_slice());
        FixedData { element_q }
    }

    fn calc_residual(element: &FemElement<Self>, _data: &FixedData, residual: &mut ElementVector<Self>) {
        *residual += element.kernel().residual;
    }

    fn add_scaled_stiffness_matrix(
        element: &FemElement<Self>,
        _data: &FixedData,
        scale: f64,
        stiffness: &mut ElementMatrix<Self>,
    ) {
        *stiffness += element.kernel().stiffness * scale;
    }

    fn add_scaled_mass_matrix(
        element: &FemElement<Self>,
        _data: &FixedData,
        scale: f64,
        mass: &mut ElementMatrix<Self>,
    ) {
        *mass += element.kernel().mass * scale;
    }

    fn add_scaled_external_force(
        element: &FemElement<Self>,
        _data: &FixedData,
        scale: f64,
        force: &mut ElementVector<Self>,
    ) {
        *force += element.kernel().extra_force * scale;
    }
}

fn fixed_kernel() -> FixedElement {
    FixedElement {
        residual: SVector::from_fn(|i, _| i as f64 + 1.0),
        // Deliberately non-symmetric so that transposition mistakes show up
        stiffness: SMatrix::from_fn(|i, j| (i + 2 * j) as f64 - 3.0),
        mass: SMatrix::from_fn(|i, j| if i == j { 4.0 } else { 0.5 }),
        extra_force: SVector::zeros(),
    }
}

fn fixed_element_with(kernel: FixedElement, damping_model: DampingModel<f64>) -> FemElement<FixedElement> {
    FemElement::new(
        FemElementIndex::new(7),
        Vector2::new(FemNodeIndex::new(1), FemNodeIndex::new(0)),
        (),
        damping_model,
        kernel,
    )
}

fn fixed_element(damping_model: DampingModel<f64>) -> FemElement<FixedElement> {
    fixed_element_with(fixed_kernel(), damping_model)
}

fn rayleigh_damping() -> DampingModel<f64> {
    DampingModel::new(0.25, 0.125).unwrap()
}

fn stiffness_matrix(element: &FemElement<FixedElement>, data: &FixedData) -> SMatrix<f64, 6, 6> {
    let mut k = SMatrix::zeros();
    element.add_scaled_stiffness_matrix(data, 1.0, &mut k);
    k
}

fn mass_matrix(element: &FemElement<FixedElement>, data: &FixedData) -> SMatrix<f64, 6, 6> {
    let mut m = SMatrix::zeros();
    element.add_scaled_mass_matrix(data, 1.0, &mut m);
    m
}

#[test]
fn element_constants_follow_traits() {
    assert_eq!(FemElement::<FixedElement>::num_nodes(), 2);
    assert_eq!(FemElement::<FixedElement>::num_dofs(), 6);
    assert_eq!(FemElement::<FixedElement>::num_quadrature_points(), 2);
    assert_eq!(FemElement::<FixedElement>::num_natural_dimension(), 1);
}

#[test]
fn element_accessors() {
    let element = fixed_element(rayleigh_damping());
    assert_eq!(element.element_index(), FemElementIndex::new(7));
    assert_eq!(
        element.node_indices().as_slice(),
        &[FemNodeIndex::new(1), FemNodeIndex::new(0)]
    );
    assert_eq!(element.damping_model(), &rayleigh_damping());
    assert_eq!(element.constitutive_model(), &());
}

#[test]
fn compute_data_reads_positions_of_element_nodes() {
    let element = fixed_element(DampingModel::undamped());
    let q = DVector::from_column_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let state = FemState::from_positions(q).unwrap();
    let data = element.compute_data(&state);
    assert_eq!(data.element_q, [4.0, 5.0, 6.0, 1.0, 2.0, 3.0]);
}

#[test]
fn calc_residual_overwrites_output() {
    let element = fixed_element(DampingModel::undamped());
    let data = FixedData::default();
    let mut residual = SVector::<f64, 6>::repeat(100.0);
    element.calc_residual(&data, &mut residual);
    assert_eq!(residual, element.kernel().residual);

    // Evaluating again must not accumulate
    element.calc_residual(&data, &mut residual);
    assert_eq!(residual, element.kernel().residual);
}

#[test]
fn tangent_matrix_decomposes_into_stiffness_and_mass() {
    let element = fixed_element(rayleigh_damping());
    let data = FixedData::default();
    let mut tangent = SMatrix::<f64, 6, 6>::zeros();

    element.calc_tangent_matrix(&data, &vector![1.0, 0.0, 0.0], &mut tangent);
    assert_matrix_eq!(tangent, stiffness_matrix(&element, &data), comp = abs, tol = 1e-14);

    element.calc_tangent_matrix(&data, &vector![0.0, 0.0, 1.0], &mut tangent);
    assert_matrix_eq!(tangent, mass_matrix(&element, &data), comp = abs, tol = 1e-14);
}

#[test]
fn stiffness_matrix_accumulates_into_existing_values() {
    let element = fixed_element(DampingModel::undamped());
    let data = FixedData::default();
    let seed = SMatrix::<f64, 6, 6>::from_fn(|i, j| (i * j) as f64 + 0.5);

    let mut k = seed;
    element.add_scaled_stiffness_matrix(&data, 1.5, &mut k);
    element.add_scaled_stiffness_matrix(&data, 1.5, &mut k);

    let expected = seed + stiffness_matrix(&element, &data) * 3.0;
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-12);
}

#[test]
fn mass_matrix_accumulates_into_existing_values() {
    let element = fixed_element(DampingModel::undamped());
    let data = FixedData::default();
    let seed = SMatrix::<f64, 6, 6>::from_fn(|i, j| i as f64 - 2.0 * j as f64);
    let s = 0.75;

    let mut m = seed;
    element.add_scaled_mass_matrix(&data, s, &mut m);
    element.add_scaled_mass_matrix(&data, s, &mut m);

    let expected = seed + mass_matrix(&element, &data) * (2.0 * s);
    assert_matrix_eq!(m, expected, comp = abs, tol = 1e-12);
}

#[test]
fn tangent_matrix_is_idempotent() {
    let element = fixed_element(rayleigh_damping());
    let data = FixedData::default();
    let weights = vector![2.0, 3.0, 5.0];

    let mut tangent = SMatrix::<f64, 6, 6>::repeat(-1.0);
    element.calc_tangent_matrix(&data, &weights, &mut tangent);
    let first = tangent;
    element.calc_tangent_matrix(&data, &weights, &mut tangent);
    assert_eq!(tangent, first);
}

#[test]
fn damping_matrix_accumulates_into_existing_values() {
    let element = fixed_element(rayleigh_damping());
    let data = FixedData::default();
    let seed = SMatrix::<f64, 6, 6>::identity();

    let mut d = seed;
    element.add_scaled_damping_matrix(&data, 2.0, &mut d);

    let k = stiffness_matrix(&element, &data);
    let m = mass_matrix(&element, &data);
    let expected = seed + (m * 0.25 + k * 0.125) * 2.0;
    assert_matrix_eq!(d, expected, comp = abs, tol = 1e-12);
}

#[test]
fn extract_element_dofs_follows_local_node_order() {
    let node_indices = Vector3::new(FemNodeIndex::new(2), FemNodeIndex::new(0), FemNodeIndex::new(1));
    // Blocks A = [1, 2, 3], B = [4, 5, 6], C = [7, 8, 9], D = [10, 11, 12]
    let global = DVector::from_fn(12, |i, _| i as f64 + 1.0);
    let local: SVector<f64, 9> = extract_element_dofs(&node_indices, &global);
    assert_eq!(local, SVector::<f64, 9>::from([7.0, 8.0, 9.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
}

#[test]
fn extract_element_dofs_allows_repeated_nodes() {
    let node_indices = Vector2::new(FemNodeIndex::new(1), FemNodeIndex::new(1));
    let global = DVector::from_column_slice(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    let local: SVector<f64, 6> = extract_element_dofs(&node_indices, &global);
    assert_eq!(local, SVector::<f64, 6>::from([1.0, 2.0, 3.0, 1.0, 2.0, 3.0]));
}

#[test]
fn member_extract_element_dofs_uses_element_nodes() {
    let element = fixed_element(DampingModel::undamped());
    let global = DVector::from_column_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let local = element.extract_element_dofs(&global);
    assert_eq!(local, SVector::<f64, 6>::from([4.0, 5.0, 6.0, 1.0, 2.0, 3.0]));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn extract_element_dofs_panics_for_out_of_bounds_node() {
    let node_indices = Vector2::new(FemNodeIndex::new(0), FemNodeIndex::new(2));
    let global = DVector::<f64>::zeros(6);
    let _: SVector<f64, 6> = extract_element_dofs(&node_indices, &global);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn extract_element_dofs_panics_for_node_beyond_addressable_dofs() {
    // 3 * index wraps around in unchecked arithmetic
    let node_indices = Vector2::new(FemNodeIndex::new(0), FemNodeIndex::new(usize::MAX / 3 + 1));
    let global = DVector::<f64>::zeros(6);
    let _: SVector<f64, 6> = extract_element_dofs(&node_indices, &global);
}

#[test]
fn gravity_defaults_to_earth_gravity() {
    let element = fixed_element(DampingModel::undamped());
    assert_eq!(element.gravity_vector(), &vector![0.0, 0.0, -9.81]);
    assert_eq!(default_gravity::<f64>(), vector![0.0, 0.0, -9.81]);
}

#[test]
fn gravity_force_is_consistent_with_mass_matrix() {
    let kernel = FixedElement {
        mass: SMatrix::identity(),
        ..fixed_kernel()
    };
    let element = fixed_element_with(kernel, DampingModel::undamped());
    let data = FixedData::default();
    let mut force = SVector::<f64, 6>::zeros();
    element.add_scaled_external_force(&data, 1.0, &mut force);
    assert_matrix_eq!(
        force,
        vector![0.0, 0.0, -9.81, 0.0, 0.0, -9.81],
        comp = abs,
        tol = 1e-14
    );
}

#[test]
fn external_force_uses_updated_gravity_and_accumulates() {
    let kernel = FixedElement {
        mass: SMatrix::identity() * 2.0,
        extra_force: SVector::from([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
        ..fixed_kernel()
    };
    let mut element = fixed_element_with(kernel, DampingModel::undamped());
    element.set_gravity_vector(vector![0.0, -1.0, 0.0]);
    assert_eq!(element.gravity_vector(), &vector![0.0, -1.0, 0.0]);

    let data = FixedData::default();
    let mut force = SVector::<f64, 6>::repeat(1.0);
    element.add_scaled_external_force(&data, 0.5, &mut force);

    // 1 + 0.5 * (M g + f_extra)
    let expected = vector![1.5, 0.0, 1.0, 1.0, 0.5, 1.0];
    assert_matrix_eq!(force, expected, comp = abs, tol = 1e-14);
}

proptest! {
    #[test]
    fn mass_matrix_is_linear_in_scale(s in -10.0 .. 10.0) {
        let element = fixed_element(DampingModel::undamped());
        let data = FixedData::default();

        let mut m_double = SMatrix::<f64, 6, 6>::zeros();
        element.add_scaled_mass_matrix(&data, 2.0 * s, &mut m_double);
        let mut m_single = SMatrix::<f64, 6, 6>::zeros();
        element.add_scaled_mass_matrix(&data, s, &mut m_single);

        assert_matrix_eq!(m_double, m_single * 2.0, comp = abs, tol = 1e-12);
    }

    #[test]
    fn damping_tangent_satisfies_rayleigh_identity(alpha in 0.0 .. 5.0, beta in 0.0 .. 5.0) {
        let element = fixed_element(DampingModel::new(alpha, beta).unwrap());
        let data = FixedData::default();
        let k = stiffness_matrix(&element, &data);
        let m = mass_matrix(&element, &data);
        let expected = m * alpha + k * beta;

        let mut tangent = SMatrix::<f64, 6, 6>::zeros();
        element.calc_tangent_matrix(&data, &vector![0.0, 1.0, 0.0], &mut tangent);
        assert_matrix_eq!(tangent, expected, comp = abs, tol = 1e-12);

        let mut damping = SMatrix::<f64, 6, 6>::zeros();
        element.add_scaled_damping_matrix(&data, 1.0, &mut damping);
        assert_matrix_eq!(damping, expected, comp = abs, tol = 1e-12);
    }

    #[test]
    fn tangent_matrix_combines_weighted_operators(
        w0 in -5.0 .. 5.0,
        w1 in -5.0 .. 5.0,
        w2 in -5.0 .. 5.0,
    ) {
        let element = fixed_element(rayleigh_damping());
        let data = FixedData::default();
        let k = stiffness_matrix(&element, &data);
        let m = mass_matrix(&element, &data);
        let mut d = SMatrix::<f64, 6, 6>::zeros();
        element.add_scaled_damping_matrix(&data, 1.0, &mut d);

        let mut tangent = SMatrix::<f64, 6, 6>::zeros();
        element.calc_tangent_matrix(&data, &vector![w0, w1, w2], &mut tangent);
        let expected = k * w0 + d * w1 + m * w2;
        assert_matrix_eq!(tangent, expected, comp = abs, tol = 1e-10);
    }
}

use fedyn::constitutive::ConstitutiveModel;
use fedyn::nalgebra::{Matrix3, Vector3};
use fedyn::Real;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub mu: T,
    pub lambda: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

impl<T> From<YoungPoisson<T>> for LameParameters<T>
where
    T: Real,
{
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn from(params: YoungPoisson<T>) -> Self {
        let YoungPoisson { young, poisson } = params;
        let mu = 0.5 * young / (1.0 + poisson);
        let lambda = 2.0 * mu * poisson / (1.0 - 2.0 * poisson);
        Self { mu, lambda }
    }
}

/// The linear elastic material model.
///
/// Given Lamé parameters $\mu$ and $\lambda$, the strain energy density is
/// $$
/// \psi(\vec F) =
///     \mu \vec \epsilon : \vec \epsilon
///   + \frac{\lambda}{2} \operatorname{tr}^2(\vec \epsilon),
/// $$
/// where
/// $$
/// \vec \epsilon(\vec F) = \frac{(\vec F + \vec F^T)}{2} - \vec I
/// $$
/// is the infinitesimal strain tensor. The associated stress tensor is
/// $$
/// \vec P(\vec F) = 2 \mu \vec \epsilon + \lambda \operatorname{tr}(\vec \epsilon) \vec I.
/// $$
/// Finally, the contraction operator associated with the stress tensor is
/// $$
/// \mathcal{C}_{\vec P}(\vec F, \vec a, \vec b) =
///     \mu \left[ (\vec a \cdot \vec b) \vec I + \vec b \vec a^T \right]
///     + \lambda \vec a \vec b^T.
/// $$
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearElasticMaterial<T> {
    pub parameters: LameParameters<T>,
}

impl<T> From<LameParameters<T>> for LinearElasticMaterial<T> {
    fn from(parameters: LameParameters<T>) -> Self {
        Self { parameters }
    }
}

#[allow(non_snake_case)]
fn infinitesimal_strain_tensor<T: Real>(deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
    let F = deformation_gradient;
    F.symmetric_part() - Matrix3::identity()
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> ConstitutiveModel<T> for LinearElasticMaterial<T> {
    fn compute_energy_density(&self, deformation_gradient: &Matrix3<T>) -> T {
        let LameParameters { mu, lambda } = self.parameters;
        let eps = infinitesimal_strain_tensor(deformation_gradient);
        mu * eps.dot(&eps) + 0.5 * lambda * eps.trace().powi(2)
    }

    fn compute_stress_tensor(&self, deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
        let LameParameters { mu, lambda } = self.parameters;
        let eps = infinitesimal_strain_tensor(deformation_gradient);
        let eps_tr = eps.trace();
        eps * 2.0 * mu + Matrix3::from_diagonal_element(lambda * eps_tr)
    }

    fn compute_stress_contraction(
        &self,
        _deformation_gradient: &Matrix3<T>,
        a: &Vector3<T>,
        b: &Vector3<T>,
    ) -> Matrix3<T> {
        let LameParameters { mu, lambda } = self.parameters;
        let I = Matrix3::<T>::identity();
        (I * a.dot(b) + b * a.transpose()) * mu + a * b.transpose() * lambda
    }
}

/// The Saint Venant-Kirchhoff material model.
///
/// This material model is characterized by the strain energy density
/// $$
/// \psi(\vec F) = \mu \vec E : \vec E + \frac{\lambda}{2} \operatorname{tr}^2(\vec E)
/// $$
/// where $\mu$ and $\lambda$ are Lamé parameters and $\vec E = \frac{1}{2} \left( \vec F^T \vec F - \vec I \right)$
/// is the Green strain tensor. The stress tensor is
/// $$
/// \vec P(\vec F) = \vec F (2 \mu \vec E + \lambda \tr{E} \vec I)
/// $$
/// and the contraction operator is
/// $$
/// \mathcal{C}_{\vec P}(\vec F, \vec a, \vec b) =
///     \left[ 2 \mu \vec a^T \vec E \vec b + \lambda \tr{\vec E} (\vec a \cdot \vec b) \right] \vec I
///     + \mu (\vec F \vec b) (\vec F \vec a)^T
///     + \lambda (\vec F \vec a) (\vec F \vec b)^T
///     + \mu (\vec a \cdot \vec b) \vec F \vec F^T.
/// $$
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StVKMaterial<T> {
    pub parameters: LameParameters<T>,
}

impl<T> From<LameParameters<T>> for StVKMaterial<T> {
    fn from(parameters: LameParameters<T>) -> Self {
        Self { parameters }
    }
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
fn green_strain_tensor<T: Real>(deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
    let I = Matrix3::<T>::identity();
    let F = deformation_gradient;
    (F.transpose() * F - I) * 0.5
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> ConstitutiveModel<T> for StVKMaterial<T> {
    fn compute_energy_density(&self, deformation_gradient: &Matrix3<T>) -> T {
        let LameParameters { mu, lambda } = self.parameters;
        let E = green_strain_tensor(deformation_gradient);
        mu * E.dot(&E) + 0.5 * lambda * E.trace().powi(2)
    }

    fn compute_stress_tensor(&self, deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
        let LameParameters { mu, lambda } = self.parameters;
        let F = deformation_gradient;
        let E = green_strain_tensor(F);
        F * E * (2.0 * mu) + F * (lambda * E.trace())
    }

    fn compute_stress_contraction(
        &self,
        deformation_gradient: &Matrix3<T>,
        a: &Vector3<T>,
        b: &Vector3<T>,
    ) -> Matrix3<T> {
        let LameParameters { mu, lambda } = self.parameters;
        let I = Matrix3::<T>::identity();
        let F = deformation_gradient;
        let E = green_strain_tensor(F);
        let a_dot_b = a.dot(b);

        let Fa = F * a;
        let Fb = F * b;
        let Eb = E * b;

        I * (2.0 * mu * a.dot(&Eb) + lambda * E.trace() * a_dot_b)
            + Fb * Fa.transpose() * mu
            + Fa * Fb.transpose() * lambda
            + F * F.transpose() * (mu * a_dot_b)
    }
}

//! Rayleigh damping.
use crate::Real;
use eyre::ensure;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// A Rayleigh damping model.
///
/// The damping matrix is $\vec D = \alpha \vec M + \beta \vec K$, where $\vec M$ and $\vec K$
/// are the mass and stiffness matrices, $\alpha$ is the mass-proportional coefficient and
/// $\beta$ is the stiffness-proportional coefficient. Both coefficients are non-negative.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RayleighCoefficients<T>",
    bound(deserialize = "T: Real + Deserialize<'de>")
)]
pub struct DampingModel<T> {
    mass_coeff_alpha: T,
    stiffness_coeff_beta: T,
}

/// Unvalidated Rayleigh coefficients, as read from a serialized [`DampingModel`].
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct RayleighCoefficients<T> {
    pub mass_coeff_alpha: T,
    pub stiffness_coeff_beta: T,
}

impl<T: Real> DampingModel<T> {
    /// Fails unless both coefficients are non-negative.
    pub fn new(mass_coeff_alpha: T, stiffness_coeff_beta: T) -> eyre::Result<Self> {
        ensure!(
            mass_coeff_alpha >= T::zero(),
            "the mass coefficient alpha must be non-negative, got {}",
            mass_coeff_alpha
        );
        ensure!(
            stiffness_coeff_beta >= T::zero(),
            "the stiffness coefficient beta must be non-negative, got {}",
            stiffness_coeff_beta
        );
        Ok(Self {
            mass_coeff_alpha,
            stiffness_coeff_beta,
        })
    }

    pub fn undamped() -> Self {
        Self {
            mass_coeff_alpha: T::zero(),
            stiffness_coeff_beta: T::zero(),
        }
    }

    pub fn mass_coeff_alpha(&self) -> T {
        self.mass_coeff_alpha
    }

    pub fn stiffness_coeff_beta(&self) -> T {
        self.stiffness_coeff_beta
    }
}

impl<T: Real> TryFrom<RayleighCoefficients<T>> for DampingModel<T> {
    type Error = eyre::Report;

    fn try_from(coefficients: RayleighCoefficients<T>) -> eyre::Result<Self> {
        Self::new(coefficients.mass_coeff_alpha, coefficients.stiffness_coeff_beta)
    }
}

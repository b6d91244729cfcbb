//! Monte Carlo estimators corrected by a linear surrogate with known moments.
//!
//! The surrogate is the first-order Taylor polynomial of the model around the
//! mean `μ` of the uncertain inputs: `g(u) = f(μ) + J (u - μ)`. Its mean is
//! `f(μ)` and its variance is `diag(J diag(σ²) Jᵀ)`.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::core::StatisticError;
use crate::utils::math::{column_covariances, column_means, column_variances};

mod margin;
mod mean;
mod probability;
mod standard_deviation;
mod variance;

pub use margin::ControlVariateMargin;
pub use mean::ControlVariateMean;
pub use probability::ControlVariateProbability;
pub use standard_deviation::ControlVariateStandardDeviation;
pub use variance::ControlVariateVariance;

/// Everything a control-variate estimator needs for one estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlVariateData {
    /// High-fidelity outputs, `n × k`.
    pub samples: Array2<f64>,
    /// Uncertain inputs the outputs were computed at, `n × d`.
    pub inputs: Array2<f64>,
    pub input_mean: Array1<f64>,
    pub input_standard_deviation: Array1<f64>,
    /// Model output at `input_mean`, `k`.
    pub mean_value: Array1<f64>,
    /// Model Jacobian w.r.t. the uncertain inputs at `input_mean`, `k × d`.
    pub mean_jacobian: Array2<f64>,
    /// Extra uncertain draws, only used to estimate the mean of a non-linear
    /// transform of the surrogate (probability).
    pub reference_inputs: Option<Array2<f64>>,
}

impl ControlVariateData {
    pub(crate) fn validate(&self) -> Result<(), StatisticError> {
        let (n, k) = self.samples.dim();
        if n == 0 {
            return Err(StatisticError::EmptySample);
        }
        let d = self.input_mean.len();
        let checks = [
            ("inputs", self.inputs.dim(), (n, d)),
            (
                "input_standard_deviation",
                (self.input_standard_deviation.len(), 1),
                (d, 1),
            ),
            ("mean_value", (self.mean_value.len(), 1), (k, 1)),
            ("mean_jacobian", self.mean_jacobian.dim(), (k, d)),
        ];
        for (name, found, expected) in checks {
            if found != expected {
                return Err(StatisticError::ShapeMismatch(format!(
                    "{name} is {found:?}, expected {expected:?}"
                )));
            }
        }
        if let Some(reference) = &self.reference_inputs {
            if reference.ncols() != d {
                return Err(StatisticError::ShapeMismatch(format!(
                    "reference_inputs has {} columns, expected {d}",
                    reference.ncols()
                )));
            }
        }
        Ok(())
    }

    /// Surrogate evaluated at each row of `inputs`.
    pub fn surrogate(&self, inputs: ArrayView2<'_, f64>) -> Array2<f64> {
        (&inputs - &self.input_mean).dot(&self.mean_jacobian.t()) + &self.mean_value
    }

    pub fn surrogate_samples(&self) -> Array2<f64> {
        self.surrogate(self.inputs.view())
    }

    /// `Σ_j J_kj² σ_j²` for each output `k`.
    pub fn surrogate_variance(&self) -> Array1<f64> {
        let variances = self.input_standard_deviation.mapv(|s| s * s);
        self.mean_jacobian.mapv(|j| j * j).dot(&variances)
    }
}

/// `-Cov(y, c) / Var(c)` per column, or 0 when `Var(c)` is (near) zero or
/// undefined.
pub(crate) fn control_variate_coefficients(
    samples: ArrayView2<'_, f64>,
    control_variates: ArrayView2<'_, f64>,
) -> Result<Array1<f64>, StatisticError> {
    let covariances = column_covariances(samples, control_variates)?;
    let variances = column_variances(control_variates)?;
    Ok(ndarray::Zip::from(&covariances)
        .and(&variances)
        .map_collect(|&c, &v| if v >= f64::EPSILON { -c / v } else { 0.0 }))
}

/// `mean(y) + α (mean(c) - E[c])` per column.
pub(crate) fn control_variate_mean(
    samples: ArrayView2<'_, f64>,
    control_variates: ArrayView2<'_, f64>,
    known_mean: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, StatisticError> {
    let alpha = control_variate_coefficients(samples, control_variates)?;
    let mean = column_means(samples)?;
    let cv_mean = column_means(control_variates)?;
    Ok(mean + alpha * (cv_mean - known_mean))
}

/// `s²(y) + α (s²(c) - Var[c])` with `α` fitted on squared deviations.
pub(crate) fn control_variate_variance(
    samples: ArrayView2<'_, f64>,
    control_variates: ArrayView2<'_, f64>,
    known_variance: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, StatisticError> {
    fn squared(x: ArrayView2<'_, f64>) -> Result<Array2<f64>, StatisticError> {
        let mean = column_means(x)?;
        Ok((&x - &mean).mapv(|v| v * v))
    }

    let alpha = control_variate_coefficients(
        squared(samples)?.view(),
        squared(control_variates)?.view(),
    )?;
    let variance = column_variances(samples)?;
    let cv_variance = column_variances(control_variates)?;
    Ok(variance + alpha * (cv_variance - known_variance))
}

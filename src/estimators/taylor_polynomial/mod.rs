//! Delta-method estimators built from the model value, Jacobian and
//! (optionally) Hessian at the mean of the uncertain inputs.
//!
//! They assume independent inputs and a locally smooth model, and degrade
//! for strongly non-linear models or heavy-tailed inputs.

use ndarray::{Array1, Array2, Array3, Axis};

use crate::core::StatisticError;

mod margin;
mod mean;
mod standard_deviation;
mod variance;

pub use margin::TaylorMargin;
pub use mean::TaylorMean;
pub use standard_deviation::TaylorStandardDeviation;
pub use variance::TaylorVariance;

#[derive(Debug, Clone, PartialEq)]
pub struct TaylorData {
    /// Model output at the input mean, `k`.
    pub value: Array1<f64>,
    /// Jacobian w.r.t. the uncertain inputs, `k × d`.
    pub jacobian: Array2<f64>,
    /// Hessian w.r.t. the uncertain inputs, `k × d × d`.
    pub hessian: Option<Array3<f64>>,
    pub input_standard_deviation: Array1<f64>,
}

impl TaylorData {
    pub(crate) fn validate(&self) -> Result<(), StatisticError> {
        let k = self.value.len();
        let d = self.input_standard_deviation.len();
        if self.jacobian.dim() != (k, d) {
            return Err(StatisticError::ShapeMismatch(format!(
                "jacobian is {:?}, expected {:?}",
                self.jacobian.dim(),
                (k, d)
            )));
        }
        if let Some(h) = &self.hessian {
            if h.dim() != (k, d, d) {
                return Err(StatisticError::ShapeMismatch(format!(
                    "hessian is {:?}, expected {:?}",
                    h.dim(),
                    (k, d, d)
                )));
            }
        }
        Ok(())
    }

    /// `value + ½ σᵀ H_k σ` when a Hessian is available.
    pub(crate) fn mean(&self) -> Array1<f64> {
        let mut mean = self.value.clone();
        if let Some(h) = &self.hessian {
            let std = &self.input_standard_deviation;
            for (k, h_k) in h.axis_iter(Axis(0)).enumerate() {
                let curvature: f64 = std.dot(&h_k.dot(std));
                mean[k] += 0.5 * curvature;
            }
        }
        mean
    }

    /// `Σ_j J_kj² σ_j²`.
    pub(crate) fn variance(&self) -> Array1<f64> {
        let variances = self.input_standard_deviation.mapv(|s| s * s);
        self.jacobian.mapv(|j| j * j).dot(&variances)
    }
}

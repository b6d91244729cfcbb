//! Estimators over a complete batch of model outputs.

use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::core::StatisticError;

mod margin;
mod mean;
mod probability;
mod standard_deviation;
mod variance;

pub use margin::SamplingMargin;
pub use mean::SamplingMean;
pub use probability::SamplingProbability;
pub use standard_deviation::SamplingStandardDeviation;
pub use variance::SamplingVariance;

/// Model outputs `n × k`, optionally with their Jacobians `n × k × p`
/// w.r.t. the design variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch {
    samples: Array2<f64>,
    jacobians: Option<Array3<f64>>,
}

impl SampleBatch {
    pub fn new(samples: Array2<f64>) -> Result<Self, StatisticError> {
        if samples.nrows() == 0 {
            return Err(StatisticError::EmptySample);
        }
        Ok(Self {
            samples,
            jacobians: None,
        })
    }

    pub fn with_jacobians(
        samples: Array2<f64>,
        jacobians: Array3<f64>,
    ) -> Result<Self, StatisticError> {
        let (n, k, _) = jacobians.dim();
        if (n, k) != samples.dim() {
            return Err(StatisticError::ShapeMismatch(format!(
                "samples are {:?} but jacobians are {:?}",
                samples.dim(),
                jacobians.dim()
            )));
        }
        let mut batch = Self::new(samples)?;
        batch.jacobians = Some(jacobians);
        Ok(batch)
    }

    pub fn samples(&self) -> ArrayView2<'_, f64> {
        self.samples.view()
    }

    pub fn jacobians(&self) -> Option<ArrayView3<'_, f64>> {
        self.jacobians.as_ref().map(|j| j.view())
    }

    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.nrows() == 0
    }

    pub fn output_dimension(&self) -> usize {
        self.samples.ncols()
    }
}

pub(crate) fn mean_jacobian(jacobians: ArrayView3<'_, f64>) -> Array2<f64> {
    jacobians.sum_axis(Axis(0)) / jacobians.len_of(Axis(0)) as f64
}

/// `dVar = 2n/(n-1) · (E[y·dy] - E[y]·E[dy])`.
pub(crate) fn variance_jacobian(
    samples: ArrayView2<'_, f64>,
    jacobians: ArrayView3<'_, f64>,
) -> Array2<f64> {
    let n = samples.nrows() as f64;
    let weighted = &jacobians * &samples.insert_axis(Axis(2));
    let mean_weighted = weighted.sum_axis(Axis(0)) / n;
    let mean_samples = samples.sum_axis(Axis(0)) / n;
    let mean_jacobians = jacobians.sum_axis(Axis(0)) / n;
    (mean_weighted - &mean_samples.insert_axis(Axis(1)) * &mean_jacobians) * (2.0 * n / (n - 1.0))
}

/// `dStd = dVar / (2·std)`, zero where the standard deviation vanishes.
pub(crate) fn standard_deviation_jacobian(
    variance_jacobian: &Array2<f64>,
    standard_deviation: &Array1<f64>,
) -> Array2<f64> {
    let mut jacobian = variance_jacobian.clone();
    for (mut row, &std) in jacobian.rows_mut().into_iter().zip(standard_deviation) {
        if std > 0.0 {
            row /= 2.0 * std;
        } else {
            row.fill(0.0);
        }
    }
    jacobian
}

pub(crate) fn indicator(value: f64, threshold: f64, greater: bool) -> f64 {
    let hit = if greater {
        value >= threshold
    } else {
        value <= threshold
    };
    if hit { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            SampleBatch::new(Array2::zeros((0, 2))),
            Err(StatisticError::EmptySample)
        ));
    }

    #[test]
    fn jacobian_shape_must_match_samples() {
        let r = SampleBatch::with_jacobians(array![[1.0], [2.0]], Array3::zeros((3, 1, 2)));
        assert!(matches!(r, Err(StatisticError::ShapeMismatch(_))));
    }

    #[test]
    fn indicator_is_inclusive_on_both_sides() {
        assert_eq!(indicator(1.0, 1.0, true), 1.0);
        assert_eq!(indicator(1.0, 1.0, false), 1.0);
        assert_eq!(indicator(0.5, 1.0, true), 0.0);
        assert_eq!(indicator(f64::NAN, 1.0, true), 0.0);
    }

    #[test]
    fn standard_deviation_jacobian_is_zero_for_constant_output() {
        let j = standard_deviation_jacobian(&array![[2.0, 4.0], [1.0, 1.0]], &array![0.0, 0.5]);
        assert_eq!(j, array![[0.0, 0.0], [1.0, 1.0]]);
    }
}

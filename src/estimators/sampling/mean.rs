use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::sampling::{SampleBatch, mean_jacobian};
use crate::utils::math::column_means;

/// Empirical mean of a sample batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SamplingMean;

impl StatisticEstimator for SamplingMean {
    type Data = SampleBatch;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Mean
    }

    fn estimate(&mut self, data: &SampleBatch) -> Result<StatisticResult, StatisticError> {
        let value = column_means(data.samples())?;
        Ok(StatisticResult {
            value,
            jacobian: data.jacobians().map(mean_jacobian),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array3, array};

    #[test]
    fn mean_per_component() {
        let batch = SampleBatch::new(array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]])
            .unwrap();
        let r = SamplingMean.estimate(&batch).unwrap();
        assert_abs_diff_eq!(r.value, array![2.5, 25.0], epsilon = 1e-12);
        assert!(r.jacobian.is_none());
    }

    #[test]
    fn jacobian_is_mean_of_sample_jacobians() {
        let mut j = Array3::zeros((2, 1, 2));
        j[[0, 0, 0]] = 1.0;
        j[[0, 0, 1]] = 2.0;
        j[[1, 0, 0]] = 3.0;
        j[[1, 0, 1]] = -2.0;
        let batch = SampleBatch::with_jacobians(array![[1.0], [2.0]], j).unwrap();
        let r = SamplingMean.estimate(&batch).unwrap();
        assert_abs_diff_eq!(r.jacobian.unwrap(), array![[2.0, 0.0]], epsilon = 1e-12);
    }
}

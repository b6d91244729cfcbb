use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::sampling::{SampleBatch, variance_jacobian};
use crate::utils::math::column_variances;

/// Unbiased empirical variance of a sample batch; NaN for a single sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct SamplingVariance;

impl StatisticEstimator for SamplingVariance {
    type Data = SampleBatch;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Variance
    }

    fn estimate(&mut self, data: &SampleBatch) -> Result<StatisticResult, StatisticError> {
        let value = column_variances(data.samples())?;
        let jacobian = data
            .jacobians()
            .map(|j| variance_jacobian(data.samples(), j));
        Ok(StatisticResult { value, jacobian })
    }
}

use crate::config::{DEFAULT_MARGIN_FACTOR, StatisticKind};
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::sampling::{
    SampleBatch, mean_jacobian, standard_deviation_jacobian, variance_jacobian,
};
use crate::utils::math::{column_means, column_variances};

/// `mean + factor · std` over a sample batch.
#[derive(Debug, Clone, Copy)]
pub struct SamplingMargin {
    factor: f64,
}

impl SamplingMargin {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Default for SamplingMargin {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_FACTOR)
    }
}

impl StatisticEstimator for SamplingMargin {
    type Data = SampleBatch;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Margin
    }

    fn estimate(&mut self, data: &SampleBatch) -> Result<StatisticResult, StatisticError> {
        let mean = column_means(data.samples())?;
        let std = column_variances(data.samples())?.mapv(f64::sqrt);
        let jacobian = data.jacobians().map(|j| {
            let std_jacobian =
                standard_deviation_jacobian(&variance_jacobian(data.samples(), j), &std);
            mean_jacobian(j) + std_jacobian * self.factor
        });
        Ok(StatisticResult {
            value: mean + std * self.factor,
            jacobian,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn margin_is_mean_plus_factor_std() {
        let batch = SampleBatch::new(array![[1.0], [2.0], [3.0], [4.0]]).unwrap();
        let std = (5.0f64 / 3.0).sqrt();
        for factor in [0.0, 1.0, 2.0, -3.0] {
            let r = SamplingMargin::new(factor).estimate(&batch).unwrap();
            assert_abs_diff_eq!(r.value[0], 2.5 + factor * std, epsilon = 1e-12);
        }
    }

    #[test]
    fn default_factor_is_two() {
        let batch = SampleBatch::new(array![[0.0], [2.0]]).unwrap();
        let r = SamplingMargin::default().estimate(&batch).unwrap();
        assert_abs_diff_eq!(r.value[0], 1.0 + 2.0 * 2f64.sqrt(), epsilon = 1e-12);
    }
}

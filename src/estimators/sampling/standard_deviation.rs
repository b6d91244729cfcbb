use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::sampling::{
    SampleBatch, standard_deviation_jacobian, variance_jacobian,
};
use crate::utils::math::column_variances;

#[derive(Debug, Default, Clone, Copy)]
pub struct SamplingStandardDeviation;

impl StatisticEstimator for SamplingStandardDeviation {
    type Data = SampleBatch;

    fn kind(&self) -> StatisticKind {
        StatisticKind::StandardDeviation
    }

    fn estimate(&mut self, data: &SampleBatch) -> Result<StatisticResult, StatisticError> {
        let value = column_variances(data.samples())?.mapv(f64::sqrt);
        let jacobian = data.jacobians().map(|j| {
            standard_deviation_jacobian(&variance_jacobian(data.samples(), j), &value)
        });
        Ok(StatisticResult { value, jacobian })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array3, array};

    #[test]
    fn square_root_of_variance() {
        let batch = SampleBatch::new(array![[1.0, 5.0], [3.0, 5.0]]).unwrap();
        let r = SamplingStandardDeviation.estimate(&batch).unwrap();
        assert_abs_diff_eq!(r.value, array![2f64.sqrt(), 0.0], epsilon = 1e-12);
    }

    #[test]
    fn jacobian_of_scaled_samples() {
        // y_i = d · u_i with d > 0, so std = d · s and dStd/dd = s.
        let u = [0.0, 1.0, 3.0];
        let d = 2.0;
        let samples = ndarray::Array2::from_shape_fn((3, 1), |(i, _)| d * u[i]);
        let jacobians = Array3::from_shape_fn((3, 1, 1), |(i, _, _)| u[i]);
        let batch = SampleBatch::with_jacobians(samples, jacobians).unwrap();
        let r = SamplingStandardDeviation.estimate(&batch).unwrap();
        let s = (7.0f64 / 3.0).sqrt();
        assert_abs_diff_eq!(r.value[0], d * s, epsilon = 1e-12);
        assert_abs_diff_eq!(r.jacobian.unwrap()[[0, 0]], s, epsilon = 1e-12);
    }
}

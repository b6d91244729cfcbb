use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::iterative::{Observation, StreamState};

/// Running unbiased variance of a stream; NaN until two observations.
#[derive(Debug, Default, Clone)]
pub struct IterativeVariance {
    state: StreamState,
}

impl StatisticEstimator for IterativeVariance {
    type Data = Observation;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Variance
    }

    fn estimate(&mut self, data: &Observation) -> Result<StatisticResult, StatisticError> {
        self.state.ingest(data)?;
        Ok(StatisticResult {
            value: self.state.variance()?,
            jacobian: self.state.variance_jacobian()?,
        })
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::sampling::{SampleBatch, SamplingVariance};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, Array3, array};

    #[test]
    fn stream_one_to_four() {
        let mut est = IterativeVariance::default();
        let mut last = f64::NAN;
        for x in [1.0, 2.0, 3.0, 4.0] {
            last = est.estimate(&Observation::new(array![x])).unwrap().value[0];
        }
        assert_abs_diff_eq!(last, 1.6667, epsilon = 1e-4);
    }

    #[test]
    fn first_observation_gives_nan() {
        let mut est = IterativeVariance::default();
        let r = est.estimate(&Observation::new(array![1.0])).unwrap();
        assert!(r.value[0].is_nan());
    }

    #[test]
    fn matches_batch_estimator_with_jacobians_at_every_step() {
        let ys = [0.2, 1.7, -0.4, 2.2, 0.9, 1.1];
        let js = [1.0, -0.5, 0.3, 2.0, 0.0, 1.5];
        let mut est = IterativeVariance::default();
        for i in 0..ys.len() {
            let r = est
                .estimate(&Observation::with_jacobian(array![ys[i]], array![[js[i]]]))
                .unwrap();
            if i == 0 {
                continue;
            }
            let samples = Array2::from_shape_fn((i + 1, 1), |(r, _)| ys[r]);
            let jacobians = Array3::from_shape_fn((i + 1, 1, 1), |(r, _, _)| js[r]);
            let batch = SampleBatch::with_jacobians(samples, jacobians).unwrap();
            let expected = SamplingVariance.estimate(&batch).unwrap();
            assert_abs_diff_eq!(r.value, expected.value, epsilon = 1e-12);
            assert_abs_diff_eq!(
                r.jacobian.unwrap(),
                expected.jacobian.unwrap(),
                epsilon = 1e-12
            );
        }
    }
}

use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::iterative::{Observation, StreamState};
use crate::estimators::sampling::standard_deviation_jacobian;

#[derive(Debug, Default, Clone)]
pub struct IterativeStandardDeviation {
    state: StreamState,
}

impl StatisticEstimator for IterativeStandardDeviation {
    type Data = Observation;

    fn kind(&self) -> StatisticKind {
        StatisticKind::StandardDeviation
    }

    fn estimate(&mut self, data: &Observation) -> Result<StatisticResult, StatisticError> {
        self.state.ingest(data)?;
        let value = self.state.variance()?.mapv(f64::sqrt);
        let jacobian = self
            .state
            .variance_jacobian()?
            .map(|j| standard_deviation_jacobian(&j, &value));
        Ok(StatisticResult { value, jacobian })
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::sampling::{SampleBatch, SamplingStandardDeviation};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    #[test]
    fn matches_batch_estimator_at_every_step() {
        let xs = [[1.0, 0.5], [2.0, -0.5], [4.0, 0.5], [8.0, 1.5]];
        let mut est = IterativeStandardDeviation::default();
        for i in 0..xs.len() {
            let r = est
                .estimate(&Observation::new(array![xs[i][0], xs[i][1]]))
                .unwrap();
            if i == 0 {
                assert!(r.value.iter().all(|v| v.is_nan()));
                continue;
            }
            let samples = Array2::from_shape_fn((i + 1, 2), |(r, c)| xs[r][c]);
            let expected = SamplingStandardDeviation
                .estimate(&SampleBatch::new(samples).unwrap())
                .unwrap();
            assert_abs_diff_eq!(r.value, expected.value, epsilon = 1e-12);
        }
    }
}

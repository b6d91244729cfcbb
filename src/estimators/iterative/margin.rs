use crate::config::{DEFAULT_MARGIN_FACTOR, StatisticKind};
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::iterative::{IterativeMean, IterativeStandardDeviation, Observation};

/// `mean + factor · std`, from a running mean and a running standard
/// deviation fed the same stream.
#[derive(Debug, Clone)]
pub struct IterativeMargin {
    factor: f64,
    mean: IterativeMean,
    standard_deviation: IterativeStandardDeviation,
}

impl IterativeMargin {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            mean: IterativeMean::default(),
            standard_deviation: IterativeStandardDeviation::default(),
        }
    }
}

impl Default for IterativeMargin {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_FACTOR)
    }
}

impl StatisticEstimator for IterativeMargin {
    type Data = Observation;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Margin
    }

    fn estimate(&mut self, data: &Observation) -> Result<StatisticResult, StatisticError> {
        // Both accumulators have seen the same history, so an observation
        // rejected by one is rejected by the other before any update.
        let mean = self.mean.estimate(data)?;
        let std = self.standard_deviation.estimate(data)?;
        let jacobian = match (mean.jacobian, std.jacobian) {
            (Some(dm), Some(ds)) => Some(dm + ds * self.factor),
            _ => None,
        };
        Ok(StatisticResult {
            value: mean.value + std.value * self.factor,
            jacobian,
        })
    }

    fn reset(&mut self) {
        self.mean.reset();
        self.standard_deviation.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn margin_of_stream() {
        let mut est = IterativeMargin::new(3.0);
        let mut r = None;
        for x in [1.0, 2.0, 3.0, 4.0] {
            r = Some(est.estimate(&Observation::new(array![x])).unwrap());
        }
        let expected = 2.5 + 3.0 * (5.0f64 / 3.0).sqrt();
        assert_abs_diff_eq!(r.unwrap().value[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn mismatch_leaves_both_accumulators_untouched() {
        let mut est = IterativeMargin::default();
        est.estimate(&Observation::new(array![1.0])).unwrap();
        est.estimate(&Observation::new(array![3.0])).unwrap();
        assert!(est.estimate(&Observation::new(array![1.0, 2.0])).is_err());
        let r = est.estimate(&Observation::new(array![5.0])).unwrap();
        assert_abs_diff_eq!(r.value[0], 3.0 + 2.0 * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn jacobian_combines_mean_and_std_jacobians() {
        let mut est = IterativeMargin::new(1.0);
        est.estimate(&Observation::with_jacobian(array![0.0], array![[0.0]]))
            .unwrap();
        let r = est
            .estimate(&Observation::with_jacobian(array![2.0], array![[1.0]]))
            .unwrap();
        // y = d·u with u = (0, 1), d = 2: mean' = 0.5, std' = 1/sqrt(2).
        assert_abs_diff_eq!(
            r.jacobian.unwrap()[[0, 0]],
            0.5 + 1.0 / 2f64.sqrt(),
            epsilon = 1e-12
        );
    }
}

use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::sampling::{SampleBatch, indicator};
use crate::utils::math::column_means;

/// Fraction of samples above (or below) a threshold, per component.
#[derive(Debug, Clone, Copy)]
pub struct SamplingProbability {
    threshold: f64,
    greater: bool,
}

impl SamplingProbability {
    pub fn new(threshold: f64, greater: bool) -> Self {
        Self { threshold, greater }
    }
}

impl StatisticEstimator for SamplingProbability {
    type Data = SampleBatch;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Probability
    }

    fn estimate(&mut self, data: &SampleBatch) -> Result<StatisticResult, StatisticError> {
        if data.jacobians().is_some() {
            return Err(StatisticError::NotDifferentiable("probability"));
        }
        let hits = data
            .samples()
            .mapv(|y| indicator(y, self.threshold, self.greater));
        Ok(StatisticResult::new(column_means(hits.view())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, array};

    #[test]
    fn counts_inclusive_exceedances() {
        let batch = SampleBatch::new(array![[0.0, 1.0], [1.0, 1.0], [2.0, -1.0], [3.0, 5.0]])
            .unwrap();
        let r = SamplingProbability::new(1.0, true).estimate(&batch).unwrap();
        assert_eq!(r.value, array![0.75, 0.75]);
        let r = SamplingProbability::new(1.0, false).estimate(&batch).unwrap();
        assert_eq!(r.value, array![0.5, 0.75]);
    }

    #[test]
    fn jacobian_is_refused() {
        let batch = SampleBatch::with_jacobians(array![[1.0]], Array3::zeros((1, 1, 1))).unwrap();
        assert!(matches!(
            SamplingProbability::new(0.0, true).estimate(&batch),
            Err(StatisticError::NotDifferentiable(_))
        ));
    }
}

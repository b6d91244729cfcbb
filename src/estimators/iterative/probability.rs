use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::iterative::{Observation, StreamState};
use crate::estimators::sampling::indicator;

/// Running fraction of observations above (or below) a threshold.
#[derive(Debug, Clone)]
pub struct IterativeProbability {
    threshold: f64,
    greater: bool,
    state: StreamState,
}

impl IterativeProbability {
    pub fn new(threshold: f64, greater: bool) -> Self {
        Self {
            threshold,
            greater,
            state: StreamState::default(),
        }
    }
}

impl StatisticEstimator for IterativeProbability {
    type Data = Observation;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Probability
    }

    fn estimate(&mut self, data: &Observation) -> Result<StatisticResult, StatisticError> {
        if data.jacobian.is_some() {
            return Err(StatisticError::NotDifferentiable("probability"));
        }
        let hits = data
            .value
            .mapv(|y| indicator(y, self.threshold, self.greater));
        self.state.ingest(&Observation::new(hits))?;
        Ok(StatisticResult::new(self.state.mean()?))
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn running_frequency() {
        let mut est = IterativeProbability::new(0.0, false);
        let mut last = None;
        for y in [-1.0, 2.0, 0.0, 3.0] {
            last = Some(est.estimate(&Observation::new(array![y])).unwrap());
        }
        assert_eq!(last.unwrap().value, array![0.5]);
    }

    #[test]
    fn refuses_jacobians() {
        let mut est = IterativeProbability::new(0.0, true);
        assert!(matches!(
            est.estimate(&Observation::with_jacobian(array![1.0], array![[1.0]])),
            Err(StatisticError::NotDifferentiable(_))
        ));
    }
}

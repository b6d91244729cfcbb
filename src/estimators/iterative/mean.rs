use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::iterative::{Observation, StreamState};

/// Running mean of a stream.
#[derive(Debug, Default, Clone)]
pub struct IterativeMean {
    state: StreamState,
}

impl IterativeMean {
    pub fn n_samples(&self) -> usize {
        self.state.count()
    }
}

impl StatisticEstimator for IterativeMean {
    type Data = Observation;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Mean
    }

    fn estimate(&mut self, data: &Observation) -> Result<StatisticResult, StatisticError> {
        self.state.ingest(data)?;
        Ok(StatisticResult {
            value: self.state.mean()?,
            jacobian: self.state.mean_jacobian()?,
        })
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

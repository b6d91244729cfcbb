use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::taylor_polynomial::TaylorData;

/// First-order propagation `diag(J diag(σ²) Jᵀ)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaylorVariance;

impl StatisticEstimator for TaylorVariance {
    type Data = TaylorData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Variance
    }

    fn estimate(&mut self, data: &TaylorData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        Ok(StatisticResult::new(data.variance()))
    }
}

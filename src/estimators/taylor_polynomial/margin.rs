use crate::config::{DEFAULT_MARGIN_FACTOR, StatisticKind};
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::taylor_polynomial::TaylorData;

#[derive(Debug, Clone, Copy)]
pub struct TaylorMargin {
    factor: f64,
}

impl TaylorMargin {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Default for TaylorMargin {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_FACTOR)
    }
}

impl StatisticEstimator for TaylorMargin {
    type Data = TaylorData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Margin
    }

    fn estimate(&mut self, data: &TaylorData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        let std = data.variance().mapv(f64::sqrt);
        Ok(StatisticResult::new(data.mean() + std * self.factor))
    }
}

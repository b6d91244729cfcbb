use crate::config::{DEFAULT_MARGIN_FACTOR, StatisticKind};
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::control_variate::{
    ControlVariateData, ControlVariateStandardDeviation, control_variate_mean,
};

#[derive(Debug, Clone, Copy)]
pub struct ControlVariateMargin {
    factor: f64,
}

impl ControlVariateMargin {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Default for ControlVariateMargin {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_FACTOR)
    }
}

impl StatisticEstimator for ControlVariateMargin {
    type Data = ControlVariateData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Margin
    }

    fn estimate(&mut self, data: &ControlVariateData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        let mean = control_variate_mean(
            data.samples.view(),
            data.surrogate_samples().view(),
            data.mean_value.view(),
        )?;
        let std = ControlVariateStandardDeviation::compute(data)?;
        Ok(StatisticResult::new(mean + std * self.factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::control_variate::tests::linear_data;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_model_gives_exact_margin() {
        let r = ControlVariateMargin::new(3.0).estimate(&linear_data()).unwrap();
        assert_abs_diff_eq!(r.value[0], 1.0 + 3.0 * 4.25f64.sqrt(), epsilon = 1e-10);
    }
}

use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::control_variate::{ControlVariateData, control_variate_variance};

/// Square root of the control-variate variance. The correction can make the
/// variance slightly negative; it is clamped to zero first.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControlVariateStandardDeviation;

impl ControlVariateStandardDeviation {
    pub(crate) fn compute(data: &ControlVariateData) -> Result<ndarray::Array1<f64>, StatisticError> {
        let variance = control_variate_variance(
            data.samples.view(),
            data.surrogate_samples().view(),
            data.surrogate_variance().view(),
        )?;
        Ok(variance.mapv(|v| v.max(0.0).sqrt()))
    }
}

impl StatisticEstimator for ControlVariateStandardDeviation {
    type Data = ControlVariateData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::StandardDeviation
    }

    fn estimate(&mut self, data: &ControlVariateData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        Ok(StatisticResult::new(Self::compute(data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::control_variate::tests::linear_data;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_model_gives_exact_standard_deviation() {
        let r = ControlVariateStandardDeviation
            .estimate(&linear_data())
            .unwrap();
        assert_abs_diff_eq!(r.value[0], 4.25f64.sqrt(), epsilon = 1e-10);
    }
}

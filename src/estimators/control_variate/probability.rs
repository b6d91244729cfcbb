use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::control_variate::{ControlVariateData, control_variate_mean};
use crate::estimators::sampling::indicator;
use crate::utils::math::column_means;

/// Exceedance probability corrected by the same indicator applied to the
/// surrogate. The surrogate probability is not known in closed form, so it
/// is estimated from `reference_inputs`.
#[derive(Debug, Clone, Copy)]
pub struct ControlVariateProbability {
    threshold: f64,
    greater: bool,
}

impl ControlVariateProbability {
    pub fn new(threshold: f64, greater: bool) -> Self {
        Self { threshold, greater }
    }
}

impl StatisticEstimator for ControlVariateProbability {
    type Data = ControlVariateData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Probability
    }

    fn estimate(&mut self, data: &ControlVariateData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        let reference = data.reference_inputs.as_ref().ok_or_else(|| {
            StatisticError::InvalidParameter(
                "control-variate probability needs reference inputs".into(),
            )
        })?;
        let hit = |y: f64| indicator(y, self.threshold, self.greater);
        let known_mean = column_means(data.surrogate(reference.view()).mapv(hit).view())?;
        let value = control_variate_mean(
            data.samples.mapv(hit).view(),
            data.surrogate_samples().mapv(hit).view(),
            known_mean.view(),
        )?;
        Ok(StatisticResult::new(value))
    }
}

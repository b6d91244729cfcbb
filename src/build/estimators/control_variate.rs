use crate::build::BoxedEstimator;
use crate::build::BuildError;
use crate::config::{MarginParameters, ProbabilityParameters, StatisticChoice};
use crate::estimators::control_variate::{
    ControlVariateData, ControlVariateMargin, ControlVariateMean, ControlVariateProbability,
    ControlVariateStandardDeviation, ControlVariateVariance,
};

impl From<MarginParameters> for ControlVariateMargin {
    fn from(p: MarginParameters) -> Self {
        ControlVariateMargin::new(p.factor)
    }
}

impl From<ProbabilityParameters> for ControlVariateProbability {
    fn from(p: ProbabilityParameters) -> Self {
        ControlVariateProbability::new(p.threshold, p.greater)
    }
}

pub fn build_control_variate_estimator(
    choice: &StatisticChoice,
) -> Result<BoxedEstimator<ControlVariateData>, BuildError> {
    Ok(match choice {
        StatisticChoice::Mean(_) => Box::new(ControlVariateMean),
        StatisticChoice::Variance(_) => Box::new(ControlVariateVariance),
        StatisticChoice::StandardDeviation(_) => Box::new(ControlVariateStandardDeviation),
        StatisticChoice::Margin(p) => Box::new(ControlVariateMargin::from(*p)),
        StatisticChoice::Probability(p) => Box::new(ControlVariateProbability::from(*p)),
    })
}

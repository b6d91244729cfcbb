use crate::build::BoxedEstimator;
use crate::build::BuildError;
use crate::config::{MarginParameters, ProbabilityParameters, StatisticChoice};
use crate::estimators::iterative::{
    IterativeMargin, IterativeMean, IterativeProbability, IterativeStandardDeviation,
    IterativeVariance, Observation,
};

impl From<MarginParameters> for IterativeMargin {
    fn from(p: MarginParameters) -> Self {
        IterativeMargin::new(p.factor)
    }
}

impl From<ProbabilityParameters> for IterativeProbability {
    fn from(p: ProbabilityParameters) -> Self {
        IterativeProbability::new(p.threshold, p.greater)
    }
}

/// Builds a fresh, unsized streaming estimator.
pub fn build_iterative_estimator(
    choice: &StatisticChoice,
) -> Result<BoxedEstimator<Observation>, BuildError> {
    Ok(match choice {
        StatisticChoice::Mean(_) => Box::new(IterativeMean::default()),
        StatisticChoice::Variance(_) => Box::new(IterativeVariance::default()),
        StatisticChoice::StandardDeviation(_) => Box::new(IterativeStandardDeviation::default()),
        StatisticChoice::Margin(p) => Box::new(IterativeMargin::from(*p)),
        StatisticChoice::Probability(p) => Box::new(IterativeProbability::from(*p)),
    })
}

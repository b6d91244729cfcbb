use crate::build::BoxedEstimator;
use crate::build::BuildError;
use crate::config::{MarginParameters, ProbabilityParameters, StatisticChoice};
use crate::estimators::sampling::{
    SampleBatch, SamplingMargin, SamplingMean, SamplingProbability, SamplingStandardDeviation,
    SamplingVariance,
};

impl From<MarginParameters> for SamplingMargin {
    fn from(p: MarginParameters) -> Self {
        SamplingMargin::new(p.factor)
    }
}

impl From<ProbabilityParameters> for SamplingProbability {
    fn from(p: ProbabilityParameters) -> Self {
        SamplingProbability::new(p.threshold, p.greater)
    }
}

pub fn build_sampling_estimator(
    choice: &StatisticChoice,
) -> Result<BoxedEstimator<SampleBatch>, BuildError> {
    Ok(match choice {
        StatisticChoice::Mean(_) => Box::new(SamplingMean),
        StatisticChoice::Variance(_) => Box::new(SamplingVariance),
        StatisticChoice::StandardDeviation(_) => Box::new(SamplingStandardDeviation),
        StatisticChoice::Margin(p) => Box::new(SamplingMargin::from(*p)),
        StatisticChoice::Probability(p) => Box::new(SamplingProbability::from(*p)),
    })
}

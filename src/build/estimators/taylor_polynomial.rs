use crate::build::BoxedEstimator;
use crate::build::BuildError;
use crate::config::{MarginParameters, StatisticChoice};
use crate::estimators::taylor_polynomial::{
    TaylorData, TaylorMargin, TaylorMean, TaylorStandardDeviation, TaylorVariance,
};

impl From<MarginParameters> for TaylorMargin {
    fn from(p: MarginParameters) -> Self {
        TaylorMargin::new(p.factor)
    }
}

pub fn build_taylor_estimator(
    choice: &StatisticChoice,
) -> Result<BoxedEstimator<TaylorData>, BuildError> {
    Ok(match choice {
        StatisticChoice::Mean(_) => Box::new(TaylorMean),
        StatisticChoice::Variance(_) => Box::new(TaylorVariance),
        StatisticChoice::StandardDeviation(_) => Box::new(TaylorStandardDeviation),
        StatisticChoice::Margin(p) => Box::new(TaylorMargin::from(*p)),
        StatisticChoice::Probability(_) => {
            return Err(BuildError::NotImplemented(
                "probability with the taylor-polynomial strategy",
            ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_is_not_available() {
        let r = build_taylor_estimator(&StatisticChoice::probability(0.0, true));
        assert!(matches!(r, Err(BuildError::NotImplemented(_))));
        assert!(build_taylor_estimator(&StatisticChoice::margin(1.0)).is_ok());
    }
}

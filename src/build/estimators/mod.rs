use strum::IntoEnumIterator;

use crate::config::{EstimationStrategy, StatisticKind};
use crate::estimators::StatisticEstimator;

mod control_variate;
mod iterative;
mod sampling;
mod taylor_polynomial;

pub use control_variate::build_control_variate_estimator;
pub use iterative::build_iterative_estimator;
pub use sampling::build_sampling_estimator;
pub use taylor_polynomial::build_taylor_estimator;

pub type BoxedEstimator<D> = Box<dyn StatisticEstimator<Data = D>>;

/// Statistics that `strategy` can estimate.
pub fn available_statistics(strategy: EstimationStrategy) -> Vec<StatisticKind> {
    StatisticKind::iter()
        .filter(|kind| {
            !matches!(
                (strategy, kind),
                (EstimationStrategy::TaylorPolynomial, StatisticKind::Probability)
            )
        })
        .collect()
}

pub mod control_variate;
mod estimator;
pub mod iterative;
pub mod sampling;
pub mod taylor_polynomial;

pub use estimator::StatisticEstimator;

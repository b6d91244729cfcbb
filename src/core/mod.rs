mod error;
pub mod model;
pub mod moments;
mod statistic;
pub mod uncertain_space;

pub use error::StatisticError;
pub use model::{FiniteDifferences, FnModel, Model, SECOND_ORDER_STEP};
pub use moments::{IterativeMoments, RunningCovariance};
pub use statistic::StatisticResult;
pub use uncertain_space::{IndependentNormal, IndependentUniform, UncertainSpace};

mod error;
mod estimators;
mod pilots;

pub use error::BuildError;

pub use estimators::{
    BoxedEstimator, available_statistics, build_control_variate_estimator,
    build_iterative_estimator, build_sampling_estimator, build_taylor_estimator,
};
pub use pilots::build_pilot;

//! Statistics of a model output as functions of the design variables.

mod engine;
mod problem;
mod statistic_function;

pub use engine::StatisticEngine;
pub use problem::{FixedDesign, RobustProblem};
pub use statistic_function::{Estimation, StatisticFunction};

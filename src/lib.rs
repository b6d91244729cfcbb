pub mod build;
pub mod config;
pub mod core;
pub mod estimators;
pub mod formulation;
pub mod multilevel;
pub mod sink;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

//! Multilevel Monte Carlo: levels of increasing fidelity, pilots that
//! telescope their contributions and the budget-driven sampling loop.

pub mod level;
mod mlmc;
mod pilot;
mod pilots;
mod variant;

pub use level::{Level, Surrogate};
pub use mlmc::Mlmc;
pub use pilot::{AllocationCriterion, Pilot, PilotReport, PilotSetup, optimal_allocation};
pub use pilots::{MeanPilot, MlcvMeanPilot, VariancePilot};
pub use variant::MlcvVariant;

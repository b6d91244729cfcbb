use crate::config::Choice;
use crate::core::model::DEFAULT_FD_STEP;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

const DEFAULT_SEED: u64 = 42;
fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_n_samples() -> usize {
    100
}

fn default_initial_n_samples() -> usize {
    2
}

fn default_n_samples_increment() -> usize {
    1
}

fn default_n_reference_samples() -> usize {
    10_000
}

fn default_fd_step() -> f64 {
    DEFAULT_FD_STEP
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SamplingParameters {
    #[serde(default = "default_n_samples")]
    #[schemars(
        title = "Samples",
        description = "Number of model evaluations per estimation",
        range(min = 1),
        default = "default_n_samples"
    )]
    pub n_samples: usize,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for SamplingParameters {
    fn default() -> Self {
        Self {
            n_samples: default_n_samples(),
            seed: default_seed(),
        }
    }
}

/// Sampling whose sample size grows by `n_samples_increment` at every outer
/// iteration, from `initial_n_samples` up to `n_samples`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SequentialSamplingParameters {
    #[serde(default = "default_initial_n_samples")]
    #[schemars(
        title = "Initial Samples",
        description = "Sample size at the first iteration",
        range(min = 1),
        default = "default_initial_n_samples"
    )]
    pub initial_n_samples: usize,

    #[serde(default = "default_n_samples")]
    #[schemars(
        title = "Samples",
        description = "Largest sample size",
        range(min = 1),
        default = "default_n_samples"
    )]
    pub n_samples: usize,

    #[serde(default = "default_n_samples_increment")]
    #[schemars(
        title = "Increment",
        description = "Sample size added at each new iteration",
        range(min = 1),
        default = "default_n_samples_increment"
    )]
    pub n_samples_increment: usize,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl SequentialSamplingParameters {
    /// Sample size used at outer iteration `iteration` (counted from 1).
    pub fn n_samples_at(&self, iteration: usize) -> usize {
        let grown = self
            .n_samples_increment
            .saturating_mul(iteration.saturating_sub(1))
            .saturating_add(self.initial_n_samples);
        grown.min(self.n_samples)
    }
}

impl Default for SequentialSamplingParameters {
    fn default() -> Self {
        Self {
            initial_n_samples: default_initial_n_samples(),
            n_samples: default_n_samples(),
            n_samples_increment: default_n_samples_increment(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ControlVariateParameters {
    #[serde(default = "default_n_samples")]
    #[schemars(
        title = "Samples",
        description = "Number of high-fidelity evaluations per estimation",
        range(min = 2),
        default = "default_n_samples"
    )]
    pub n_samples: usize,

    #[serde(default = "default_n_reference_samples")]
    #[schemars(
        title = "Reference Samples",
        description = "Surrogate draws used to approximate the mean of a probability control variate",
        range(min = 1),
        default = "default_n_reference_samples"
    )]
    pub n_reference_samples: usize,

    #[serde(default = "default_fd_step")]
    #[schemars(
        title = "Finite-Difference Step",
        description = "Step used to differentiate the statistic w.r.t. the design",
        default = "default_fd_step"
    )]
    pub fd_step: f64,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for ControlVariateParameters {
    fn default() -> Self {
        Self {
            n_samples: default_n_samples(),
            n_reference_samples: default_n_reference_samples(),
            fd_step: default_fd_step(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaylorPolynomialParameters {
    #[serde(default)]
    #[schemars(
        title = "Second Order",
        description = "Add the Hessian correction to the mean"
    )]
    pub second_order: bool,

    #[serde(default = "default_fd_step")]
    #[schemars(
        title = "Finite-Difference Step",
        description = "Relative step of the central differences giving Hessians and design Jacobians, raised to 2^-13 when smaller",
        default = "default_fd_step"
    )]
    pub fd_step: f64,
}

impl Default for TaylorPolynomialParameters {
    fn default() -> Self {
        Self {
            second_order: false,
            fd_step: default_fd_step(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(EstimationStrategy))]
#[strum_discriminants(derive(Hash, EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case", ascii_case_insensitive))]
pub enum StrategyChoice {
    #[strum_discriminants(strum(
        message = "Sampling",
        detailed_message = "Monte Carlo estimation over a fresh sample batch."
    ))]
    Sampling(SamplingParameters),

    #[strum_discriminants(strum(
        message = "Iterative sampling",
        detailed_message = "Monte Carlo estimation from running moments, without storing samples."
    ))]
    IterativeSampling(SamplingParameters),

    #[strum_discriminants(strum(
        message = "Sequential sampling",
        detailed_message = "Monte Carlo estimation whose sample size grows with the outer iterations."
    ))]
    SequentialSampling(SequentialSamplingParameters),

    #[strum_discriminants(strum(
        message = "Control variate",
        detailed_message = "Monte Carlo corrected by a first-order Taylor surrogate with known moments."
    ))]
    ControlVariate(ControlVariateParameters),

    #[strum_discriminants(strum(
        message = "Taylor polynomial",
        detailed_message = "Delta method around the mean of the uncertain inputs, no sampling."
    ))]
    TaylorPolynomial(TaylorPolynomialParameters),
}

impl Choice for StrategyChoice {
    type Kind = EstimationStrategy;

    fn schema() -> Schema {
        schema_for!(StrategyChoice)
    }

    fn default_params(kind: Self::Kind) -> anyhow::Result<Value> {
        Ok(match kind {
            EstimationStrategy::Sampling | EstimationStrategy::IterativeSampling => {
                serde_json::to_value(SamplingParameters::default())?
            }
            EstimationStrategy::SequentialSampling => {
                serde_json::to_value(SequentialSamplingParameters::default())?
            }
            EstimationStrategy::ControlVariate => {
                serde_json::to_value(ControlVariateParameters::default())?
            }
            EstimationStrategy::TaylorPolynomial => {
                serde_json::to_value(TaylorPolynomialParameters::default())?
            }
        })
    }

    fn kind(&self) -> Self::Kind {
        EstimationStrategy::from(self)
    }
}

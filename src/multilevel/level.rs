use std::time::Instant;

use log::debug;
use ndarray::ArrayView1;
use rand::RngCore;

use crate::core::{Model, StatisticError, UncertainSpace};

pub const DEFAULT_N_INITIAL_SAMPLES: usize = 10;
pub const DEFAULT_SAMPLING_RATIO: f64 = 2.0;
pub const DEFAULT_N_COST_ESTIMATION_SAMPLES: usize = 1;

/// Smallest per-call cost kept after timing, so that normalized costs stay finite.
const MIN_ESTIMATED_COST: f64 = 1e-12;

/// A cheap model with a known mean, used as a control variate.
pub struct Surrogate {
    pub model: Box<dyn Model>,
    pub mean: f64,
}

impl Surrogate {
    pub fn new(model: impl Model + 'static, mean: f64) -> Self {
        Self {
            model: Box::new(model),
            mean,
        }
    }
}

/// First component of `model(input)`; multilevel estimation works on scalars.
pub(crate) fn scalar_output(
    model: &dyn Model,
    input: ArrayView1<'_, f64>,
) -> Result<f64, StatisticError> {
    model
        .evaluate(input)?
        .first()
        .copied()
        .ok_or(StatisticError::EmptySample)
}

/// One fidelity tier `f[ℓ]` of a multilevel hierarchy.
pub struct Level {
    model: Box<dyn Model>,
    cost: Option<f64>,
    n_cost_estimation_samples: usize,
    n_initial_samples: usize,
    sampling_ratio: f64,
    n_samples: usize,
    surrogate: Option<Surrogate>,
    difference_surrogate: Option<Surrogate>,
}

impl Level {
    pub fn new(model: impl Model + 'static) -> Self {
        Self {
            model: Box::new(model),
            cost: None,
            n_cost_estimation_samples: DEFAULT_N_COST_ESTIMATION_SAMPLES,
            n_initial_samples: DEFAULT_N_INITIAL_SAMPLES,
            sampling_ratio: DEFAULT_SAMPLING_RATIO,
            n_samples: DEFAULT_N_INITIAL_SAMPLES,
            surrogate: None,
            difference_surrogate: None,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_n_cost_estimation_samples(mut self, n: usize) -> Self {
        self.n_cost_estimation_samples = n;
        self
    }

    pub fn with_n_initial_samples(mut self, n: usize) -> Self {
        self.n_initial_samples = n;
        self.n_samples = n;
        self
    }

    pub fn with_sampling_ratio(mut self, ratio: f64) -> Self {
        self.sampling_ratio = ratio;
        self
    }

    /// Surrogate `g[ℓ] ≈ f[ℓ]` with its known mean.
    pub fn with_surrogate(mut self, model: impl Model + 'static, mean: f64) -> Self {
        self.surrogate = Some(Surrogate::new(model, mean));
        self
    }

    /// Surrogate `h[ℓ] ≈ f[ℓ] - f[ℓ-1]` with its known mean; unused at level 0.
    pub fn with_difference_surrogate(mut self, model: impl Model + 'static, mean: f64) -> Self {
        self.difference_surrogate = Some(Surrogate::new(model, mean));
        self
    }

    pub fn validate(&self) -> Result<(), StatisticError> {
        if self.n_initial_samples == 0 {
            return Err(StatisticError::InvalidParameter(
                "n_initial_samples must be at least 1".into(),
            ));
        }
        if !(self.sampling_ratio.is_finite() && self.sampling_ratio > 1.0) {
            return Err(StatisticError::InvalidParameter(format!(
                "sampling_ratio must be greater than 1, got {}",
                self.sampling_ratio
            )));
        }
        if let Some(cost) = self.cost {
            if !(cost.is_finite() && cost > 0.0) {
                return Err(StatisticError::InvalidParameter(format!(
                    "cost must be positive, got {cost}"
                )));
            }
        }
        if self.cost.is_none() && self.n_cost_estimation_samples == 0 {
            return Err(StatisticError::InvalidParameter(
                "n_cost_estimation_samples must be at least 1 when the cost is unknown".into(),
            ));
        }
        Ok(())
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn cost(&self) -> Option<f64> {
        self.cost
    }

    /// Returns the cost, timing `n_cost_estimation_samples` calls the first
    /// time it is needed if it was not given.
    pub fn resolve_cost(
        &mut self,
        space: &dyn UncertainSpace,
        rng: &mut dyn RngCore,
    ) -> Result<f64, StatisticError> {
        if let Some(cost) = self.cost {
            return Ok(cost);
        }
        let inputs = space.draw(rng, self.n_cost_estimation_samples);
        let start = Instant::now();
        for row in inputs.rows() {
            self.model.evaluate(row)?;
        }
        let elapsed = start.elapsed().as_secs_f64();
        let cost = (elapsed / self.n_cost_estimation_samples as f64).max(MIN_ESTIMATED_COST);
        debug!(
            "estimated level cost {cost:e}s from {} calls",
            self.n_cost_estimation_samples
        );
        self.cost = Some(cost);
        Ok(cost)
    }

    pub fn n_initial_samples(&self) -> usize {
        self.n_initial_samples
    }

    /// Total number of samples requested so far.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn sampling_ratio(&self) -> f64 {
        self.sampling_ratio
    }

    /// `⌊(r - 1) n⌋`, the increment applied when this level is refined.
    pub fn next_increment(&self) -> usize {
        ((self.sampling_ratio - 1.0) * self.n_samples as f64).floor() as usize
    }

    pub(crate) fn grow(&mut self, increment: usize) {
        self.n_samples += increment;
    }

    pub fn surrogate(&self) -> Option<&Surrogate> {
        self.surrogate.as_ref()
    }

    pub fn difference_surrogate(&self) -> Option<&Surrogate> {
        self.difference_surrogate.as_ref()
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("cost", &self.cost)
            .field("n_initial_samples", &self.n_initial_samples)
            .field("n_samples", &self.n_samples)
            .field("sampling_ratio", &self.sampling_ratio)
            .field("surrogate", &self.surrogate.as_ref().map(|s| s.mean))
            .field(
                "difference_surrogate",
                &self.difference_surrogate.as_ref().map(|s| s.mean),
            )
            .finish()
    }
}

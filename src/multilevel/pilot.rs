use ndarray::{Array1, ArrayView2};

use crate::core::StatisticError;

/// What a pilot tells the sampling loop after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct PilotReport {
    /// Level whose refinement is expected to pay off most.
    pub next_level: usize,
    /// Current telescoping-sum estimate of the statistic.
    pub statistic: f64,
    /// Per-level variance contributions `V_ℓ`; NaN where not yet estimable.
    pub term_variances: Array1<f64>,
}

/// Sampling ratios and level costs shared by every pilot.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationCriterion {
    sampling_ratios: Array1<f64>,
    costs: Array1<f64>,
}

impl AllocationCriterion {
    /// `costs[ℓ]` is the cost of one sample of term `ℓ`, i.e. `C_ℓ + C_{ℓ-1}`.
    pub fn new(sampling_ratios: Vec<f64>, costs: Vec<f64>) -> Result<Self, StatisticError> {
        if sampling_ratios.len() != costs.len() {
            return Err(StatisticError::DimensionMismatch {
                expected: sampling_ratios.len(),
                found: costs.len(),
            });
        }
        if sampling_ratios.is_empty() {
            return Err(StatisticError::InvalidParameter(
                "at least one level is required".into(),
            ));
        }
        Ok(Self {
            sampling_ratios: Array1::from(sampling_ratios),
            costs: Array1::from(costs),
        })
    }

    pub fn n_levels(&self) -> usize {
        self.costs.len()
    }

    pub fn costs(&self) -> &Array1<f64> {
        &self.costs
    }

    pub fn sampling_ratios(&self) -> &Array1<f64> {
        &self.sampling_ratios
    }

    /// `argmax_ℓ V_ℓ / (r_ℓ n_ℓ² c_ℓ)`. A level whose `V_ℓ` is still NaN wins
    /// outright (the first one if several).
    pub fn next_level(&self, term_variances: &Array1<f64>, n_samples: &[usize]) -> usize {
        if let Some(level) = term_variances.iter().position(|v| v.is_nan()) {
            return level;
        }
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (level, &v) in term_variances.iter().enumerate() {
            let n = n_samples.get(level).copied().unwrap_or(0) as f64;
            let score = v / self.sampling_ratios[level] / n / n / self.costs[level];
            if score > best_score {
                best = level;
                best_score = score;
            }
        }
        best
    }
}

/// Everything a pilot is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PilotSetup {
    pub sampling_ratios: Vec<f64>,
    /// Cost of one sample of each telescoping term.
    pub level_costs: Vec<f64>,
    /// Known means of the surrogates `g[ℓ]`, one per level.
    pub g_means: Vec<f64>,
    /// Known means of the difference surrogates `h[ℓ]`, one per level `ℓ > 0`.
    pub h_means: Vec<f64>,
}

impl PilotSetup {
    pub fn new(sampling_ratios: Vec<f64>, level_costs: Vec<f64>) -> Self {
        Self {
            sampling_ratios,
            level_costs,
            ..Self::default()
        }
    }

    pub fn with_surrogate_means(mut self, g_means: Vec<f64>, h_means: Vec<f64>) -> Self {
        self.g_means = g_means;
        self.h_means = h_means;
        self
    }

    pub(crate) fn criterion(&self) -> Result<AllocationCriterion, StatisticError> {
        AllocationCriterion::new(self.sampling_ratios.clone(), self.level_costs.clone())
    }
}

/// Telescoping-sum estimator driving multilevel sampling.
///
/// Each sample row of level `ℓ` is `[f[ℓ](x), f[ℓ-1](x), s_1(x), …]` where
/// `f[-1] = 0` and the optional trailing columns are surrogate outputs.
pub trait Pilot {
    fn criterion(&self) -> &AllocationCriterion;

    fn n_levels(&self) -> usize {
        self.criterion().n_levels()
    }

    /// Number of columns expected for `level`.
    fn width(&self, level: usize) -> usize;

    /// Adds already validated samples of one level to the running summaries.
    fn ingest(&mut self, level: usize, samples: ArrayView2<'_, f64>) -> Result<(), StatisticError>;

    /// Samples accumulated per level.
    fn n_samples(&self) -> Vec<usize>;

    fn statistic(&self) -> f64;

    fn term_variances(&self) -> Array1<f64>;

    fn check(&self, level: usize, samples: &ArrayView2<'_, f64>) -> Result<(), StatisticError> {
        if level >= self.n_levels() {
            return Err(StatisticError::InvalidParameter(format!(
                "level {level} out of range for {} levels",
                self.n_levels()
            )));
        }
        if samples.ncols() != self.width(level) {
            return Err(StatisticError::DimensionMismatch {
                expected: self.width(level),
                found: samples.ncols(),
            });
        }
        Ok(())
    }

    /// Ingests newly drawn samples of some levels and reports the next level
    /// to refine. Nothing is ingested if any batch has the wrong shape.
    fn step(
        &mut self,
        batches: &[(usize, ArrayView2<'_, f64>)],
    ) -> Result<PilotReport, StatisticError> {
        for (level, samples) in batches {
            self.check(*level, samples)?;
        }
        for (level, samples) in batches {
            self.ingest(*level, samples.view())?;
        }
        let term_variances = self.term_variances();
        Ok(PilotReport {
            next_level: self
                .criterion()
                .next_level(&term_variances, &self.n_samples()),
            statistic: self.statistic(),
            term_variances,
        })
    }
}

/// Sample sizes `n_ℓ ∝ sqrt(V_ℓ / c_ℓ)` spending `budget` in total, the
/// classical optimal allocation for a telescoping sum.
pub fn optimal_allocation(
    term_variances: &Array1<f64>,
    costs: &Array1<f64>,
    budget: f64,
) -> Result<Array1<f64>, StatisticError> {
    if term_variances.len() != costs.len() {
        return Err(StatisticError::DimensionMismatch {
            expected: costs.len(),
            found: term_variances.len(),
        });
    }
    let normalization: f64 = term_variances
        .iter()
        .zip(costs)
        .map(|(v, c)| (v * c).sqrt())
        .sum();
    if !(normalization.is_finite() && normalization > 0.0) {
        return Err(StatisticError::InvalidParameter(
            "term variances and costs must be finite and not all zero".into(),
        ));
    }
    Ok(ndarray::Zip::from(term_variances)
        .and(costs)
        .map_collect(|v, c| budget * (v / c).sqrt() / normalization))
}

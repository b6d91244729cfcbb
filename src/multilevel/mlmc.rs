//! Budget-driven multilevel Monte Carlo sampling loop.
//!
//! Every level is sampled with its initial size, then a [`Pilot`] repeatedly
//! picks the level `ℓ*` whose refinement is most worthwhile, its sample size
//! grows by `⌊(r - 1) n⌋` and only that level is sampled again, until the
//! budget is spent. Costs are normalized so that one evaluation of the finest
//! model costs 1; the budget is expressed in that unit.

use std::fmt;

use log::info;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::build::{BuildError, build_pilot};
use crate::config::{PilotChoice, PilotKind};
use crate::core::{StatisticError, UncertainSpace};
use crate::multilevel::level::scalar_output;
use crate::multilevel::{Level, MlcvVariant, Pilot, PilotSetup, Surrogate};

pub struct Mlmc {
    name: String,
    levels: Vec<Level>,
    space: Box<dyn UncertainSpace>,
    pilot: Box<dyn Pilot>,
    pilot_kind: PilotKind,
    variant: Option<MlcvVariant>,
    model_costs: Array1<f64>,
    level_costs: Array1<f64>,
    seed: u64,
    total_budget: f64,
    current_budget: f64,
    minimum_budget: f64,
    n_total: Vec<usize>,
    sampling_history: Vec<Vec<usize>>,
    budget_history: Vec<f64>,
    statistic: Option<f64>,
}

impl Mlmc {
    /// `levels` go from the coarsest to the finest model. Missing level costs
    /// are estimated here by timing model calls.
    pub fn new(
        mut levels: Vec<Level>,
        space: Box<dyn UncertainSpace>,
        budget: f64,
        pilot: &PilotChoice,
        seed: u64,
    ) -> Result<Self, BuildError> {
        if levels.is_empty() {
            return Err(BuildError::InvalidParameter(
                "at least one level is required".into(),
            ));
        }
        if !(budget.is_finite() && budget > 0.0) {
            return Err(BuildError::InvalidParameter(format!(
                "budget must be positive, got {budget}"
            )));
        }
        for (index, level) in levels.iter().enumerate() {
            level.validate()?;
            if level.model().input_dimension() != space.dimension() {
                return Err(BuildError::InvalidParameter(format!(
                    "model of level {index} takes {} inputs, the uncertain space has {}",
                    level.model().input_dimension(),
                    space.dimension()
                )));
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let costs = levels
            .iter_mut()
            .map(|level| level.resolve_cost(&*space, &mut rng))
            .collect::<Result<Vec<_>, _>>()?;
        let finest = costs[costs.len() - 1];
        let model_costs = Array1::from_iter(costs.iter().map(|c| c / finest));
        let level_costs = Array1::from_iter(
            (0..model_costs.len())
                .map(|l| model_costs[l] + if l > 0 { model_costs[l - 1] } else { 0.0 }),
        );

        let delta_n: Vec<usize> = levels.iter().map(Level::n_initial_samples).collect();
        let minimum_budget: f64 = delta_n
            .iter()
            .zip(&level_costs)
            .map(|(&n, c)| n as f64 * c)
            .sum();
        if minimum_budget > budget {
            return Err(StatisticError::BudgetTooSmall {
                required: minimum_budget,
                available: budget,
            }
            .into());
        }

        let variant = match pilot {
            PilotChoice::MlcvMean(p) => Some(p.variant),
            _ => None,
        };
        let mut setup = PilotSetup::new(
            levels.iter().map(Level::sampling_ratio).collect(),
            level_costs.to_vec(),
        );
        if let Some(variant) = variant {
            setup = setup.with_surrogate_means(
                levels
                    .iter()
                    .map(|l| l.surrogate().map_or(f64::NAN, |s| s.mean))
                    .collect(),
                levels[1..]
                    .iter()
                    .map(|l| l.difference_surrogate().map_or(f64::NAN, |s| s.mean))
                    .collect(),
            );
            for level in 0..levels.len() {
                surrogates(&levels, variant, level)?;
            }
        }

        let mlmc = Self {
            name: variant.map_or_else(|| "MLMC".to_string(), |v| v.to_string()),
            pilot: build_pilot(pilot, &setup)?,
            pilot_kind: PilotKind::from(pilot),
            variant,
            model_costs,
            level_costs,
            seed,
            total_budget: budget,
            current_budget: budget,
            minimum_budget,
            n_total: delta_n.clone(),
            sampling_history: vec![delta_n],
            budget_history: Vec::new(),
            statistic: None,
            levels,
            space,
        };
        info!("{mlmc}");
        Ok(mlmc)
    }

    /// Runs the sampling loop and returns the pilot statistic. A second call
    /// returns the previous estimate.
    ///
    /// Sample counts, histories, budget and seed only change once the pilot
    /// has ingested the new samples, so an error leaves them as they were.
    pub fn execute(&mut self) -> Result<f64, StatisticError> {
        if let Some(statistic) = self.statistic {
            return Ok(statistic);
        }
        let mut to_sample: Vec<usize> = (0..self.levels.len()).collect();
        let mut delta_n: Vec<usize> = self.levels.iter().map(Level::n_initial_samples).collect();
        let mut growth: Option<(usize, usize)> = None;
        let mut is_last_iteration = false;
        let mut iteration = 0;
        let mut statistic = f64::NAN;
        info!("start sampling with a total budget of {}", self.total_budget);
        while self.current_budget >= 0.0 {
            iteration += 1;
            if is_last_iteration {
                info!("iteration #{iteration} (last iteration)");
            } else {
                info!("iteration #{iteration}");
            }
            let batches = self.compute_samples(&to_sample, &delta_n)?;
            let views: Vec<_> = batches.iter().map(|(l, s)| (*l, s.view())).collect();
            let report = self.pilot.step(&views)?;
            self.commit(&delta_n, growth, to_sample.len());
            statistic = report.statistic;
            if is_last_iteration {
                break;
            }

            let l_star = report.next_level;
            let cost = self.level_costs[l_star];
            let mut delta = self.levels[l_star].next_increment().max(1);
            info!(
                "next level {l_star}: {delta} more samples, {} in total",
                self.n_total[l_star] + delta
            );
            let posterior_budget = self.current_budget - delta as f64 * cost;
            if posterior_budget < 0.0 {
                info!(
                    "maximum budget exceeded by {}, shrinking the increment",
                    -posterior_budget
                );
                is_last_iteration = true;
                delta = (delta as f64 + posterior_budget / cost).max(0.0).floor() as usize;
                if delta == 0 {
                    info!("stop: sampling level {l_star} again is too expensive");
                    break;
                }
            }
            to_sample = vec![l_star];
            delta_n = vec![0; self.levels.len()];
            delta_n[l_star] = delta;
            growth = Some((l_star, delta));
        }
        self.statistic = Some(statistic);
        self.log_results();
        Ok(statistic)
    }

    /// Samples `delta_n[ℓ]` rows of every level in `to_sample`, the `k`-th
    /// one with seed `seed + k + 1`.
    fn compute_samples(
        &self,
        to_sample: &[usize],
        delta_n: &[usize],
    ) -> Result<Vec<(usize, Array2<f64>)>, StatisticError> {
        to_sample
            .iter()
            .zip(1..)
            .map(|(&level, offset)| -> Result<_, StatisticError> {
                let seed = self.seed.wrapping_add(offset);
                Ok((level, self.sample_level(level, delta_n[level], seed)?))
            })
            .collect()
    }

    /// Records an iteration whose samples reached the pilot.
    fn commit(&mut self, delta_n: &[usize], growth: Option<(usize, usize)>, n_sampled: usize) {
        self.seed = self.seed.wrapping_add(n_sampled as u64);
        let cost: f64 = delta_n
            .iter()
            .zip(&self.level_costs)
            .map(|(&n, c)| n as f64 * c)
            .sum();
        self.budget_history.push(self.current_budget);
        self.current_budget -= cost;
        if let Some((level, delta)) = growth {
            self.levels[level].grow(delta);
            self.n_total[level] += delta;
            self.sampling_history.push(delta_n.to_vec());
        }
        info!(
            "sampled {delta_n:?} at cost {cost}, remaining budget {}",
            self.current_budget
        );
    }

    /// Rows `[f[ℓ](x), f[ℓ-1](x), s_1(x), …]` on `n` shared draws `x`.
    fn sample_level(&self, level: usize, n: usize, seed: u64) -> Result<Array2<f64>, StatisticError> {
        let surrogates = match self.variant {
            Some(variant) => surrogates(&self.levels, variant, level)?,
            None => Vec::new(),
        };
        let inputs = self.space.draw(&mut StdRng::seed_from_u64(seed), n);
        let mut samples = Array2::zeros((n, 2 + surrogates.len()));
        for (input, mut row) in inputs.rows().into_iter().zip(samples.rows_mut()) {
            row[0] = scalar_output(self.levels[level].model(), input)?;
            if level > 0 {
                row[1] = scalar_output(self.levels[level - 1].model(), input)?;
            }
            for (column, surrogate) in surrogates.iter().enumerate() {
                row[2 + column] = scalar_output(surrogate.model.as_ref(), input)?;
            }
        }
        Ok(samples)
    }

    fn log_results(&self) {
        info!("sampling completed");
        info!("pilot statistic = {:?}", self.statistic);
        let costs: Vec<f64> = self
            .n_total
            .iter()
            .zip(&self.level_costs)
            .map(|(&n, c)| n as f64 * c)
            .collect();
        let total: f64 = costs.iter().sum();
        info!("total cost = {total}");
        let variances = self.pilot.term_variances();
        for (level, (n, cost)) in self.n_total.iter().zip(&costs).enumerate() {
            info!(
                "level {level}: n = {n}, {:.1}% of the cost, V = {:.2e}",
                100.0 * cost / total,
                variances[level]
            );
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// `None` until [`Mlmc::execute`] has run.
    pub fn pilot_statistic_estimation(&self) -> Option<f64> {
        self.statistic
    }

    /// `sampling_history()[i][ℓ]` is the number of samples added to level `ℓ`
    /// at iteration `i + 1`.
    pub fn sampling_history(&self) -> &[Vec<usize>] {
        &self.sampling_history
    }

    /// Remaining budget at the start of each iteration.
    pub fn budget_history(&self) -> &[f64] {
        &self.budget_history
    }

    pub fn n_total_samples(&self) -> &[usize] {
        &self.n_total
    }

    /// Normalized cost of one evaluation of each model.
    pub fn model_costs(&self) -> &Array1<f64> {
        &self.model_costs
    }

    /// Cost of one sample of each telescoping term.
    pub fn level_costs(&self) -> &Array1<f64> {
        &self.level_costs
    }

    pub fn minimum_budget(&self) -> f64 {
        self.minimum_budget
    }

    pub fn term_variances(&self) -> Array1<f64> {
        self.pilot.term_variances()
    }
}

/// Surrogates sampled at `level`, in the order the pilot expects them.
fn surrogates(
    levels: &[Level],
    variant: MlcvVariant,
    level: usize,
) -> Result<Vec<&Surrogate>, StatisticError> {
    variant
        .surrogate_positions(level, levels.len())
        .map(|position| {
            let found = if level == 0 {
                levels.get(position).and_then(Level::surrogate)
            } else {
                levels.get(position + 1).and_then(Level::difference_surrogate)
            };
            found.ok_or_else(|| {
                let name = if level == 0 {
                    format!("g[{position}]")
                } else {
                    format!("h[{}]", position + 1)
                };
                StatisticError::InvalidParameter(format!(
                    "{variant} needs surrogate {name} to sample level {level}"
                ))
            })
        })
        .collect()
}

impl fmt::Display for Mlmc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm {}", self.name)?;
        writeln!(f, "   Number of levels: {}", self.levels.len())?;
        writeln!(f, "   Pilot statistic: {}", self.pilot_kind)?;
        writeln!(f, "   Budget")?;
        writeln!(f, "      Minimum: {}", self.minimum_budget)?;
        writeln!(f, "      Maximum: {}", self.total_budget)?;
        writeln!(f, "   Numbers of initial samples")?;
        for (level, n) in self.sampling_history[0].iter().enumerate() {
            writeln!(f, "      n_{level} = {n}")?;
        }
        writeln!(f, "   Evaluation costs of the models")?;
        for (level, cost) in self.model_costs.iter().enumerate() {
            writeln!(f, "      C_{level} = {cost}")?;
        }
        writeln!(f, "   Evaluation costs of the levels")?;
        for (level, cost) in self.level_costs.iter().enumerate() {
            if level == 0 {
                writeln!(f, "      C_0 = {cost}")?;
            } else {
                writeln!(f, "      C_{level} + C_{} = {cost}", level - 1)?;
            }
        }
        writeln!(f, "   Sampling ratios")?;
        for (level, l) in self.levels.iter().enumerate() {
            write!(f, "      r_{level} = {}", l.sampling_ratio())?;
            if level + 1 < self.levels.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MlcvParameters;
    use crate::core::{FnModel, IndependentNormal};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::cell::Cell;
    use std::rc::Rc;

    fn space() -> Box<dyn UncertainSpace> {
        Box::new(IndependentNormal::standard(1).unwrap())
    }

    /// `f[ℓ](x) = x + x² / 2^(ℓ+1)`.
    fn level(l: i32, cost: f64, n_initial: usize) -> Level {
        let weight = 0.5f64.powi(l + 1);
        Level::new(FnModel::new(1, 1, move |x| array![x[0] + weight * x[0] * x[0]]))
            .with_cost(cost)
            .with_n_initial_samples(n_initial)
    }

    fn mean_pilot() -> PilotChoice {
        PilotChoice::Mean(Default::default())
    }

    #[test]
    fn budget_below_the_initial_allocation_is_rejected() {
        let levels = vec![level(0, 1.0, 10), level(1, 4.0, 10)];
        let r = Mlmc::new(levels, space(), 10.0, &mean_pilot(), 0);
        assert!(matches!(
            r,
            Err(BuildError::Statistic(StatisticError::BudgetTooSmall { .. }))
        ));
    }

    #[test]
    fn costs_are_normalized_by_the_finest_model() {
        let levels = vec![level(0, 1.0, 2), level(1, 2.0, 2), level(2, 4.0, 2)];
        let mlmc = Mlmc::new(levels, space(), 100.0, &mean_pilot(), 0).unwrap();
        assert_abs_diff_eq!(*mlmc.model_costs(), array![0.25, 0.5, 1.0]);
        assert_abs_diff_eq!(*mlmc.level_costs(), array![0.25, 0.75, 1.5]);
        assert_abs_diff_eq!(mlmc.minimum_budget(), 5.0);
        assert!(mlmc.to_string().starts_with("Algorithm MLMC"));
    }

    #[test]
    fn single_level_reduces_to_monte_carlo() {
        let mut mlmc = Mlmc::new(vec![level(0, 1.0, 10)], space(), 10.0, &mean_pilot(), 0).unwrap();
        let statistic = mlmc.execute().unwrap();

        let inputs = IndependentNormal::standard(1)
            .unwrap()
            .draw(&mut StdRng::seed_from_u64(1), 10);
        let expected =
            inputs.column(0).iter().map(|x| x + 0.5 * x * x).sum::<f64>() / 10.0;
        assert_abs_diff_eq!(statistic, expected, epsilon = 1e-12);
        assert_eq!(mlmc.sampling_history(), &[vec![10]]);
        assert_eq!(mlmc.n_total_samples(), &[10]);
    }

    #[test]
    fn histories_account_for_every_sample() {
        let levels = vec![level(0, 1.0, 4), level(1, 2.0, 4), level(2, 4.0, 4)];
        let mut mlmc = Mlmc::new(levels, space(), 100.0, &mean_pilot(), 3).unwrap();
        let statistic = mlmc.execute().unwrap();
        assert!(statistic.is_finite());
        assert_eq!(mlmc.pilot_statistic_estimation(), Some(statistic));

        let mut totals = vec![0; 3];
        for row in mlmc.sampling_history() {
            for (total, n) in totals.iter_mut().zip(row) {
                *total += n;
            }
        }
        assert_eq!(totals, mlmc.n_total_samples());
        for (level, n) in mlmc.levels().iter().zip(mlmc.n_total_samples()) {
            assert_eq!(level.n_samples(), *n);
        }

        let budgets = mlmc.budget_history();
        assert_eq!(budgets[0], 100.0);
        assert!(budgets.windows(2).all(|w| w[1] < w[0]));
        let spent: f64 = mlmc
            .n_total_samples()
            .iter()
            .zip(mlmc.level_costs())
            .map(|(&n, c)| n as f64 * c)
            .sum();
        assert!(spent <= 100.0 + 1e-9);
        assert_eq!(mlmc.execute().unwrap(), statistic);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let levels = vec![level(0, 1.0, 4), level(1, 3.0, 4)];
            let mut mlmc = Mlmc::new(levels, space(), 60.0, &mean_pilot(), 11).unwrap();
            let statistic = mlmc.execute().unwrap();
            (statistic, mlmc.sampling_history().to_vec())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn failed_iteration_leaves_the_counts_untouched() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let model = FnModel::new(1, 1, move |x| {
            counter.set(counter.get() + 1);
            if counter.get() > 4 {
                Array1::zeros(0)
            } else {
                array![x[0]]
            }
        });
        let levels = vec![Level::new(model).with_cost(1.0).with_n_initial_samples(4)];
        let mut mlmc = Mlmc::new(levels, space(), 100.0, &mean_pilot(), 0).unwrap();

        assert!(matches!(
            mlmc.execute(),
            Err(StatisticError::DimensionMismatch { .. })
        ));
        assert!(calls.get() > 4);
        assert_eq!(mlmc.n_total_samples(), &[4]);
        assert_eq!(mlmc.sampling_history(), &[vec![4]]);
        assert_eq!(mlmc.levels()[0].n_samples(), 4);
        assert_eq!(mlmc.budget_history(), &[100.0]);
        assert_eq!(mlmc.pilot_statistic_estimation(), None);
    }

    #[test]
    fn variance_pilot_runs() {
        let levels = vec![level(0, 1.0, 5), level(1, 3.0, 5)];
        let mut mlmc = Mlmc::new(
            levels,
            space(),
            50.0,
            &PilotChoice::Variance(Default::default()),
            0,
        )
        .unwrap();
        assert!(mlmc.execute().unwrap().is_finite());
        assert_eq!(mlmc.term_variances().len(), 2);
    }

    fn mlcv_levels() -> Vec<Level> {
        let identity = || FnModel::new(1, 1, |x| array![x[0]]);
        vec![
            level(0, 1.0, 5).with_surrogate(identity(), 0.0),
            level(1, 4.0, 5)
                .with_surrogate(FnModel::new(1, 1, |x| array![x[0] + 0.25 * x[0] * x[0]]), 0.25)
                .with_difference_surrogate(FnModel::new(1, 1, |x| array![-0.25 * x[0] * x[0]]), -0.25),
        ]
    }

    #[test]
    fn mlcv_driver_samples_surrogates() {
        let choice = PilotChoice::MlcvMean(MlcvParameters {
            variant: MlcvVariant::MlmcMlcv,
        });
        let mut mlmc = Mlmc::new(mlcv_levels(), space(), 40.0, &choice, 5).unwrap();
        assert_eq!(mlmc.name(), "MLMC-MLCV");
        let statistic = mlmc.execute().unwrap();
        assert!(statistic.is_finite());
        // h[1] is exact, so the level-1 correction removes all variance.
        assert_abs_diff_eq!(mlmc.term_variances()[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn mlcv_driver_requires_the_surrogates_it_samples() {
        let levels = vec![level(0, 1.0, 5), level(1, 4.0, 5)];
        let choice = PilotChoice::MlcvMean(MlcvParameters {
            variant: MlcvVariant::MlmcCv,
        });
        assert!(Mlmc::new(levels, space(), 40.0, &choice, 0).is_err());
    }

    #[test]
    fn model_must_match_the_uncertain_space() {
        let levels = vec![Level::new(FnModel::new(2, 1, |x| array![x[0]])).with_cost(1.0)];
        assert!(matches!(
            Mlmc::new(levels, space(), 40.0, &mean_pilot(), 0),
            Err(BuildError::InvalidParameter(_))
        ));
    }
}

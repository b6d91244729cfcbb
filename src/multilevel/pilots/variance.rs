use ndarray::{Array1, ArrayView2, arr1};

use crate::core::{IterativeMoments, RunningCovariance, StatisticError};
use crate::multilevel::pilots::nansum;
use crate::multilevel::{AllocationCriterion, Pilot, PilotSetup};

#[derive(Debug, Clone, PartialEq)]
struct LevelTerm {
    /// Covariance of `[f[ℓ], f[ℓ-1]]`.
    pair: RunningCovariance,
    /// Moments of `[f[ℓ] - f[ℓ-1], f[ℓ] + f[ℓ-1]]`.
    delta_sigma: IterativeMoments,
}

/// Telescopes `Var[f[ℓ]] - Var[f[ℓ-1]]` estimated on shared draws.
///
/// `V_ℓ` bounds the variance of the term through the fourth central moments
/// of the difference and the sum of the paired outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct VariancePilot {
    criterion: AllocationCriterion,
    levels: Vec<LevelTerm>,
}

impl VariancePilot {
    pub fn new(setup: &PilotSetup) -> Result<Self, StatisticError> {
        let criterion = setup.criterion()?;
        let levels = (0..criterion.n_levels())
            .map(|_| -> Result<LevelTerm, StatisticError> {
                Ok(LevelTerm {
                    pair: RunningCovariance::new(2),
                    delta_sigma: IterativeMoments::new(4, 2)?,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { criterion, levels })
    }
}

impl Pilot for VariancePilot {
    fn criterion(&self) -> &AllocationCriterion {
        &self.criterion
    }

    fn width(&self, _level: usize) -> usize {
        2
    }

    fn ingest(&mut self, level: usize, samples: ArrayView2<'_, f64>) -> Result<(), StatisticError> {
        let term = &mut self.levels[level];
        for row in samples.rows() {
            term.pair.increment(row)?;
            term.delta_sigma
                .increment(arr1(&[row[0] - row[1], row[0] + row[1]]).view())?;
        }
        Ok(())
    }

    fn n_samples(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.pair.count()).collect()
    }

    fn statistic(&self) -> f64 {
        nansum(self.levels.iter().map(|l| {
            let c = l.pair.covariance();
            c[[0, 0]] - c[[1, 1]]
        }))
    }

    fn term_variances(&self) -> Array1<f64> {
        self.levels
            .iter()
            .map(|l| {
                if l.delta_sigma.count() < 2 {
                    return f64::NAN;
                }
                match l.delta_sigma.central_moment(4) {
                    Ok(m4) => (m4[0] * m4[1]).sqrt(),
                    Err(_) => f64::NAN,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multilevel::pilots::fixtures::{level_one, level_two, setup};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn telescopes_variance_differences() {
        let mut pilot = VariancePilot::new(&setup()).unwrap();
        let report = pilot.step(&[(1, level_one().view())]).unwrap();
        assert_abs_diff_eq!(report.statistic, -0.105, epsilon = 1e-12);
        assert_abs_diff_eq!(report.term_variances[1], 0.00275625, epsilon = 1e-12);
        assert!(report.term_variances[0].is_nan());
        assert_eq!(report.next_level, 0);

        let report = pilot.step(&[(2, level_two().view())]).unwrap();
        assert_abs_diff_eq!(report.statistic, -0.21, epsilon = 1e-12);
    }

    #[test]
    fn single_level_is_plain_sample_variance() {
        let mut pilot = VariancePilot::new(&PilotSetup::new(vec![2.0], vec![1.0])).unwrap();
        let samples = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let report = pilot.step(&[(0, samples.view())]).unwrap();
        assert_abs_diff_eq!(report.statistic, 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn one_sample_is_not_enough() {
        let mut pilot = VariancePilot::new(&setup()).unwrap();
        let report = pilot.step(&[(0, array![[1.0, 0.0]].view())]).unwrap();
        assert!(report.term_variances.iter().all(|v| v.is_nan()));
        assert_eq!(report.statistic, 0.0);
    }
}

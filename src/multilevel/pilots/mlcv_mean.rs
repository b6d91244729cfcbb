use ndarray::{Array1, ArrayView2, s};

use crate::core::{RunningCovariance, StatisticError};
use crate::multilevel::pilots::nansum;
use crate::multilevel::{AllocationCriterion, MlcvVariant, Pilot, PilotSetup};
use crate::utils::math::cholesky_solve;

#[derive(Debug, Clone, PartialEq)]
struct LevelTerm {
    /// Known means of the surrogates sampled at this level.
    surrogate_means: Array1<f64>,
    /// Covariance of `[f[ℓ] - f[ℓ-1], s_1, …, s_q]`.
    moments: RunningCovariance,
}

impl LevelTerm {
    fn n_surrogates(&self) -> usize {
        self.surrogate_means.len()
    }

    /// Optimal coefficients `C_ss⁻¹ c_sd`, zero when `C_ss` is singular.
    fn coefficients(&self) -> Array1<f64> {
        let q = self.n_surrogates();
        let c = self.moments.covariance();
        cholesky_solve(c.slice(s![1.., 1..]), c.slice(s![1.., 0]))
            .unwrap_or_else(|| Array1::zeros(q))
    }

    fn term(&self) -> f64 {
        let mean = self.moments.mean();
        if self.n_surrogates() == 0 || self.moments.count() < 2 {
            return mean[0];
        }
        let alpha = self.coefficients();
        let shift = &mean.slice(s![1..]) - &self.surrogate_means;
        let correction: f64 = shift.dot(&alpha);
        mean[0] - correction
    }

    /// `C_dd - 2 αᵀ c_sd + αᵀ C_ss α`, floored at zero.
    fn variance(&self) -> f64 {
        if self.moments.count() < 2 {
            return f64::NAN;
        }
        let c = self.moments.covariance();
        if self.n_surrogates() == 0 {
            return c[[0, 0]];
        }
        let alpha = self.coefficients();
        let c_sd = c.slice(s![1.., 0]);
        let c_ss = c.slice(s![1.., 1..]);
        let cross: f64 = alpha.dot(&c_sd);
        let quadratic: f64 = alpha.dot(&c_ss.dot(&alpha));
        (c[[0, 0]] - 2.0 * cross + quadratic).max(0.0)
    }
}

/// Mean pilot whose terms are each corrected by control variates.
///
/// Level `ℓ` rows are `[f[ℓ], f[ℓ-1], s_1, …, s_q]` where the surrogates are
/// the ones [`MlcvVariant::surrogate_positions`] selects for that level, in
/// position order.
#[derive(Debug, Clone, PartialEq)]
pub struct MlcvMeanPilot {
    variant: MlcvVariant,
    criterion: AllocationCriterion,
    levels: Vec<LevelTerm>,
}

impl MlcvMeanPilot {
    pub fn new(setup: &PilotSetup, variant: MlcvVariant) -> Result<Self, StatisticError> {
        let criterion = setup.criterion()?;
        let n_levels = criterion.n_levels();
        let levels = (0..n_levels)
            .map(|level| -> Result<LevelTerm, StatisticError> {
                let means = if level == 0 {
                    &setup.g_means
                } else {
                    &setup.h_means
                };
                let positions = variant.surrogate_positions(level, n_levels);
                let surrogate_means = means.get(positions.clone()).ok_or_else(|| {
                    StatisticError::InvalidParameter(format!(
                        "{variant} needs surrogate means at positions {positions:?} of level {level}, \
                         only {} given",
                        means.len()
                    ))
                })?;
                Ok(LevelTerm {
                    moments: RunningCovariance::new(1 + surrogate_means.len()),
                    surrogate_means: Array1::from(surrogate_means.to_vec()),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            variant,
            criterion,
            levels,
        })
    }

    pub fn variant(&self) -> MlcvVariant {
        self.variant
    }

    /// Per-level control-variate coefficients, zero until a level has two samples.
    pub fn coefficients(&self) -> Vec<Array1<f64>> {
        self.levels
            .iter()
            .map(|l| {
                if l.moments.count() < 2 {
                    Array1::zeros(l.n_surrogates())
                } else {
                    l.coefficients()
                }
            })
            .collect()
    }

    /// Raw level means of `f[ℓ] - f[ℓ-1]`, without correction.
    pub fn uncorrected_terms(&self) -> Array1<f64> {
        self.levels
            .iter()
            .map(|l| l.moments.mean()[0])
            .collect()
    }
}

impl Pilot for MlcvMeanPilot {
    fn criterion(&self) -> &AllocationCriterion {
        &self.criterion
    }

    fn width(&self, level: usize) -> usize {
        self.levels
            .get(level)
            .map_or(2, |l| 2 + l.n_surrogates())
    }

    fn ingest(&mut self, level: usize, samples: ArrayView2<'_, f64>) -> Result<(), StatisticError> {
        let term = &mut self.levels[level];
        let delta = &samples.column(0) - &samples.column(1);
        let mut rows = samples.slice(s![.., 1..]).to_owned();
        rows.column_mut(0).assign(&delta);
        term.moments.increment_batch(rows.view())
    }

    fn n_samples(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.moments.count()).collect()
    }

    fn statistic(&self) -> f64 {
        nansum(self.levels.iter().map(LevelTerm::term))
    }

    fn term_variances(&self) -> Array1<f64> {
        self.levels.iter().map(LevelTerm::variance).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn setup() -> PilotSetup {
        PilotSetup::new(vec![2.0; 3], vec![1.0, 2.0, 3.0])
            .with_surrogate_means(vec![1.0, 2.0, 3.0], vec![0.1, 0.2])
    }

    #[test]
    fn corrected_terms_are_summed() {
        let mut pilot = MlcvMeanPilot::new(&setup(), MlcvVariant::MlmcMlcv).unwrap();
        assert_eq!(pilot.width(0), 5);
        assert_eq!(pilot.width(1), 4);
        let level_one = array![
            [1.1, 1.4, 0.1, 0.2],
            [2.1, 2.5, -0.2, -0.3],
            [3.1, 3.5, 0.3, 0.2]
        ];
        let report = pilot.step(&[(1, level_one.view())]).unwrap();
        assert_abs_diff_eq!(report.statistic, -0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(report.term_variances[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pilot.coefficients()[1], array![-0.5, 0.5], epsilon = 1e-9);

        let level_two = array![
            [1.2, 1.6, 0.1, 0.2],
            [2.2, 2.7, -0.2, -0.2],
            [3.2, 3.7, 0.3, 0.2]
        ];
        let report = pilot.step(&[(2, level_two.view())]).unwrap();
        assert_abs_diff_eq!(report.statistic, -0.7, epsilon = 1e-9);
        assert_eq!(report.next_level, 0);
    }

    #[test]
    fn levels_without_surrogates_fall_back_to_plain_differences() {
        let mut pilot = MlcvMeanPilot::new(&setup(), MlcvVariant::MlmcCv0).unwrap();
        assert_eq!(pilot.width(1), 2);
        let rows = array![[1.1, 1.4], [2.1, 2.5], [3.1, 3.5]];
        let report = pilot.step(&[(1, rows.view())]).unwrap();
        assert_abs_diff_eq!(report.statistic, -1.1 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            report.term_variances[1],
            1.0 / 300.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn singular_surrogate_covariance_uses_zero_coefficients() {
        let mut pilot = MlcvMeanPilot::new(&setup(), MlcvVariant::MlmcCv).unwrap();
        let rows = array![[1.0, 0.0, 5.0], [3.0, 0.0, 5.0]];
        let report = pilot.step(&[(0, rows.view())]).unwrap();
        assert_abs_diff_eq!(report.statistic, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.term_variances[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn partially_correlated_surrogate_leaves_residual_variance() {
        // C_dd - c_sd² / c_ss = 5/3 - (6.5/3)² / (8.75/3) = 2/35
        let mut pilot = MlcvMeanPilot::new(&setup(), MlcvVariant::MlmcCv).unwrap();
        let rows = array![[1.0, 0.0, 1.0], [2.0, 0.0, 2.0], [3.0, 0.0, 3.0], [4.0, 0.0, 5.0]];
        let report = pilot.step(&[(0, rows.view())]).unwrap();
        assert_abs_diff_eq!(report.term_variances[0], 2.0 / 35.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pilot.coefficients()[0], array![6.5 / 8.75], epsilon = 1e-12);
    }

    #[test]
    fn missing_surrogate_means_are_rejected() {
        let setup = PilotSetup::new(vec![2.0; 3], vec![1.0, 2.0, 3.0])
            .with_surrogate_means(vec![1.0], vec![]);
        assert!(MlcvMeanPilot::new(&setup, MlcvVariant::MlmcMlcv).is_err());
        assert!(MlcvMeanPilot::new(&setup, MlcvVariant::MlmcCv0).is_ok());
    }

    #[test]
    fn one_sample_has_undefined_variance() {
        let mut pilot = MlcvMeanPilot::new(&setup(), MlcvVariant::MlmcCv).unwrap();
        let report = pilot.step(&[(0, array![[1.0, 0.0, 0.9]].view())]).unwrap();
        assert!(report.term_variances[0].is_nan());
        assert_eq!(report.statistic, 1.0);
        assert_eq!(pilot.uncorrected_terms()[0], 1.0);
    }
}

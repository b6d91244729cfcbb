use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::control_variate::{ControlVariateData, control_variate_mean};

#[derive(Debug, Default, Clone, Copy)]
pub struct ControlVariateMean;

impl StatisticEstimator for ControlVariateMean {
    type Data = ControlVariateData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Mean
    }

    fn estimate(&mut self, data: &ControlVariateData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        let value = control_variate_mean(
            data.samples.view(),
            data.surrogate_samples().view(),
            data.mean_value.view(),
        )?;
        Ok(StatisticResult::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IndependentNormal, UncertainSpace};
    use crate::estimators::control_variate::tests::linear_data;
    use approx::assert_abs_diff_eq;
    use ndarray::{Axis, array};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn linear_model_gives_exact_mean() {
        let r = ControlVariateMean.estimate(&linear_data()).unwrap();
        assert_abs_diff_eq!(r.value[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nonlinear_model_is_unbiased() {
        // y = u + u², E[y] = 1 for u ~ N(0, 1); the surrogate is g(u) = u.
        let space = IndependentNormal::standard(1).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let n_repeats = 200;
        let mut total = 0.0;
        for _ in 0..n_repeats {
            let inputs = space.draw(&mut rng, 100);
            let samples = inputs
                .map_axis(Axis(1), |u| u[0] + u[0] * u[0])
                .insert_axis(Axis(1));
            let data = ControlVariateData {
                samples,
                inputs,
                input_mean: array![0.0],
                input_standard_deviation: array![1.0],
                mean_value: array![0.0],
                mean_jacobian: array![[1.0]],
                reference_inputs: None,
            };
            total += ControlVariateMean.estimate(&data).unwrap().value[0];
        }
        // Standard error of the average is about sqrt(2 / 20_000) = 0.01.
        assert_abs_diff_eq!(total / n_repeats as f64, 1.0, epsilon = 0.05);
    }

    #[test]
    fn shape_errors_are_reported() {
        let mut data = linear_data();
        data.mean_value = array![1.0, 2.0];
        assert!(ControlVariateMean.estimate(&data).is_err());
    }
}

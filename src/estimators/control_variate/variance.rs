use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::control_variate::{ControlVariateData, control_variate_variance};

/// Unbiased variance corrected by the known variance of the linear surrogate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControlVariateVariance;

impl StatisticEstimator for ControlVariateVariance {
    type Data = ControlVariateData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Variance
    }

    fn estimate(&mut self, data: &ControlVariateData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        let value = control_variate_variance(
            data.samples.view(),
            data.surrogate_samples().view(),
            data.surrogate_variance().view(),
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
    fn linear_model_gives_exact_variance() {
        let r = ControlVariateVariance.estimate(&linear_data()).unwrap();
        assert_abs_diff_eq!(r.value[0], 4.25, epsilon = 1e-10);
    }

    #[test]
    fn close_to_true_variance_for_mildly_nonlinear_model() {
        // y = u + 0.1 u², Var[y] = 1 + 0.02 for u ~ N(0, 1).
        let space = IndependentNormal::standard(1).unwrap();
        let inputs = space.draw(&mut StdRng::seed_from_u64(5), 5_000);
        let samples = inputs
            .map_axis(Axis(1), |u| u[0] + 0.1 * u[0] * u[0])
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
        let r = ControlVariateVariance.estimate(&data).unwrap();
        assert_abs_diff_eq!(r.value[0], 1.02, epsilon = 0.05);
    }
}

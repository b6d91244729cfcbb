use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::taylor_polynomial::TaylorData;

#[derive(Debug, Default, Clone, Copy)]
pub struct TaylorMean;

impl StatisticEstimator for TaylorMean {
    type Data = TaylorData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Mean
    }

    fn estimate(&mut self, data: &TaylorData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        Ok(StatisticResult::new(data.mean()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array3, array};

    #[test]
    fn first_order_mean_is_the_value() {
        let data = TaylorData {
            value: array![1.0, -2.0],
            jacobian: array![[1.0], [3.0]],
            hessian: None,
            input_standard_deviation: array![0.5],
        };
        assert_eq!(TaylorMean.estimate(&data).unwrap().value, array![1.0, -2.0]);
    }

    #[test]
    fn second_order_mean_adds_curvature() {
        // f(u) = u0² + 3 u0 u1 at u = 0: H = [[2, 3], [3, 0]].
        let mut h = Array3::zeros((1, 2, 2));
        h[[0, 0, 0]] = 2.0;
        h[[0, 0, 1]] = 3.0;
        h[[0, 1, 0]] = 3.0;
        let data = TaylorData {
            value: array![0.0],
            jacobian: array![[0.0, 0.0]],
            hessian: Some(h),
            input_standard_deviation: array![2.0, 1.0],
        };
        // ½ (2·4 + 2·3·2·1) = 10.
        let r = TaylorMean.estimate(&data).unwrap();
        assert_abs_diff_eq!(r.value[0], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn hessian_shape_is_checked() {
        let data = TaylorData {
            value: array![0.0],
            jacobian: array![[0.0, 0.0]],
            hessian: Some(Array3::zeros((1, 3, 3))),
            input_standard_deviation: array![1.0, 1.0],
        };
        assert!(TaylorMean.estimate(&data).is_err());
    }
}

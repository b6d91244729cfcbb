use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};
use crate::estimators::StatisticEstimator;
use crate::estimators::taylor_polynomial::TaylorData;

#[derive(Debug, Default, Clone, Copy)]
pub struct TaylorStandardDeviation;

impl StatisticEstimator for TaylorStandardDeviation {
    type Data = TaylorData;

    fn kind(&self) -> StatisticKind {
        StatisticKind::StandardDeviation
    }

    fn estimate(&mut self, data: &TaylorData) -> Result<StatisticResult, StatisticError> {
        data.validate()?;
        Ok(StatisticResult::new(data.variance().mapv(f64::sqrt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn norm_of_scaled_jacobian() {
        let data = TaylorData {
            value: array![7.0],
            jacobian: array![[3.0, 4.0]],
            hessian: None,
            input_standard_deviation: array![1.0, 1.0],
        };
        let r = TaylorStandardDeviation.estimate(&data).unwrap();
        assert_abs_diff_eq!(r.value[0], 5.0, epsilon = 1e-12);
    }
}

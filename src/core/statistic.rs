use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Value of a statistic, one entry per output component, with its optional
/// Jacobian w.r.t. the design variables (`components × design dimension`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticResult {
    pub value: Array1<f64>,
    pub jacobian: Option<Array2<f64>>,
}

impl StatisticResult {
    pub fn new(value: Array1<f64>) -> Self {
        Self {
            value,
            jacobian: None,
        }
    }

    pub fn with_jacobian(value: Array1<f64>, jacobian: Array2<f64>) -> Self {
        Self {
            value,
            jacobian: Some(jacobian),
        }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

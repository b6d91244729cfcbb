use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatisticError {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("empty sample")]
    EmptySample,

    #[error("{0} is not differentiable")]
    NotDifferentiable(&'static str),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("unknown statistic: {0}")]
    UnknownStatistic(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("the minimum budget {required} is greater than the total budget {available}")]
    BudgetTooSmall { required: f64, available: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

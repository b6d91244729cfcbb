use crate::config::StatisticKind;
use crate::core::{StatisticError, StatisticResult};

/// Estimator of a probabilistic statistic of a vector-valued quantity.
///
/// The statistic is applied independently to each output component. `Data`
/// is what one estimation call consumes: a sample batch, one observation of
/// a stream, control-variate data or Taylor data.
pub trait StatisticEstimator {
    type Data: ?Sized;

    /// The statistic this estimator computes.
    fn kind(&self) -> StatisticKind;

    /// Consumes `data` and returns the current estimate.
    ///
    /// Shapes are validated before any internal state is updated.
    fn estimate(&mut self, data: &Self::Data) -> Result<StatisticResult, StatisticError>;

    /// Forgets any accumulated state. Stateless estimators ignore it.
    fn reset(&mut self) {}
}

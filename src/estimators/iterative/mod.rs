//! Estimators updated one observation at a time from running moments.
//!
//! Nothing is allocated until the first observation: its size fixes the
//! output dimension (and Jacobian shape) for the lifetime of the estimator,
//! or until [`StatisticEstimator::reset`](crate::estimators::StatisticEstimator::reset).

use ndarray::{Array1, Array2, Axis};

use crate::core::{IterativeMoments, StatisticError};

mod margin;
mod mean;
mod probability;
mod standard_deviation;
mod variance;

pub use margin::IterativeMargin;
pub use mean::IterativeMean;
pub use probability::IterativeProbability;
pub use standard_deviation::IterativeStandardDeviation;
pub use variance::IterativeVariance;

/// One realization of the quantity of interest, with its optional Jacobian
/// `k × p` w.r.t. the design variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub value: Array1<f64>,
    pub jacobian: Option<Array2<f64>>,
}

impl Observation {
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
}

#[derive(Debug, Clone, PartialEq)]
struct JacobianMoments {
    shape: (usize, usize),
    jacobian: IterativeMoments,
    weighted: IterativeMoments,
}

#[derive(Debug, Clone, PartialEq)]
struct Accumulator {
    value: IterativeMoments,
    jacobian: Option<JacobianMoments>,
}

/// Running moments of a stream, sized by the first observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StreamState {
    accumulator: Option<Accumulator>,
}

impl StreamState {
    pub(crate) fn count(&self) -> usize {
        self.accumulator.as_ref().map_or(0, |a| a.value.count())
    }

    pub(crate) fn reset(&mut self) {
        self.accumulator = None;
    }

    fn check(&self, observation: &Observation) -> Result<(), StatisticError> {
        let Some(acc) = &self.accumulator else {
            return Ok(());
        };
        acc.value.check(&observation.value.view())?;
        match (&acc.jacobian, &observation.jacobian) {
            (None, None) => Ok(()),
            (Some(expected), Some(found)) if expected.shape == found.dim() => Ok(()),
            (Some(expected), Some(found)) => Err(StatisticError::ShapeMismatch(format!(
                "jacobian is {:?}, expected {:?}",
                found.dim(),
                expected.shape
            ))),
            (Some(_), None) => Err(StatisticError::ShapeMismatch(
                "observation lacks the jacobian tracked by this stream".into(),
            )),
            (None, Some(_)) => Err(StatisticError::ShapeMismatch(
                "observation carries a jacobian this stream does not track".into(),
            )),
        }
    }

    fn allocate(observation: &Observation) -> Result<Accumulator, StatisticError> {
        let k = observation.value.len();
        if let Some(j) = &observation.jacobian {
            if j.nrows() != k {
                return Err(StatisticError::ShapeMismatch(format!(
                    "jacobian has {} rows for {} outputs",
                    j.nrows(),
                    k
                )));
            }
        }
        let jacobian = observation
            .jacobian
            .as_ref()
            .map(|j| -> Result<JacobianMoments, StatisticError> {
                Ok(JacobianMoments {
                    shape: j.dim(),
                    jacobian: IterativeMoments::new(1, j.len())?,
                    weighted: IterativeMoments::new(1, j.len())?,
                })
            })
            .transpose()?;
        Ok(Accumulator {
            value: IterativeMoments::new(2, k)?,
            jacobian,
        })
    }

    /// Adds one observation; on error the state is unchanged.
    pub(crate) fn ingest(&mut self, observation: &Observation) -> Result<(), StatisticError> {
        self.check(observation)?;
        if self.accumulator.is_none() {
            self.accumulator = Some(Self::allocate(observation)?);
        }
        let Some(acc) = self.accumulator.as_mut() else {
            return Ok(());
        };
        acc.value.increment(observation.value.view())?;
        if let (Some(moments), Some(j)) = (&mut acc.jacobian, &observation.jacobian) {
            let flat: Array1<f64> = j.iter().copied().collect();
            let weighted: Array1<f64> = j
                .indexed_iter()
                .map(|((row, _), &v)| v * observation.value[row])
                .collect();
            moments.jacobian.increment(flat.view())?;
            moments.weighted.increment(weighted.view())?;
        }
        Ok(())
    }

    pub(crate) fn tracks_jacobian(&self) -> bool {
        self.accumulator
            .as_ref()
            .is_some_and(|a| a.jacobian.is_some())
    }

    pub(crate) fn mean(&self) -> Result<Array1<f64>, StatisticError> {
        self.accumulator
            .as_ref()
            .map(|a| a.value.mean())
            .ok_or(StatisticError::EmptySample)
    }

    pub(crate) fn variance(&self) -> Result<Array1<f64>, StatisticError> {
        self.accumulator
            .as_ref()
            .map(|a| a.value.variance())
            .ok_or(StatisticError::EmptySample)
    }

    fn unflatten(shape: (usize, usize), flat: Array1<f64>) -> Result<Array2<f64>, StatisticError> {
        flat.into_shape_with_order(shape)
            .map_err(|e| StatisticError::ShapeMismatch(e.to_string()))
    }

    pub(crate) fn mean_jacobian(&self) -> Result<Option<Array2<f64>>, StatisticError> {
        let Some(moments) = self.accumulator.as_ref().and_then(|a| a.jacobian.as_ref()) else {
            return Ok(None);
        };
        Self::unflatten(moments.shape, moments.jacobian.mean()).map(Some)
    }

    /// `2n/(n-1) · (mean(y·J) - mean(y)·mean(J))`.
    pub(crate) fn variance_jacobian(&self) -> Result<Option<Array2<f64>>, StatisticError> {
        let Some(acc) = &self.accumulator else {
            return Ok(None);
        };
        let Some(moments) = &acc.jacobian else {
            return Ok(None);
        };
        let n = acc.value.count() as f64;
        let mean = acc.value.mean();
        let mean_jacobian = Self::unflatten(moments.shape, moments.jacobian.mean())?;
        let mean_weighted = Self::unflatten(moments.shape, moments.weighted.mean())?;
        let centered = mean_weighted - &mean.insert_axis(Axis(1)) * &mean_jacobian;
        Ok(Some(centered * (2.0 * n / (n - 1.0))))
    }
}

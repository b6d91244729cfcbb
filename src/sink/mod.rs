//! Optional persistence of the samples behind each estimation.

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::core::StatisticError;

mod json_directory;

pub use json_directory::JsonDirectorySink;

/// Everything drawn and computed for one statistic at one outer iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDataset {
    pub iteration: usize,
    pub statistic: String,
    pub timestamp: DateTime<Utc>,
    pub design: Array1<f64>,
    /// Uncertain draws, `n × d`.
    pub inputs: Array2<f64>,
    /// Model outputs, `n × k`.
    pub outputs: Array2<f64>,
}

impl SampleDataset {
    pub fn new(
        iteration: usize,
        statistic: impl Into<String>,
        design: Array1<f64>,
        inputs: Array2<f64>,
        outputs: Array2<f64>,
    ) -> Self {
        Self {
            iteration,
            statistic: statistic.into(),
            timestamp: Utc::now(),
            design,
            inputs,
            outputs,
        }
    }

    pub fn len(&self) -> usize {
        self.outputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.nrows() == 0
    }
}

/// Receives the samples of each estimation before it returns.
pub trait SampleSink {
    fn save(&mut self, dataset: &SampleDataset) -> Result<(), StatisticError>;
}

impl<S: SampleSink + ?Sized> SampleSink for Box<S> {
    fn save(&mut self, dataset: &SampleDataset) -> Result<(), StatisticError> {
        (**self).save(dataset)
    }
}

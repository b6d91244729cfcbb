use std::cell::RefCell;
use std::rc::Rc;

use crate::core::StatisticError;
use crate::sink::{SampleDataset, SampleSink};

/// Keeps every saved dataset in memory; clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    datasets: Rc<RefCell<Vec<SampleDataset>>>,
}

impl RecordingSink {
    pub fn datasets(&self) -> Vec<SampleDataset> {
        self.datasets.borrow().clone()
    }
}

impl SampleSink for RecordingSink {
    fn save(&mut self, dataset: &SampleDataset) -> Result<(), StatisticError> {
        self.datasets.borrow_mut().push(dataset.clone());
        Ok(())
    }
}

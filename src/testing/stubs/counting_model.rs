use std::cell::Cell;
use std::rc::Rc;

use ndarray::{Array1, Array2, ArrayView1};

use crate::core::{Model, StatisticError};

/// Wraps a model and counts its evaluations; clones share the counter.
#[derive(Debug)]
pub struct CountingModel<M> {
    inner: Rc<M>,
    calls: Rc<Cell<usize>>,
}

impl<M> Clone for CountingModel<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<M: Model> CountingModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner: Rc::new(inner),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<M: Model> Model for CountingModel<M> {
    fn input_dimension(&self) -> usize {
        self.inner.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.inner.output_dimension()
    }

    fn evaluate(&self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>, StatisticError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.evaluate(input)
    }

    fn jacobian(&self, input: ArrayView1<'_, f64>) -> Result<Array2<f64>, StatisticError> {
        self.inner.jacobian(input)
    }
}

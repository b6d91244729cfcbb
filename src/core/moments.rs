//! Bounded running summaries of vector-valued samples.
//!
//! Both accumulators keep a constant amount of state regardless of how many
//! samples they have seen, and validate the sample size before touching it.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::core::StatisticError;

pub const MAX_ORDER: usize = 4;

/// Running mean and centered power sums up to order 4 (Welford / Pébay updates).
#[derive(Debug, Clone, PartialEq)]
pub struct IterativeMoments {
    order: usize,
    count: usize,
    mean: Array1<f64>,
    m2: Array1<f64>,
    m3: Array1<f64>,
    m4: Array1<f64>,
}

impl IterativeMoments {
    pub fn new(order: usize, dimension: usize) -> Result<Self, StatisticError> {
        if !(1..=MAX_ORDER).contains(&order) {
            return Err(StatisticError::InvalidParameter(format!(
                "moment order must be in 1..={MAX_ORDER}, got {order}"
            )));
        }
        Ok(Self {
            order,
            count: 0,
            mean: Array1::zeros(dimension),
            m2: Array1::zeros(dimension),
            m3: Array1::zeros(dimension),
            m4: Array1::zeros(dimension),
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn check(&self, x: &ArrayView1<'_, f64>) -> Result<(), StatisticError> {
        if x.len() != self.dimension() {
            return Err(StatisticError::DimensionMismatch {
                expected: self.dimension(),
                found: x.len(),
            });
        }
        Ok(())
    }

    pub fn increment(&mut self, x: ArrayView1<'_, f64>) -> Result<(), StatisticError> {
        self.check(&x)?;
        let n1 = self.count as f64;
        let n = n1 + 1.0;
        for i in 0..self.dimension() {
            let delta = x[i] - self.mean[i];
            let delta_n = delta / n;
            let term1 = delta * delta_n * n1;
            self.mean[i] += delta_n;
            if self.order >= 4 {
                let delta_n2 = delta_n * delta_n;
                self.m4[i] += term1 * delta_n2 * (n * n - 3.0 * n + 3.0)
                    + 6.0 * delta_n2 * self.m2[i]
                    - 4.0 * delta_n * self.m3[i];
            }
            if self.order >= 3 {
                self.m3[i] += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2[i];
            }
            if self.order >= 2 {
                self.m2[i] += term1;
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Adds the rows of `samples`; nothing is added if the width is wrong.
    pub fn increment_batch(&mut self, samples: ArrayView2<'_, f64>) -> Result<(), StatisticError> {
        if samples.ncols() != self.dimension() {
            return Err(StatisticError::DimensionMismatch {
                expected: self.dimension(),
                found: samples.ncols(),
            });
        }
        for row in samples.rows() {
            self.increment(row)?;
        }
        Ok(())
    }

    /// NaN until the first sample.
    pub fn mean(&self) -> Array1<f64> {
        if self.count == 0 {
            return Array1::from_elem(self.dimension(), f64::NAN);
        }
        self.mean.clone()
    }

    /// Unbiased sample variance (`n - 1` denominator); NaN with fewer than two samples.
    pub fn variance(&self) -> Array1<f64> {
        if self.count < 2 || self.order < 2 {
            return Array1::from_elem(self.dimension(), f64::NAN);
        }
        &self.m2 / (self.count as f64 - 1.0)
    }

    pub fn standard_deviation(&self) -> Array1<f64> {
        self.variance().mapv(f64::sqrt)
    }

    /// Central moment `E[(X - mean)^k]` with the `n` denominator.
    pub fn central_moment(&self, k: usize) -> Result<Array1<f64>, StatisticError> {
        if k == 0 || k > self.order {
            return Err(StatisticError::InvalidParameter(format!(
                "central moment of order {k} is not tracked (order {})",
                self.order
            )));
        }
        if self.count == 0 {
            return Ok(Array1::from_elem(self.dimension(), f64::NAN));
        }
        let n = self.count as f64;
        Ok(match k {
            1 => Array1::zeros(self.dimension()),
            2 => &self.m2 / n,
            3 => &self.m3 / n,
            _ => &self.m4 / n,
        })
    }
}

/// Running mean and co-moment matrix of a random vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningCovariance {
    count: usize,
    mean: Array1<f64>,
    comoment: Array2<f64>,
}

impl RunningCovariance {
    pub fn new(dimension: usize) -> Self {
        Self {
            count: 0,
            mean: Array1::zeros(dimension),
            comoment: Array2::zeros((dimension, dimension)),
        }
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn increment(&mut self, x: ArrayView1<'_, f64>) -> Result<(), StatisticError> {
        if x.len() != self.dimension() {
            return Err(StatisticError::DimensionMismatch {
                expected: self.dimension(),
                found: x.len(),
            });
        }
        self.count += 1;
        let before = &x - &self.mean;
        self.mean.scaled_add(1.0 / self.count as f64, &before);
        let after = &x - &self.mean;
        let d = self.dimension();
        for i in 0..d {
            for j in 0..d {
                self.comoment[[i, j]] += before[i] * after[j];
            }
        }
        Ok(())
    }

    pub fn increment_batch(&mut self, samples: ArrayView2<'_, f64>) -> Result<(), StatisticError> {
        if samples.ncols() != self.dimension() {
            return Err(StatisticError::DimensionMismatch {
                expected: self.dimension(),
                found: samples.ncols(),
            });
        }
        for row in samples.rows() {
            self.increment(row)?;
        }
        Ok(())
    }

    pub fn mean(&self) -> Array1<f64> {
        if self.count == 0 {
            return Array1::from_elem(self.dimension(), f64::NAN);
        }
        self.mean.clone()
    }

    /// Unbiased covariance matrix; NaN with fewer than two samples.
    pub fn covariance(&self) -> Array2<f64> {
        if self.count < 2 {
            return Array2::from_elem(self.comoment.dim(), f64::NAN);
        }
        &self.comoment / (self.count as f64 - 1.0)
    }
}

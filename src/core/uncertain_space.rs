use ndarray::{Array1, Array2};
use rand::RngCore;
use rand::distr::{Distribution, Uniform};
use rand_distr::Normal;

use crate::core::StatisticError;

/// Probability space of the uncertain inputs.
///
/// Estimators only rely on these capabilities and never inspect the
/// distribution family.
pub trait UncertainSpace {
    fn dimension(&self) -> usize;

    fn mean(&self) -> Array1<f64>;

    /// Per-marginal standard deviations.
    fn standard_deviation(&self) -> Array1<f64>;

    /// Draws `n` realizations, shaped `n × dimension`.
    fn draw(&self, rng: &mut dyn RngCore, n: usize) -> Array2<f64>;
}

fn draw_independent<D>(marginals: &[D], rng: &mut dyn RngCore, n: usize) -> Array2<f64>
where
    D: Distribution<f64>,
{
    let mut samples = Array2::zeros((n, marginals.len()));
    for mut row in samples.rows_mut() {
        for (value, marginal) in row.iter_mut().zip(marginals) {
            *value = marginal.sample(rng);
        }
    }
    samples
}

/// Independent Gaussian marginals.
#[derive(Debug, Clone)]
pub struct IndependentNormal {
    means: Array1<f64>,
    standard_deviations: Array1<f64>,
    marginals: Vec<Normal<f64>>,
}

impl IndependentNormal {
    pub fn new(means: Vec<f64>, standard_deviations: Vec<f64>) -> Result<Self, StatisticError> {
        if means.len() != standard_deviations.len() {
            return Err(StatisticError::DimensionMismatch {
                expected: means.len(),
                found: standard_deviations.len(),
            });
        }
        let marginals = means
            .iter()
            .zip(&standard_deviations)
            .map(|(&mu, &sigma)| {
                if !(sigma.is_finite() && sigma >= 0.0) {
                    return Err(StatisticError::InvalidParameter(format!(
                        "normal({mu}, {sigma}): standard deviation must be finite and non-negative"
                    )));
                }
                Normal::new(mu, sigma).map_err(|e| {
                    StatisticError::InvalidParameter(format!("normal({mu}, {sigma}): {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            means: Array1::from(means),
            standard_deviations: Array1::from(standard_deviations),
            marginals,
        })
    }

    pub fn standard(dimension: usize) -> Result<Self, StatisticError> {
        Self::new(vec![0.0; dimension], vec![1.0; dimension])
    }
}

impl UncertainSpace for IndependentNormal {
    fn dimension(&self) -> usize {
        self.marginals.len()
    }

    fn mean(&self) -> Array1<f64> {
        self.means.clone()
    }

    fn standard_deviation(&self) -> Array1<f64> {
        self.standard_deviations.clone()
    }

    fn draw(&self, rng: &mut dyn RngCore, n: usize) -> Array2<f64> {
        draw_independent(&self.marginals, rng, n)
    }
}

/// Independent uniform marginals on `[lower, upper)`.
#[derive(Debug, Clone)]
pub struct IndependentUniform {
    lower: Array1<f64>,
    upper: Array1<f64>,
    marginals: Vec<Uniform<f64>>,
}

impl IndependentUniform {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, StatisticError> {
        if lower.len() != upper.len() {
            return Err(StatisticError::DimensionMismatch {
                expected: lower.len(),
                found: upper.len(),
            });
        }
        let marginals = lower
            .iter()
            .zip(&upper)
            .map(|(&a, &b)| {
                Uniform::new(a, b).map_err(|e| {
                    StatisticError::InvalidParameter(format!("uniform({a}, {b}): {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            lower: Array1::from(lower),
            upper: Array1::from(upper),
            marginals,
        })
    }
}

impl UncertainSpace for IndependentUniform {
    fn dimension(&self) -> usize {
        self.marginals.len()
    }

    fn mean(&self) -> Array1<f64> {
        (&self.lower + &self.upper) / 2.0
    }

    fn standard_deviation(&self) -> Array1<f64> {
        (&self.upper - &self.lower) / 12f64.sqrt()
    }

    fn draw(&self, rng: &mut dyn RngCore, n: usize) -> Array2<f64> {
        draw_independent(&self.marginals, rng, n)
    }
}

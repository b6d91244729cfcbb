use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, s};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::{Model, StatisticError, UncertainSpace};

/// A model of `design ⊕ uncertain` inputs together with the law of the
/// uncertain part.
pub struct RobustProblem {
    model: Box<dyn Model>,
    space: Box<dyn UncertainSpace>,
    design_dimension: usize,
}

impl RobustProblem {
    pub fn new(
        model: impl Model + 'static,
        space: impl UncertainSpace + 'static,
        design_dimension: usize,
    ) -> Result<Self, StatisticError> {
        let expected = design_dimension + space.dimension();
        if model.input_dimension() != expected {
            return Err(StatisticError::DimensionMismatch {
                expected,
                found: model.input_dimension(),
            });
        }
        Ok(Self {
            model: Box::new(model),
            space: Box::new(space),
            design_dimension,
        })
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn space(&self) -> &dyn UncertainSpace {
        self.space.as_ref()
    }

    pub fn design_dimension(&self) -> usize {
        self.design_dimension
    }

    pub fn uncertain_dimension(&self) -> usize {
        self.space.dimension()
    }

    pub fn output_dimension(&self) -> usize {
        self.model.output_dimension()
    }

    pub(crate) fn check_design(&self, design: &ArrayView1<'_, f64>) -> Result<(), StatisticError> {
        if design.len() != self.design_dimension {
            return Err(StatisticError::DimensionMismatch {
                expected: self.design_dimension,
                found: design.len(),
            });
        }
        Ok(())
    }

    /// `n` uncertain draws; the same seed always gives the same draws.
    pub fn draw(&self, seed: u64, n: usize) -> Array2<f64> {
        self.space.draw(&mut StdRng::seed_from_u64(seed), n)
    }

    /// The model with the design variables frozen at `design`.
    pub fn at_design(&self, design: ArrayView1<'_, f64>) -> FixedDesign<'_> {
        FixedDesign {
            model: self.model.as_ref(),
            design: design.to_owned(),
        }
    }

    /// Outputs `n × k` at every draw and, on request, their Jacobians
    /// `n × k × p` w.r.t. the design.
    pub fn sample(
        &self,
        design: ArrayView1<'_, f64>,
        inputs: ArrayView2<'_, f64>,
        with_jacobian: bool,
    ) -> Result<(Array2<f64>, Option<Array3<f64>>), StatisticError> {
        self.check_design(&design)?;
        let n = inputs.nrows();
        let k = self.output_dimension();
        let p = self.design_dimension;
        let mut outputs = Array2::zeros((n, k));
        let mut jacobians = with_jacobian.then(|| Array3::zeros((n, k, p)));
        for (i, u) in inputs.rows().into_iter().enumerate() {
            let x = concatenate(design, u);
            outputs.row_mut(i).assign(&self.model.evaluate(x.view())?);
            if let Some(j) = jacobians.as_mut() {
                let full = self.model.jacobian(x.view())?;
                j.slice_mut(s![i, .., ..]).assign(&full.slice(s![.., ..p]));
            }
        }
        Ok((outputs, jacobians))
    }
}

pub(crate) fn concatenate(design: ArrayView1<'_, f64>, uncertain: ArrayView1<'_, f64>) -> Array1<f64> {
    design.iter().chain(uncertain.iter()).copied().collect()
}

/// A [`Model`] of the uncertain inputs only, at a fixed design.
pub struct FixedDesign<'a> {
    model: &'a dyn Model,
    design: Array1<f64>,
}

impl Model for FixedDesign<'_> {
    fn input_dimension(&self) -> usize {
        self.model.input_dimension() - self.design.len()
    }

    fn output_dimension(&self) -> usize {
        self.model.output_dimension()
    }

    fn evaluate(&self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>, StatisticError> {
        self.model.evaluate(concatenate(self.design.view(), input).view())
    }

    fn jacobian(&self, input: ArrayView1<'_, f64>) -> Result<Array2<f64>, StatisticError> {
        let full = self
            .model
            .jacobian(concatenate(self.design.view(), input).view())?;
        Ok(full.slice(s![.., self.design.len()..]).to_owned())
    }
}

use ndarray::{Array1, Array2, Array3, ArrayView1};

use crate::core::StatisticError;

pub const DEFAULT_FD_STEP: f64 = 1e-6;

/// `2⁻¹³`, close to `ε^¼`: the relative step balancing truncation and rounding
/// errors of second-order central differences.
pub const SECOND_ORDER_STEP: f64 = 1.0 / 8192.0;

/// A deterministic model `y = f(x)` mapping an input vector to an output vector.
///
/// The input is the concatenation of the design variables and the uncertain
/// variables when the model is used inside a statistic function. Non-finite
/// outputs are passed through unchanged.
pub trait Model {
    fn input_dimension(&self) -> usize;

    fn output_dimension(&self) -> usize;

    fn evaluate(&self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>, StatisticError>;

    /// Jacobian `output × input` at `input`.
    ///
    /// Defaults to forward finite differences; analytic models should override it.
    fn jacobian(&self, input: ArrayView1<'_, f64>) -> Result<Array2<f64>, StatisticError> {
        FiniteDifferences::default().jacobian(self, input)
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn input_dimension(&self) -> usize {
        (**self).input_dimension()
    }

    fn output_dimension(&self) -> usize {
        (**self).output_dimension()
    }

    fn evaluate(&self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>, StatisticError> {
        (**self).evaluate(input)
    }

    fn jacobian(&self, input: ArrayView1<'_, f64>) -> Result<Array2<f64>, StatisticError> {
        (**self).jacobian(input)
    }
}

type Function = Box<dyn Fn(ArrayView1<'_, f64>) -> Array1<f64>>;
type JacobianFunction = Box<dyn Fn(ArrayView1<'_, f64>) -> Array2<f64>>;

/// A [`Model`] built from closures.
pub struct FnModel {
    input_dimension: usize,
    output_dimension: usize,
    function: Function,
    jacobian: Option<JacobianFunction>,
}

impl FnModel {
    pub fn new<F>(input_dimension: usize, output_dimension: usize, function: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>) -> Array1<f64> + 'static,
    {
        Self {
            input_dimension,
            output_dimension,
            function: Box::new(function),
            jacobian: None,
        }
    }

    pub fn with_jacobian<J>(mut self, jacobian: J) -> Self
    where
        J: Fn(ArrayView1<'_, f64>) -> Array2<f64> + 'static,
    {
        self.jacobian = Some(Box::new(jacobian));
        self
    }

    fn check_input(&self, input: &ArrayView1<'_, f64>) -> Result<(), StatisticError> {
        if input.len() != self.input_dimension {
            return Err(StatisticError::DimensionMismatch {
                expected: self.input_dimension,
                found: input.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for FnModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModel")
            .field("input_dimension", &self.input_dimension)
            .field("output_dimension", &self.output_dimension)
            .field("analytic_jacobian", &self.jacobian.is_some())
            .finish()
    }
}

impl Model for FnModel {
    fn input_dimension(&self) -> usize {
        self.input_dimension
    }

    fn output_dimension(&self) -> usize {
        self.output_dimension
    }

    fn evaluate(&self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>, StatisticError> {
        self.check_input(&input)?;
        let output = (self.function)(input);
        if output.len() != self.output_dimension {
            return Err(StatisticError::DimensionMismatch {
                expected: self.output_dimension,
                found: output.len(),
            });
        }
        Ok(output)
    }

    fn jacobian(&self, input: ArrayView1<'_, f64>) -> Result<Array2<f64>, StatisticError> {
        self.check_input(&input)?;
        match &self.jacobian {
            Some(jacobian) => {
                let j = jacobian(input);
                if j.dim() != (self.output_dimension, self.input_dimension) {
                    return Err(StatisticError::ShapeMismatch(format!(
                        "jacobian is {:?}, expected {:?}",
                        j.dim(),
                        (self.output_dimension, self.input_dimension)
                    )));
                }
                Ok(j)
            }
            None => FiniteDifferences::default().jacobian(self, input),
        }
    }
}

/// Finite differences: forward with a fixed absolute step, central with a
/// relative one.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifferences {
    step: f64,
}

impl Default for FiniteDifferences {
    fn default() -> Self {
        Self {
            step: DEFAULT_FD_STEP,
        }
    }
}

impl FiniteDifferences {
    pub fn new(step: f64) -> Result<Self, StatisticError> {
        if !(step.is_finite() && step > 0.0) {
            return Err(StatisticError::InvalidParameter(format!(
                "finite-difference step must be positive, got {step}"
            )));
        }
        Ok(Self { step })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Differentiates an arbitrary vector function at `x`; column `j` of the
    /// result is `(f(x + h e_j) - f(x)) / h`.
    pub fn differentiate<F>(&self, x: ArrayView1<'_, f64>, mut f: F) -> Result<Array2<f64>, StatisticError>
    where
        F: FnMut(ArrayView1<'_, f64>) -> Result<Array1<f64>, StatisticError>,
    {
        let f0 = f(x)?;
        let mut jacobian = Array2::zeros((f0.len(), x.len()));
        let mut shifted = x.to_owned();
        for j in 0..x.len() {
            shifted[j] += self.step;
            let fj = f(shifted.view())?;
            if fj.len() != f0.len() {
                return Err(StatisticError::DimensionMismatch {
                    expected: f0.len(),
                    found: fj.len(),
                });
            }
            jacobian
                .column_mut(j)
                .assign(&((&fj - &f0) / self.step));
            shifted[j] = x[j];
        }
        Ok(jacobian)
    }

    /// Central differences of an arbitrary vector function at `x`, with the
    /// relative step `h_j = step · max(1, |x_j|)`.
    pub fn central_differentiate<F>(
        &self,
        x: ArrayView1<'_, f64>,
        mut f: F,
    ) -> Result<Array2<f64>, StatisticError>
    where
        F: FnMut(ArrayView1<'_, f64>) -> Result<Array1<f64>, StatisticError>,
    {
        if x.is_empty() {
            return Ok(Array2::zeros((f(x)?.len(), 0)));
        }
        let mut jacobian: Option<Array2<f64>> = None;
        let mut shifted = x.to_owned();
        for j in 0..x.len() {
            let h = self.step * x[j].abs().max(1.0);
            shifted[j] = x[j] + h;
            let forward = f(shifted.view())?;
            let upper = shifted[j];
            shifted[j] = x[j] - h;
            let backward = f(shifted.view())?;
            let span = upper - shifted[j];
            shifted[j] = x[j];

            let columns =
                jacobian.get_or_insert_with(|| Array2::zeros((forward.len(), x.len())));
            for found in [forward.len(), backward.len()] {
                if found != columns.nrows() {
                    return Err(StatisticError::DimensionMismatch {
                        expected: columns.nrows(),
                        found,
                    });
                }
            }
            columns
                .column_mut(j)
                .assign(&((&forward - &backward) / span));
        }
        Ok(jacobian.unwrap_or_default())
    }

    pub fn jacobian<M: Model + ?Sized>(
        &self,
        model: &M,
        x: ArrayView1<'_, f64>,
    ) -> Result<Array2<f64>, StatisticError> {
        self.differentiate(x, |v| model.evaluate(v))
    }

    /// Hessian `output × input × input` from second-order central differences
    /// of the model values.
    ///
    /// The relative step is `max(step, 2⁻¹³) · max(1, |x_i|)`: smaller steps
    /// drown the curvature in rounding noise.
    pub fn hessian<M: Model + ?Sized>(
        &self,
        model: &M,
        x: ArrayView1<'_, f64>,
    ) -> Result<Array3<f64>, StatisticError> {
        let f0 = model.evaluate(x)?;
        let n_in = x.len();
        let base = self.step.max(SECOND_ORDER_STEP);
        // exact representable steps
        let steps: Vec<f64> = x
            .iter()
            .map(|&xi| (xi + base * xi.abs().max(1.0)) - xi)
            .collect();

        let mut shifted = x.to_owned();
        let mut at = |moves: &[(usize, f64)]| -> Result<Array1<f64>, StatisticError> {
            for &(i, sign) in moves {
                shifted[i] = x[i] + sign * steps[i];
            }
            let value = model.evaluate(shifted.view());
            for &(i, _) in moves {
                shifted[i] = x[i];
            }
            let value = value?;
            if value.len() != f0.len() {
                return Err(StatisticError::DimensionMismatch {
                    expected: f0.len(),
                    found: value.len(),
                });
            }
            Ok(value)
        };

        let mut hessian = Array3::zeros((f0.len(), n_in, n_in));
        for i in 0..n_in {
            let plus = at(&[(i, 1.0)])?;
            let minus = at(&[(i, -1.0)])?;
            let diagonal = (&plus - &(2.0 * &f0) + &minus) / (steps[i] * steps[i]);
            for (k, value) in diagonal.iter().enumerate() {
                hessian[[k, i, i]] = *value;
            }
            for j in 0..i {
                let pp = at(&[(i, 1.0), (j, 1.0)])?;
                let pm = at(&[(i, 1.0), (j, -1.0)])?;
                let mp = at(&[(i, -1.0), (j, 1.0)])?;
                let mm = at(&[(i, -1.0), (j, -1.0)])?;
                let mixed = (&pp - &pm - &mp + &mm) / (4.0 * steps[i] * steps[j]);
                for (k, value) in mixed.iter().enumerate() {
                    hessian[[k, i, j]] = *value;
                    hessian[[k, j, i]] = *value;
                }
            }
        }
        Ok(hessian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    fn quadratic() -> FnModel {
        FnModel::new(2, 2, |x| array![x[0] * x[0] + x[1], 3.0 * x[0] * x[1]])
    }

    #[test]
    fn evaluate_checks_input_dimension() {
        let m = quadratic();
        let err = m.evaluate(array![1.0].view()).unwrap_err();
        assert!(matches!(
            err,
            StatisticError::DimensionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn finite_difference_jacobian_is_close_to_analytic() {
        let m = quadratic();
        let j = m.jacobian(array![1.0, 2.0].view()).unwrap();
        assert_abs_diff_eq!(j, array![[2.0, 1.0], [6.0, 3.0]], epsilon = 1e-4);
    }

    #[test]
    fn analytic_jacobian_is_used_when_given() {
        let m = FnModel::new(1, 1, |x| array![x[0]]).with_jacobian(|_| array![[42.0]]);
        assert_eq!(m.jacobian(array![0.0].view()).unwrap(), array![[42.0]]);
    }

    #[test]
    fn analytic_jacobian_shape_is_checked() {
        let m = FnModel::new(1, 1, |x| array![x[0]]).with_jacobian(|_| array![[1.0, 2.0]]);
        assert!(matches!(
            m.jacobian(array![0.0].view()),
            Err(StatisticError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn hessian_of_quadratic() {
        let h = FiniteDifferences::default()
            .hessian(&quadratic(), array![1.0, 2.0].view())
            .unwrap();
        assert_abs_diff_eq!(
            h,
            array![[[2.0, 0.0], [0.0, 0.0]], [[0.0, 3.0], [3.0, 0.0]]],
            epsilon = 1e-6
        );
    }

    #[test]
    fn hessian_keeps_curvature_of_large_outputs() {
        // Forward-differenced Jacobians lose most of this curvature.
        let m = FnModel::new(2, 1, |x| array![1000.0 * x[0] * x[1] * x[1] + x[1]]);
        let h = FiniteDifferences::default()
            .hessian(&m, array![2.0, 3.0].view())
            .unwrap();
        assert_relative_eq!(h[[0, 1, 1]], 4000.0, max_relative = 1e-6);
        assert_relative_eq!(h[[0, 0, 1]], 6000.0, max_relative = 1e-6);
        assert_relative_eq!(h[[0, 1, 0]], h[[0, 0, 1]]);
        assert_abs_diff_eq!(h[[0, 0, 0]], 0.0, epsilon = 1e-3);
    }

    #[test]
    fn central_differences_of_a_cubic() {
        let fd = FiniteDifferences::new(SECOND_ORDER_STEP).unwrap();
        let j = fd
            .central_differentiate(array![2.0, -1.0].view(), |x| {
                Ok(array![x[0].powi(3), x[0] * x[1]])
            })
            .unwrap();
        assert_relative_eq!(j[[0, 0]], 12.0, max_relative = 1e-7);
        assert_relative_eq!(j[[1, 0]], -1.0, max_relative = 1e-9);
        assert_relative_eq!(j[[1, 1]], 2.0, max_relative = 1e-9);
        assert_abs_diff_eq!(j[[0, 1]], 0.0);
    }

    #[test]
    fn invalid_step_is_rejected() {
        assert!(FiniteDifferences::new(0.0).is_err());
        assert!(FiniteDifferences::new(f64::NAN).is_err());
        assert_eq!(FiniteDifferences::new(1e-3).unwrap().step(), 1e-3);
    }
}

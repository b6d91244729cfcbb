use faer::linalg::solvers::Solve;
use faer::{Mat, Side};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::core::StatisticError;

pub fn column_means(samples: ArrayView2<'_, f64>) -> Result<Array1<f64>, StatisticError> {
    samples
        .mean_axis(Axis(0))
        .ok_or(StatisticError::EmptySample)
}

/// Per-column sample variance with the `n - 1` denominator (NaN for one row).
pub fn column_variances(samples: ArrayView2<'_, f64>) -> Result<Array1<f64>, StatisticError> {
    if samples.nrows() == 0 {
        return Err(StatisticError::EmptySample);
    }
    Ok(samples.var_axis(Axis(0), 1.0))
}

/// Per-column sample covariance between two equally shaped matrices.
pub fn column_covariances(
    a: ArrayView2<'_, f64>,
    b: ArrayView2<'_, f64>,
) -> Result<Array1<f64>, StatisticError> {
    if a.dim() != b.dim() {
        return Err(StatisticError::ShapeMismatch(format!(
            "{:?} vs {:?}",
            a.dim(),
            b.dim()
        )));
    }
    let mean_a = column_means(a)?;
    let mean_b = column_means(b)?;
    let products = (&a - &mean_a) * (&b - &mean_b);
    Ok(products.sum_axis(Axis(0)) / (a.nrows() as f64 - 1.0))
}

/// Solves `a x = b` through the LLT factorization of a symmetric
/// positive-definite `a`. Returns `None` when `a` is not numerically positive
/// definite or an entry is not finite.
pub fn cholesky_solve(a: ArrayView2<'_, f64>, b: ArrayView1<'_, f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n || a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    let matrix = Mat::from_fn(n, n, |i, j| a[[i, j]]);
    let factor = matrix.as_ref().llt(Side::Lower).ok()?;
    let l = factor.L();
    // near-zero pivots give meaningless solutions
    if (0..n).any(|i| l[(i, i)] * l[(i, i)] <= f64::EPSILON * a[[i, i]].abs().max(1.0)) {
        return None;
    }
    let rhs = Mat::from_fn(n, 1, |i, _| b[i]);
    let solution = factor.solve(rhs.as_ref());
    Some(Array1::from_shape_fn(n, |i| solution[(i, 0)]))
}

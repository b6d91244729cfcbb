use ndarray::array;

use crate::core::{FnModel, IndependentNormal};
use crate::formulation::RobustProblem;

pub const AFFINE_DESIGN: [f64; 2] = [1.5, 0.5];

/// `f(d, u) = d0 + d1·u0 + 2·u1` with `u ~ N(0, I₂)`, analytic Jacobian.
pub fn affine_model() -> FnModel {
    FnModel::new(4, 1, |x| array![x[0] + x[1] * x[2] + 2.0 * x[3]])
        .with_jacobian(|x| array![[1.0, x[2], x[1], 2.0]])
}

pub fn affine_problem() -> RobustProblem {
    let space = IndependentNormal::standard(2).expect("standard normal");
    RobustProblem::new(affine_model(), space, 2).expect("affine problem")
}

mod mean;
mod mlcv_mean;
mod variance;

pub use mean::MeanPilot;
pub use mlcv_mean::MlcvMeanPilot;
pub use variance::VariancePilot;

/// Sum of the defined terms; levels without samples contribute nothing.
pub(crate) fn nansum(terms: impl IntoIterator<Item = f64>) -> f64 {
    terms.into_iter().filter(|t| !t.is_nan()).sum()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use ndarray::{Array2, array};

    use crate::multilevel::PilotSetup;

    pub fn setup() -> PilotSetup {
        PilotSetup::new(vec![2.0, 2.0, 2.0], vec![1.0, 2.0, 3.0])
    }

    pub fn level_one() -> Array2<f64> {
        array![[1.1, 1.4], [2.1, 2.5]]
    }

    pub fn level_two() -> Array2<f64> {
        array![[1.2, 1.6], [2.2, 2.7]]
    }
}

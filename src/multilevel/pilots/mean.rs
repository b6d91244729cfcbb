use ndarray::{Array1, ArrayView2};

use crate::core::{IterativeMoments, StatisticError};
use crate::multilevel::pilots::nansum;
use crate::multilevel::{AllocationCriterion, Pilot, PilotSetup};

/// Telescopes `E[f[ℓ] - f[ℓ-1]]`; `V_ℓ` is the sample variance of the deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanPilot {
    criterion: AllocationCriterion,
    deltas: Vec<IterativeMoments>,
}

impl MeanPilot {
    pub fn new(setup: &PilotSetup) -> Result<Self, StatisticError> {
        let criterion = setup.criterion()?;
        let deltas = (0..criterion.n_levels())
            .map(|_| IterativeMoments::new(2, 1))
            .collect::<Result<_, _>>()?;
        Ok(Self { criterion, deltas })
    }
}

impl Pilot for MeanPilot {
    fn criterion(&self) -> &AllocationCriterion {
        &self.criterion
    }

    fn width(&self, _level: usize) -> usize {
        2
    }

    fn ingest(&mut self, level: usize, samples: ArrayView2<'_, f64>) -> Result<(), StatisticError> {
        let moments = &mut self.deltas[level];
        for row in samples.rows() {
            moments.increment(ndarray::arr1(&[row[0] - row[1]]).view())?;
        }
        Ok(())
    }

    fn n_samples(&self) -> Vec<usize> {
        self.deltas.iter().map(IterativeMoments::count).collect()
    }

    fn statistic(&self) -> f64 {
        nansum(self.deltas.iter().map(|m| m.mean()[0]))
    }

    fn term_variances(&self) -> Array1<f64> {
        self.deltas.iter().map(|m| m.variance()[0]).collect()
    }
}

use crate::build::BuildError;
use crate::config::PilotChoice;
use crate::multilevel::{MeanPilot, MlcvMeanPilot, Pilot, PilotSetup, VariancePilot};

pub fn build_pilot(choice: &PilotChoice, setup: &PilotSetup) -> Result<Box<dyn Pilot>, BuildError> {
    Ok(match choice {
        PilotChoice::Mean(_) => Box::new(MeanPilot::new(setup)?),
        PilotChoice::Variance(_) => Box::new(VariancePilot::new(setup)?),
        PilotChoice::MlcvMean(p) => Box::new(MlcvMeanPilot::new(setup, p.variant)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Choice, MlcvParameters, PilotKind};
    use crate::multilevel::MlcvVariant;
    use strum::IntoEnumIterator;

    #[test]
    fn builds_every_pilot() {
        let setup = PilotSetup::new(vec![2.0, 2.0], vec![1.0, 3.0])
            .with_surrogate_means(vec![0.0, 0.0], vec![0.0]);
        for kind in PilotKind::iter() {
            let pilot = build_pilot(&PilotChoice::default_for(kind).unwrap(), &setup).unwrap();
            assert_eq!(pilot.n_levels(), 2);
        }
    }

    #[test]
    fn mlcv_variant_sets_row_width() {
        let setup = PilotSetup::new(vec![2.0; 3], vec![1.0, 2.0, 3.0])
            .with_surrogate_means(vec![0.0; 3], vec![0.0; 2]);
        let choice = PilotChoice::MlcvMean(MlcvParameters {
            variant: MlcvVariant::MlmcCv,
        });
        let pilot = build_pilot(&choice, &setup).unwrap();
        assert_eq!(pilot.width(0), 3);
        assert_eq!(pilot.width(2), 3);
    }

    #[test]
    fn inconsistent_setup_is_reported() {
        let setup = PilotSetup::new(vec![2.0], vec![1.0, 2.0]);
        let r = build_pilot(&PilotChoice::Mean(Default::default()), &setup);
        assert!(matches!(r, Err(BuildError::Statistic(_))));
    }
}

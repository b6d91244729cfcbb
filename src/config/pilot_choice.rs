use crate::config::{Choice, NoParameters};
use crate::multilevel::MlcvVariant;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct MlcvParameters {
    #[serde(default)]
    #[schemars(
        title = "Variant",
        description = "Surrogates used to correct each level of the telescoping sum"
    )]
    pub variant: MlcvVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(PilotKind))]
#[strum_discriminants(derive(Hash, EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case", ascii_case_insensitive))]
pub enum PilotChoice {
    #[strum_discriminants(strum(
        message = "Mean",
        detailed_message = "Telescoping sum of level means; V_l is the variance of the level difference."
    ))]
    Mean(NoParameters),

    #[strum_discriminants(strum(
        message = "Variance",
        detailed_message = "Telescoping sum of level variances; V_l uses fourth central moments."
    ))]
    Variance(NoParameters),

    #[strum_discriminants(strum(
        message = "Mean with multilevel control variates",
        detailed_message = "Telescoping sum of level means, each corrected by surrogates with known means."
    ))]
    MlcvMean(MlcvParameters),
}

impl Choice for PilotChoice {
    type Kind = PilotKind;

    fn schema() -> Schema {
        schema_for!(PilotChoice)
    }

    fn default_params(kind: Self::Kind) -> anyhow::Result<Value> {
        Ok(match kind {
            PilotKind::Mean | PilotKind::Variance => serde_json::to_value(NoParameters::default())?,
            PilotKind::MlcvMean => serde_json::to_value(MlcvParameters::default())?,
        })
    }

    fn kind(&self) -> Self::Kind {
        PilotKind::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mlcv_variant_parses_from_json() {
        let c = PilotChoice::from_parts(PilotKind::MlcvMean, json!({ "variant": "MLMC-CV[0]" }))
            .unwrap();
        assert_eq!(
            c,
            PilotChoice::MlcvMean(MlcvParameters {
                variant: MlcvVariant::MlmcCv0
            })
        );
    }

    #[test]
    fn mlcv_variant_defaults_to_full_variant() {
        let c = PilotChoice::default_for(PilotKind::MlcvMean).unwrap();
        assert_eq!(c, PilotChoice::MlcvMean(MlcvParameters::default()));
        assert_eq!(MlcvParameters::default().variant, MlcvVariant::MlmcMlcv);
    }
}

use crate::config::Choice;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

pub const DEFAULT_MARGIN_FACTOR: f64 = 2.0;

fn default_factor() -> f64 {
    DEFAULT_MARGIN_FACTOR
}

fn default_threshold() -> f64 {
    0.0
}

fn default_greater() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct NoParameters {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarginParameters {
    #[serde(default = "default_factor")]
    #[schemars(
        title = "Factor",
        description = "Multiplier k of the standard deviation in mean + k·std",
        default = "default_factor"
    )]
    pub factor: f64,
}

impl Default for MarginParameters {
    fn default() -> Self {
        Self {
            factor: default_factor(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProbabilityParameters {
    #[serde(default = "default_threshold")]
    #[schemars(
        title = "Threshold",
        description = "Value compared against each output",
        default = "default_threshold"
    )]
    pub threshold: f64,

    #[serde(default = "default_greater")]
    #[schemars(
        title = "Greater",
        description = "Estimate P[Y >= threshold] if true, P[Y <= threshold] otherwise",
        default = "default_greater"
    )]
    pub greater: bool,
}

impl Default for ProbabilityParameters {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            greater: default_greater(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(StatisticKind))]
#[strum_discriminants(derive(Hash, EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case", ascii_case_insensitive))]
pub enum StatisticChoice {
    #[strum_discriminants(strum(
        message = "Mean",
        detailed_message = "Expectation of each output component."
    ))]
    Mean(NoParameters),

    #[strum_discriminants(strum(
        message = "Variance",
        detailed_message = "Unbiased variance of each output component."
    ))]
    Variance(NoParameters),

    #[strum_discriminants(strum(
        message = "Standard deviation",
        detailed_message = "Square root of the variance."
    ))]
    StandardDeviation(NoParameters),

    #[strum_discriminants(strum(
        message = "Margin",
        detailed_message = "Mean plus a multiple of the standard deviation."
    ))]
    Margin(MarginParameters),

    #[strum_discriminants(strum(
        message = "Probability",
        detailed_message = "Probability that an output exceeds (or stays below) a threshold."
    ))]
    Probability(ProbabilityParameters),
}

impl StatisticChoice {
    pub fn mean() -> Self {
        Self::Mean(NoParameters {})
    }

    pub fn variance() -> Self {
        Self::Variance(NoParameters {})
    }

    pub fn standard_deviation() -> Self {
        Self::StandardDeviation(NoParameters {})
    }

    pub fn margin(factor: f64) -> Self {
        Self::Margin(MarginParameters { factor })
    }

    pub fn probability(threshold: f64, greater: bool) -> Self {
        Self::Probability(ProbabilityParameters { threshold, greater })
    }
}

impl Choice for StatisticChoice {
    type Kind = StatisticKind;

    fn schema() -> Schema {
        schema_for!(StatisticChoice)
    }

    fn default_params(kind: Self::Kind) -> anyhow::Result<Value> {
        Ok(match kind {
            StatisticKind::Mean | StatisticKind::Variance | StatisticKind::StandardDeviation => {
                serde_json::to_value(NoParameters::default())?
            }
            StatisticKind::Margin => serde_json::to_value(MarginParameters::default())?,
            StatisticKind::Probability => serde_json::to_value(ProbabilityParameters::default())?,
        })
    }

    fn kind(&self) -> Self::Kind {
        StatisticKind::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn kinds_parse_from_kebab_case_ignoring_ascii_case() {
        assert_eq!(
            StatisticKind::from_str("standard-deviation").unwrap(),
            StatisticKind::StandardDeviation
        );
        assert_eq!(StatisticKind::from_str("Mean").unwrap(), StatisticKind::Mean);
        assert!(StatisticKind::from_str("median").is_err());
    }

    #[test]
    fn margin_defaults_to_two() {
        let c = StatisticChoice::default_for(StatisticKind::Margin).unwrap();
        assert_eq!(c, StatisticChoice::margin(2.0));
    }

    #[test]
    fn probability_from_partial_params() {
        let c =
            StatisticChoice::from_parts(StatisticKind::Probability, json!({ "threshold": 1.5 }))
                .unwrap();
        assert_eq!(c, StatisticChoice::probability(1.5, true));
        assert_eq!(c.kind(), StatisticKind::Probability);
    }

    #[test]
    fn round_trips_through_tagged_json() {
        let c = StatisticChoice::margin(3.0);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v, json!({ "type": "margin", "params": { "factor": 3.0 } }));
    }

    #[test]
    fn catalogue_lists_every_kind() {
        let names: Vec<_> = StatisticChoice::catalogue()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(
            names,
            vec!["mean", "variance", "standard-deviation", "margin", "probability"]
        );
    }

    #[test]
    fn schema_mentions_margin_factor() {
        let s = serde_json::to_string(&StatisticChoice::schema()).unwrap();
        assert!(s.contains("factor"));
    }
}

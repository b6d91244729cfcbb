use std::collections::BTreeMap;

use anyhow::Result;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};

use crate::config::{StatisticChoice, StrategyChoice};

/// Strategy and named statistics of a statistic engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    #[schemars(
        title = "Strategy",
        description = "Estimation strategy shared by every statistic"
    )]
    pub strategy: StrategyChoice,

    #[serde(default)]
    #[schemars(title = "Statistics", description = "Statistics by name")]
    pub statistics: BTreeMap<String, StatisticChoice>,
}

impl EngineConfig {
    pub fn schema() -> Schema {
        schema_for!(EngineConfig)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EstimationStrategy;
    use crate::config::Choice;

    #[test]
    fn statistics_default_to_none() {
        let c = EngineConfig::from_json(r#"{ "strategy": { "type": "sampling", "params": {} } }"#)
            .unwrap();
        assert!(c.statistics.is_empty());
        assert_eq!(c.strategy.kind(), EstimationStrategy::Sampling);
    }

    #[test]
    fn unknown_statistic_is_rejected() {
        let r = EngineConfig::from_json(
            r#"{ "strategy": { "type": "sampling", "params": {} },
                 "statistics": { "x": { "type": "median", "params": {} } } }"#,
        );
        assert!(r.is_err());
    }

    #[test]
    fn schema_lists_both_fields() {
        let s = serde_json::to_string(&EngineConfig::schema()).unwrap();
        assert!(s.contains("strategy") && s.contains("statistics"));
    }
}

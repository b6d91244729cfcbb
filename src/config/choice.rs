use anyhow::Result;
use schemars::{JsonSchema, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use strum::{EnumMessage, IntoEnumIterator};

/// Contract for any “choice enum”: a serde-tagged enum whose strum
/// discriminant names the implementation and whose payload carries its
/// parameters.
pub trait Choice: Sized + Serialize + DeserializeOwned + JsonSchema {
    type Kind: Copy + Into<&'static str> + EnumMessage + IntoEnumIterator;

    /// JSON Schema for the whole tagged enum.
    fn schema() -> Schema;

    /// Default `params` JSON for a given kind (usually from `*Parameters::default()`).
    fn default_params(kind: Self::Kind) -> Result<Value>;

    /// The discriminant of this choice.
    fn kind(&self) -> Self::Kind;

    /// Build the typed enum from kind + params.
    fn from_parts(kind: Self::Kind, params: Value) -> Result<Self> {
        let key: &'static str = kind.into();
        let v = json!({ "type": key, "params": params });
        Ok(serde_json::from_value(v)?)
    }

    /// Build the choice for `kind` with its default parameters.
    fn default_for(kind: Self::Kind) -> Result<Self> {
        Self::from_parts(kind, Self::default_params(kind)?)
    }

    /// Names and short descriptions of every available kind.
    fn catalogue() -> Vec<(&'static str, &'static str)> {
        Self::Kind::iter()
            .map(|k| {
                let name: &'static str = k.into();
                (name, k.get_message().unwrap_or_default())
            })
            .collect()
    }
}

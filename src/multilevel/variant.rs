use std::ops::Range;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Which surrogates correct each term of the telescoping sum.
///
/// `g[ℓ]` approximates `f[ℓ]` and is used at level 0; `h[ℓ]` approximates
/// `f[ℓ] - f[ℓ-1]` and is used at level `ℓ > 0`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
)]
pub enum MlcvVariant {
    /// Every `g` at level 0 and every `h` at the other levels.
    #[default]
    #[serde(rename = "MLMC-MLCV")]
    #[strum(serialize = "MLMC-MLCV")]
    MlmcMlcv,

    /// `g[0]` and `g[1]` at level 0, `h[1]` at the other levels.
    #[serde(rename = "MLMC-MLCV[0]")]
    #[strum(serialize = "MLMC-MLCV[0]")]
    MlmcMlcv0,

    /// `g[0]` at level 0, `h[ℓ]` at level `ℓ`.
    #[serde(rename = "MLMC-CV")]
    #[strum(serialize = "MLMC-CV")]
    MlmcCv,

    /// `g[0]` at level 0 only.
    #[serde(rename = "MLMC-CV[0]")]
    #[strum(serialize = "MLMC-CV[0]")]
    MlmcCv0,
}

impl MlcvVariant {
    /// Positions of the surrogates sampled at `level` among `g[0..n_levels]`
    /// (level 0) or `h[1..n_levels]` (other levels, position `ℓ - 1` for `h[ℓ]`).
    pub fn surrogate_positions(&self, level: usize, n_levels: usize) -> Range<usize> {
        if level == 0 {
            return match self {
                MlcvVariant::MlmcMlcv => 0..n_levels,
                MlcvVariant::MlmcMlcv0 => 0..2.min(n_levels),
                MlcvVariant::MlmcCv | MlcvVariant::MlmcCv0 => 0..1,
            };
        }
        match self {
            MlcvVariant::MlmcMlcv => 0..n_levels - 1,
            MlcvVariant::MlmcMlcv0 => 0..1,
            MlcvVariant::MlmcCv => level - 1..level,
            MlcvVariant::MlmcCv0 => 0..0,
        }
    }
}

//! Per-session reward parameters.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::warn;

/// Curve used by the weighted raffle to turn a value ratio into a weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ShapingFunctionKind {
    #[default]
    Linear,
    Quadratic,
    Sigmoid,
}

impl ShapingFunctionKind {
    /// Resolve a numeric wire code.
    ///
    /// Unknown codes resolve to [`ShapingFunctionKind::Sigmoid`] so that clients
    /// built against the numeric enum keep working.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Linear,
            1 => Self::Quadratic,
            2 => Self::Sigmoid,
            other => {
                warn!(code = other, "unknown shaping function code; using SIGMOID");
                Self::Sigmoid
            }
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Linear => 0,
            Self::Quadratic => 1,
            Self::Sigmoid => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Quadratic => "QUADRATIC",
            Self::Sigmoid => "SIGMOID",
        }
    }
}

impl fmt::Display for ShapingFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapingFunctionKind {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LINEAR" => Ok(Self::Linear),
            "QUADRATIC" => Ok(Self::Quadratic),
            "SIGMOID" => Ok(Self::Sigmoid),
            _ => Err(ParameterError::UnknownFunction(s.to_string())),
        }
    }
}

// Echoed back as the numeric code the client sent.
impl Serialize for ShapingFunctionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KindRepr {
    Code(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for ShapingFunctionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match KindRepr::deserialize(deserializer)? {
            KindRepr::Code(code) => Ok(Self::from_code(code)),
            KindRepr::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// Flat win probability.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleConfig {
    pub probability: f64,
}

/// Value-weighted raffle.
///
/// `limit` is the value at which the ratio fed to the shaping curve reaches 1.
/// A `limit` of zero or less is treated as infinite weight.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedRaffleConfig {
    pub limit: f64,
    pub min_probability: f64,
    pub max_probability: f64,
    pub func_type: ShapingFunctionKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickConfig {
    pub choices: Vec<String>,
}

/// The full reward configuration of one session. Always replaced as a unit.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParameters {
    pub raffle: RaffleConfig,
    pub weighted_raffle: WeightedRaffleConfig,
    pub pick: PickConfig,
}

#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("malformed parameters: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown shaping function: {0}")]
    UnknownFunction(String),
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f64 },
}

impl SessionParameters {
    /// Decode and validate a client-supplied parameter object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ParameterError> {
        let parameters: Self = serde_json::from_value(value)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Reject values no draw can be computed from. Out-of-range but finite
    /// values are left to the engine, which clamps them.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let fields = [
            ("raffle.probability", self.raffle.probability),
            ("weightedRaffle.limit", self.weighted_raffle.limit),
            ("weightedRaffle.minProbability", self.weighted_raffle.min_probability),
            ("weightedRaffle.maxProbability", self.weighted_raffle.max_probability),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite { field, value });
            }
        }
        Ok(())
    }
}

//! Trust score value types

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::TrustError;

/// Confidence that a generated answer is accurate, always within [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TrustScore(f64);

impl TrustScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 1.0;

    /// Validate a raw score. Both bounds are legal values.
    pub fn new(value: f64) -> Result<Self, TrustError> {
        if value.is_nan() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(TrustError::invalid_input(format!(
                "Trust score {} is outside [0, 1]",
                value
            )));
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for TrustScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl<'de> Deserialize<'de> for TrustScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        TrustScore::new(value).map_err(serde::de::Error::custom)
    }
}

/// Score returned by a score oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleScore {
    pub trust: TrustScore,
    /// Explanations and other oracle-specific details
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl OracleScore {
    pub fn new(trust: TrustScore) -> Self {
        Self {
            trust,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Whether an answer carries a real score.
///
/// `Unavailable` is never the same thing as a score of 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored { trust: TrustScore },
    Unavailable { reason: String },
}

impl ScoreOutcome {
    pub fn scored(trust: TrustScore) -> Self {
        Self::Scored { trust }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn trust(&self) -> Option<TrustScore> {
        match self {
            Self::Scored { trust } => Some(*trust),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Scored { .. })
    }
}

impl fmt::Display for ScoreOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scored { trust } => write!(f, "{}", trust),
            Self::Unavailable { reason } => write!(f, "unavailable ({})", reason),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::PoseFormError;
use crate::models::keypoint::{JointAngleKind, Pose};

/// Independent algorithms for scoring how alike two skeletons are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SimilarityStrategy {
    #[serde(rename = "keyAngles")]
    KeyAngles,
    #[serde(rename = "relativeAngles")]
    RelativeAngles,
    #[serde(rename = "invariantFeatures")]
    InvariantFeatures,
}

impl SimilarityStrategy {
    pub fn all() -> [Self; 3] {
        [Self::KeyAngles, Self::RelativeAngles, Self::InvariantFeatures]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::KeyAngles => "keyAngles",
            Self::RelativeAngles => "relativeAngles",
            Self::InvariantFeatures => "invariantFeatures",
        }
    }
}

impl fmt::Display for SimilarityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityStrategy {
    type Err = PoseFormError;

    /// Accepts `keyAngles`, `key-angles`, `key_angles` and `KEY_ANGLES` spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match folded.as_str() {
            "keyangles" => Ok(Self::KeyAngles),
            "relativeangles" => Ok(Self::RelativeAngles),
            "invariantfeatures" => Ok(Self::InvariantFeatures),
            _ => Err(PoseFormError::UnknownStrategy(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SimilarityStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// One weighted entry of a combined similarity request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeight {
    pub strategy: SimilarityStrategy,
    pub weight: f64,
    /// Angles compared by KEY_ANGLES; ignored by the other strategies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_angles: Option<Vec<JointAngleKind>>,
}

impl StrategyWeight {
    pub fn new(strategy: SimilarityStrategy, weight: f64) -> Self {
        Self {
            strategy,
            weight,
            selected_angles: None,
        }
    }

    pub fn with_angles(mut self, angles: Vec<JointAngleKind>) -> Self {
        self.selected_angles = Some(angles);
        self
    }
}

/// Options for a combined similarity computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityOptions {
    pub strategies: Vec<StrategyWeight>,
    /// Rotate both skeletons so the torso axis is vertical before scoring
    #[serde(default)]
    pub normalize: bool,
}

impl SimilarityOptions {
    pub fn new(strategies: Vec<StrategyWeight>) -> Self {
        Self {
            strategies,
            normalize: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    pub fn total_weight(&self) -> f64 {
        self.strategies.iter().map(|s| s.weight).sum()
    }
}

/// Score of one strategy inside a combined computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyScore {
    pub strategy: SimilarityStrategy,
    pub weight: f64,
    pub score: f64,
}

/// Combined similarity with its per-strategy parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    pub parts: Vec<StrategyScore>,
    /// Weighted mean before the convexity adjustment
    pub weighted_mean: f64,
    /// Final displayed score
    pub combined: f64,
}

/// Snapshot recorded when the smoothed similarity stays high
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub similarity: f64,
    pub pose: Pose,
}

impl SimilarityLog {
    pub fn new(timestamp: DateTime<Utc>, similarity: f64, pose: Pose) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            similarity,
            pose,
        }
    }
}

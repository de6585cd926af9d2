use serde::{Deserialize, Serialize};

use crate::error::{PoseFormError, Result};
use crate::models::keypoint::DEFAULT_MIN_CONFIDENCE;
use crate::models::similarity::{SimilarityOptions, SimilarityStrategy, StrategyWeight};
use crate::services::orientation::DEFAULT_FRONT_OFFSET;
use crate::services::score_smoother::{DEFAULT_MIN_CHANGE, DEFAULT_WINDOW_SIZE};
use crate::services::similarity_engine::{validate_weights, DEFAULT_ADJUSTMENT_EXPONENT};

/// Scoring configuration shared by the library sessions and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    #[serde(default)]
    pub normalize: bool,

    #[serde(default = "default_adjustment_exponent")]
    pub adjustment_exponent: f64,

    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyWeight>,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub orientation: OrientationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_min_change")]
    pub min_change: f64,

    /// Score every n-th frame
    #[serde(default = "default_frame_interval")]
    pub frame_interval: u32,
}

/// When a high similarity is worth recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationConfig {
    /// Largest horizontal nose offset from the shoulder midpoint still counted as facing front
    #[serde(default = "default_front_offset")]
    pub front_offset: f64,
}

// Default value functions
fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_adjustment_exponent() -> f64 {
    DEFAULT_ADJUSTMENT_EXPONENT
}

fn default_strategies() -> Vec<StrategyWeight> {
    vec![StrategyWeight::new(SimilarityStrategy::RelativeAngles, 1.0)]
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_min_change() -> f64 {
    DEFAULT_MIN_CHANGE
}

fn default_frame_interval() -> u32 {
    3
}

fn default_min_similarity() -> f64 {
    0.5
}

fn default_min_interval_ms() -> u64 {
    2000
}

fn default_front_offset() -> f64 {
    DEFAULT_FRONT_OFFSET
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            normalize: false,
            adjustment_exponent: default_adjustment_exponent(),
            strategies: default_strategies(),
            smoothing: SmoothingConfig::default(),
            logging: LoggingConfig::default(),
            orientation: OrientationConfig::default(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            min_change: default_min_change(),
            frame_interval: default_frame_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            front_offset: default_front_offset(),
        }
    }
}

impl ScoringConfig {
    /// Reject values the scoring code cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(PoseFormError::InvalidConfig(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }

        if !self.adjustment_exponent.is_finite() || self.adjustment_exponent <= 0.0 {
            return Err(PoseFormError::InvalidConfig(format!(
                "adjustment_exponent must be positive, got {}",
                self.adjustment_exponent
            )));
        }

        if self.smoothing.window_size == 0 {
            return Err(PoseFormError::InvalidConfig(
                "smoothing.window_size must be at least 1".to_string(),
            ));
        }

        if self.smoothing.frame_interval == 0 {
            return Err(PoseFormError::InvalidConfig(
                "smoothing.frame_interval must be at least 1".to_string(),
            ));
        }

        if !self.smoothing.min_change.is_finite() || self.smoothing.min_change < 0.0 {
            return Err(PoseFormError::InvalidConfig(format!(
                "smoothing.min_change must be non-negative, got {}",
                self.smoothing.min_change
            )));
        }

        if !(0.0..=1.0).contains(&self.logging.min_similarity) {
            return Err(PoseFormError::InvalidConfig(format!(
                "logging.min_similarity must be within [0, 1], got {}",
                self.logging.min_similarity
            )));
        }

        if i64::try_from(self.logging.min_interval_ms).is_err() {
            return Err(PoseFormError::InvalidConfig(format!(
                "logging.min_interval_ms is too large: {}",
                self.logging.min_interval_ms
            )));
        }

        if !self.orientation.front_offset.is_finite() || self.orientation.front_offset <= 0.0 {
            return Err(PoseFormError::InvalidConfig(format!(
                "orientation.front_offset must be positive, got {}",
                self.orientation.front_offset
            )));
        }

        validate_weights(&self.strategies)
    }

    /// Options for the combined similarity described by this configuration
    pub fn similarity_options(&self) -> SimilarityOptions {
        SimilarityOptions {
            strategies: self.strategies.clone(),
            normalize: self.normalize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.min_confidence, 0.3);
        assert_eq!(config.adjustment_exponent, 2.0);
        assert_eq!(config.smoothing.window_size, 5);
        assert_eq!(config.smoothing.frame_interval, 3);
        assert_eq!(config.logging.min_interval_ms, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScoringConfig = serde_json::from_str(
            r#"{"normalize": true, "strategies": [{"strategy": "keyAngles", "weight": 0.5}]}"#,
        )
        .unwrap();

        assert!(config.normalize);
        assert_eq!(config.strategies.len(), 1);
        assert_eq!(config.smoothing, SmoothingConfig::default());
        assert!(config.similarity_options().normalize);
    }

    #[test]
    fn test_unknown_strategy_fails_to_parse() {
        let result: std::result::Result<ScoringConfig, _> =
            serde_json::from_str(r#"{"strategies": [{"strategy": "wristFlicks", "weight": 0.5}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScoringConfig::default();
        config.min_confidence = 1.5;
        assert!(matches!(config.validate(), Err(PoseFormError::InvalidConfig(_))));

        let mut config = ScoringConfig::default();
        config.strategies = vec![
            StrategyWeight::new(SimilarityStrategy::KeyAngles, 0.7),
            StrategyWeight::new(SimilarityStrategy::InvariantFeatures, 0.7),
        ];
        assert!(matches!(config.validate(), Err(PoseFormError::InvalidWeights(_))));

        let mut config = ScoringConfig::default();
        config.smoothing.frame_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_logging_and_orientation_values() {
        let mut config = ScoringConfig::default();
        config.logging.min_similarity = f64::NAN;
        assert!(matches!(config.validate(), Err(PoseFormError::InvalidConfig(_))));

        let mut config = ScoringConfig::default();
        config.logging.min_similarity = 1.2;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.logging.min_interval_ms = u64::MAX;
        assert!(matches!(config.validate(), Err(PoseFormError::InvalidConfig(_))));

        let mut config = ScoringConfig::default();
        config.orientation.front_offset = f64::NAN;
        assert!(matches!(config.validate(), Err(PoseFormError::InvalidConfig(_))));
    }

    #[test]
    fn test_strategy_spellings_match_parsing() {
        let config: ScoringConfig = serde_json::from_str(
            r#"{"strategies": [{"strategy": "KEY_ANGLES", "weight": 0.5}]}"#,
        )
        .unwrap();
        assert_eq!(config.strategies[0].strategy, SimilarityStrategy::KeyAngles);
    }
}

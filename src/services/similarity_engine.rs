/// Similarity Engine
///
/// Dispatches to the three scoring strategies and blends them:
/// - optional shared torso normalization of both skeletons
/// - weighted mean of the requested strategy scores (0 when no weight)
/// - convexity adjustment `mean ^ exponent` to spread near-matches apart
///
/// The engine is stateless per call; smoothing over frames belongs to the caller.

use tracing::warn;

use crate::error::{PoseFormError, Result};
use crate::models::keypoint::{JointAngleKind, Pose, DEFAULT_MIN_CONFIDENCE};
use crate::models::similarity::{
    SimilarityBreakdown, SimilarityOptions, SimilarityStrategy, StrategyScore, StrategyWeight,
};
use crate::services::invariant_features::invariant_features_similarity;
use crate::services::key_angle_similarity::key_angle_similarity;
use crate::services::pose_normalizer::normalize_pose;
use crate::services::relative_angle_similarity::relative_angle_similarity;

/// Exponent of the convexity adjustment applied to the combined score
pub const DEFAULT_ADJUSTMENT_EXPONENT: f64 = 2.0;

/// Slack allowed when checking that weights sum to at most 1
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Check that every weight lies in [0, 1] and that they sum to at most 1
pub fn validate_weights(strategies: &[StrategyWeight]) -> Result<()> {
    for entry in strategies {
        if !entry.weight.is_finite() || entry.weight < 0.0 || entry.weight > 1.0 {
            warn!(strategy = %entry.strategy, weight = entry.weight, "rejecting strategy weight");
            return Err(PoseFormError::InvalidWeights(format!(
                "weight for {} must be within [0, 1], got {}",
                entry.strategy, entry.weight
            )));
        }
    }

    let total: f64 = strategies.iter().map(|entry| entry.weight).sum();
    if total > 1.0 + WEIGHT_SUM_TOLERANCE {
        warn!(total, "rejecting strategy weights summing above 1");
        return Err(PoseFormError::InvalidWeights(format!(
            "weights must sum to at most 1, got {:.3}",
            total
        )));
    }

    Ok(())
}

/// Pose similarity scorer
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    min_confidence: f64,
    adjustment_exponent: f64,
}

impl SimilarityEngine {
    /// Create an engine with the default confidence threshold and adjustment
    pub fn new() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            adjustment_exponent: DEFAULT_ADJUSTMENT_EXPONENT,
        }
    }

    /// Set minimum confidence threshold
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// Override the convexity adjustment exponent (1.0 disables it).
    ///
    /// Only finite positive exponents keep the score in [0, 1]; anything else
    /// is ignored with a warning.
    pub fn with_adjustment_exponent(mut self, exponent: f64) -> Self {
        if exponent.is_finite() && exponent > 0.0 {
            self.adjustment_exponent = exponent;
        } else {
            warn!(
                exponent,
                kept = self.adjustment_exponent,
                "ignoring adjustment exponent outside (0, inf)"
            );
        }
        self
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn adjustment_exponent(&self) -> f64 {
        self.adjustment_exponent
    }

    /// KEY_ANGLES similarity over the selected joint angles
    pub fn key_angles(&self, pose: &Pose, reference: &Pose, selected: &[JointAngleKind]) -> f64 {
        key_angle_similarity(pose, reference, selected, self.min_confidence)
    }

    /// RELATIVE_ANGLES similarity
    pub fn relative_angles(&self, pose: &Pose, reference: &Pose) -> f64 {
        relative_angle_similarity(pose, reference, self.min_confidence)
    }

    /// INVARIANT_FEATURES similarity
    pub fn invariant_features(&self, pose: &Pose, reference: &Pose) -> f64 {
        invariant_features_similarity(pose, reference, self.min_confidence)
    }

    /// Score one strategy entry. KEY_ANGLES without a selection compares all eight angles.
    pub fn strategy_score(&self, pose: &Pose, reference: &Pose, entry: &StrategyWeight) -> f64 {
        match entry.strategy {
            SimilarityStrategy::KeyAngles => match &entry.selected_angles {
                Some(selected) => self.key_angles(pose, reference, selected),
                None => self.key_angles(pose, reference, &JointAngleKind::all()),
            },
            SimilarityStrategy::RelativeAngles => self.relative_angles(pose, reference),
            SimilarityStrategy::InvariantFeatures => self.invariant_features(pose, reference),
        }
    }

    /// Combined score together with each strategy's contribution
    pub fn combined_breakdown(
        &self,
        pose: &Pose,
        reference: &Pose,
        options: &SimilarityOptions,
    ) -> Result<SimilarityBreakdown> {
        validate_weights(&options.strategies)?;

        let (pose, reference) = if options.normalize {
            (
                normalize_pose(pose, self.min_confidence),
                normalize_pose(reference, self.min_confidence),
            )
        } else {
            (pose.clone(), reference.clone())
        };

        let parts: Vec<StrategyScore> = options
            .strategies
            .iter()
            .map(|entry| StrategyScore {
                strategy: entry.strategy,
                weight: entry.weight,
                score: self.strategy_score(&pose, &reference, entry),
            })
            .collect();

        let total_weight: f64 = parts.iter().map(|part| part.weight).sum();
        let weighted_mean = if total_weight > 0.0 {
            parts.iter().map(|part| part.score * part.weight).sum::<f64>() / total_weight
        } else {
            0.0
        };

        Ok(SimilarityBreakdown {
            parts,
            weighted_mean,
            combined: self.adjust(weighted_mean),
        })
    }

    /// Weighted, adjusted similarity of `pose` against `reference`
    pub fn combined(&self, pose: &Pose, reference: &Pose, options: &SimilarityOptions) -> Result<f64> {
        Ok(self.combined_breakdown(pose, reference, options)?.combined)
    }

    fn adjust(&self, similarity: f64) -> f64 {
        similarity.clamp(0.0, 1.0).powf(self.adjustment_exponent)
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// KEY_ANGLES similarity with the default confidence threshold
pub fn calculate_pose_similarity(pose: &Pose, reference: &Pose, selected: &[JointAngleKind]) -> f64 {
    SimilarityEngine::new().key_angles(pose, reference, selected)
}

/// RELATIVE_ANGLES similarity with the default confidence threshold
pub fn calculate_relative_angle_similarity(pose: &Pose, reference: &Pose) -> f64 {
    SimilarityEngine::new().relative_angles(pose, reference)
}

/// INVARIANT_FEATURES similarity with the default confidence threshold
pub fn calculate_invariant_features_similarity(pose: &Pose, reference: &Pose) -> f64 {
    SimilarityEngine::new().invariant_features(pose, reference)
}

/// Combined similarity with the default threshold and adjustment exponent
pub fn calculate_combined_similarity(
    pose: &Pose,
    reference: &Pose,
    options: &SimilarityOptions,
) -> Result<f64> {
    SimilarityEngine::new().combined(pose, reference, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::keypoint::Keypoint;

    fn pose() -> Pose {
        Pose::new(vec![
            Keypoint::new("left_shoulder", 30.0, 30.0, 0.9),
            Keypoint::new("right_shoulder", 70.0, 30.0, 0.9),
            Keypoint::new("left_elbow", 25.0, 60.0, 0.9),
            Keypoint::new("right_elbow", 75.0, 60.0, 0.9),
            Keypoint::new("left_wrist", 22.0, 90.0, 0.9),
            Keypoint::new("right_wrist", 78.0, 90.0, 0.9),
            Keypoint::new("left_hip", 38.0, 100.0, 0.9),
            Keypoint::new("right_hip", 62.0, 100.0, 0.9),
            Keypoint::new("left_knee", 38.0, 140.0, 0.9),
            Keypoint::new("right_knee", 62.0, 140.0, 0.9),
            Keypoint::new("left_ankle", 38.0, 180.0, 0.9),
            Keypoint::new("right_ankle", 62.0, 180.0, 0.9),
        ])
    }

    #[test]
    fn test_weights_above_one_are_rejected() {
        let options = SimilarityOptions::new(vec![
            StrategyWeight::new(SimilarityStrategy::KeyAngles, 0.6),
            StrategyWeight::new(SimilarityStrategy::RelativeAngles, 0.6),
        ]);
        let result = calculate_combined_similarity(&pose(), &pose(), &options);
        assert!(matches!(result, Err(PoseFormError::InvalidWeights(_))));
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let result = validate_weights(&[StrategyWeight::new(SimilarityStrategy::KeyAngles, -0.1)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_total_weight_scores_zero() {
        let options = SimilarityOptions::new(vec![StrategyWeight::new(
            SimilarityStrategy::RelativeAngles,
            0.0,
        )]);
        assert_eq!(calculate_combined_similarity(&pose(), &pose(), &options).unwrap(), 0.0);
        let empty = SimilarityOptions::new(Vec::new());
        assert_eq!(calculate_combined_similarity(&pose(), &pose(), &empty).unwrap(), 0.0);
    }

    #[test]
    fn test_adjustment_squares_weighted_mean() {
        let mut bent = pose();
        bent.keypoints[4] = Keypoint::new("left_wrist", 45.0, 60.0, 0.9);

        let options = SimilarityOptions::new(vec![StrategyWeight::new(
            SimilarityStrategy::KeyAngles,
            1.0,
        )
        .with_angles(vec![JointAngleKind::LeftElbow])]);

        let breakdown = SimilarityEngine::new()
            .combined_breakdown(&pose(), &bent, &options)
            .unwrap();
        assert!(breakdown.weighted_mean < 1.0);
        assert!((breakdown.combined - breakdown.weighted_mean.powi(2)).abs() < 1e-12);

        let linear = SimilarityEngine::new()
            .with_adjustment_exponent(1.0)
            .combined(&pose(), &bent, &options)
            .unwrap();
        assert!((linear - breakdown.weighted_mean).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_exponent_keeps_score_in_range() {
        for exponent in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let engine = SimilarityEngine::new().with_adjustment_exponent(exponent);
            assert_eq!(engine.adjustment_exponent(), DEFAULT_ADJUSTMENT_EXPONENT);
        }

        let nothing_comparable = SimilarityOptions::new(vec![StrategyWeight::new(
            SimilarityStrategy::KeyAngles,
            1.0,
        )
        .with_angles(Vec::new())]);
        let score = SimilarityEngine::new()
            .with_adjustment_exponent(-1.0)
            .combined(&pose(), &pose(), &nothing_comparable)
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_identical_poses_combine_to_one() {
        let options = SimilarityOptions::new(vec![
            StrategyWeight::new(SimilarityStrategy::KeyAngles, 0.4),
            StrategyWeight::new(SimilarityStrategy::RelativeAngles, 0.3),
            StrategyWeight::new(SimilarityStrategy::InvariantFeatures, 0.3),
        ])
        .normalized();
        let score = calculate_combined_similarity(&pose(), &pose(), &options).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_angle_selection_scores_zero() {
        let entry = StrategyWeight::new(SimilarityStrategy::KeyAngles, 1.0).with_angles(Vec::new());
        assert_eq!(SimilarityEngine::new().strategy_score(&pose(), &pose(), &entry), 0.0);
    }
}

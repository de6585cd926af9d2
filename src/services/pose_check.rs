use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::keypoint::Pose;
use crate::models::pose_check::{
    CheckKind, CheckResult, Comparison, PoseCheck, DEFAULT_ANGLE_TOLERANCE, DEFAULT_HEIGHT_TOLERANCE,
};
use crate::services::angle_math;

/// Measure a check on one pose: `(value, is_passing)`.
///
/// Angle checks measure degrees at the middle joint. Height checks measure
/// the absolute vertical distance between two points in the pose's own units.
/// An unmeasurable check never passes.
pub fn evaluate_check(pose: &Pose, check: &PoseCheck, min_confidence: f64) -> (Option<f64>, bool) {
    match &check.kind {
        CheckKind::Angle {
            joints,
            comparison,
            target_value,
            tolerance,
        } => {
            let value = (|| {
                angle_math::angle(
                    pose.available(joints[0], min_confidence)?,
                    pose.available(joints[1], min_confidence)?,
                    pose.available(joints[2], min_confidence)?,
                )
            })();

            let passing = value.is_some_and(|angle| match comparison {
                Comparison::Greater => angle > *target_value,
                Comparison::Less => angle < *target_value,
                Comparison::Equal => {
                    (angle - target_value).abs() <= tolerance.unwrap_or(DEFAULT_ANGLE_TOLERANCE)
                }
            });

            (value, passing)
        }
        CheckKind::Height {
            points,
            standard_value,
            tolerance,
        } => {
            let value = match (
                pose.available(points[0], min_confidence),
                pose.available(points[1], min_confidence),
            ) {
                (Some(a), Some(b)) => Some((a.y - b.y).abs()),
                _ => None,
            };

            let passing = value.is_some_and(|height| {
                (height - standard_value).abs() <= tolerance.unwrap_or(DEFAULT_HEIGHT_TOLERANCE)
            });

            (value, passing)
        }
    }
}

/// Tracks how long each check has been passing without interruption
#[derive(Debug, Clone, Default)]
pub struct PoseCheckTracker {
    checks: Vec<PoseCheck>,
    passing_since: HashMap<String, DateTime<Utc>>,
    min_confidence: f64,
}

impl PoseCheckTracker {
    pub fn new(checks: Vec<PoseCheck>, min_confidence: f64) -> Self {
        Self {
            checks,
            passing_since: HashMap::new(),
            min_confidence,
        }
    }

    pub fn checks(&self) -> &[PoseCheck] {
        &self.checks
    }

    /// Evaluate every check on the frame observed at `now`
    pub fn update(&mut self, pose: &Pose, now: DateTime<Utc>) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let (value, is_passing) = evaluate_check(pose, check, self.min_confidence);

            let passing_ms = if is_passing {
                let since = *self.passing_since.entry(check.id.clone()).or_insert(now);
                (now - since).num_milliseconds()
            } else {
                self.passing_since.remove(&check.id);
                0
            };

            results.push(CheckResult {
                check_id: check.id.clone(),
                value,
                is_passing,
                passing_ms,
            });
        }

        results
    }

    /// Forget all passing streaks
    pub fn reset(&mut self) {
        self.passing_since.clear();
    }
}

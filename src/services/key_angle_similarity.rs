/// KEY_ANGLES strategy: compare selected joint angles directly
///
/// Similarity = max(0, 1 - mean |Δangle| / 180) over the selected angles
/// measurable in both skeletons. Angles missing from either side are left
/// out of the mean rather than counted as a worst-case difference.

use statrs::statistics::Statistics;
use tracing::warn;

use crate::models::keypoint::{JointAngleKind, Pose};
use crate::services::angle_math;

const MAX_ANGLE_DIFFERENCE: f64 = 180.0;

/// Measure one named joint angle, `None` when unavailable or degenerate
pub fn joint_angle(pose: &Pose, kind: JointAngleKind, min_confidence: f64) -> Option<f64> {
    let (a, b, c) = kind.joints();
    angle_math::angle(
        pose.available(a, min_confidence)?,
        pose.available(b, min_confidence)?,
        pose.available(c, min_confidence)?,
    )
}

/// Absolute per-angle differences for the angles measurable in both poses
pub fn angle_differences(
    pose: &Pose,
    reference: &Pose,
    selected: &[JointAngleKind],
    min_confidence: f64,
) -> Vec<(JointAngleKind, f64)> {
    selected
        .iter()
        .filter_map(|kind| {
            let current = joint_angle(pose, *kind, min_confidence)?;
            let target = joint_angle(reference, *kind, min_confidence)?;
            Some((*kind, (current - target).abs()))
        })
        .collect()
}

/// Score two skeletons by their selected joint angles.
///
/// Returns 0 when no selected angle can be compared, since such a
/// comparison carries no information.
pub fn key_angle_similarity(
    pose: &Pose,
    reference: &Pose,
    selected: &[JointAngleKind],
    min_confidence: f64,
) -> f64 {
    let differences: Vec<f64> = angle_differences(pose, reference, selected, min_confidence)
        .into_iter()
        .map(|(_, diff)| diff)
        .collect();

    if differences.is_empty() {
        warn!(
            selected = selected.len(),
            "no joint angle measurable in both poses, similarity defaults to 0"
        );
        return 0.0;
    }

    let mean_difference = differences.iter().mean();
    (1.0 - mean_difference / MAX_ANGLE_DIFFERENCE).max(0.0)
}

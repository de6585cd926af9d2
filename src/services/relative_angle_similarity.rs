/// RELATIVE_ANGLES strategy: limb headings measured against the torso axis
///
/// Each limb segment's heading is taken relative to the torso heading
/// (shoulder midpoint to hip midpoint), which makes the comparison
/// insensitive to in-plane rotation of the whole body.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::models::keypoint::{BodyPart, Pose};
use crate::services::angle_math;

/// The eight limb segments compared by relative angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbSegment {
    LeftUpperArm,
    LeftLowerArm,
    RightUpperArm,
    RightLowerArm,
    LeftUpperLeg,
    LeftLowerLeg,
    RightUpperLeg,
    RightLowerLeg,
}

impl LimbSegment {
    pub fn all() -> [Self; 8] {
        [
            Self::LeftUpperArm,
            Self::LeftLowerArm,
            Self::RightUpperArm,
            Self::RightLowerArm,
            Self::LeftUpperLeg,
            Self::LeftLowerLeg,
            Self::RightUpperLeg,
            Self::RightLowerLeg,
        ]
    }

    /// (start, end) keypoints of the segment
    pub fn endpoints(&self) -> (BodyPart, BodyPart) {
        use BodyPart::*;
        match self {
            Self::LeftUpperArm => (LeftShoulder, LeftElbow),
            Self::LeftLowerArm => (LeftElbow, LeftWrist),
            Self::RightUpperArm => (RightShoulder, RightElbow),
            Self::RightLowerArm => (RightElbow, RightWrist),
            Self::LeftUpperLeg => (LeftHip, LeftKnee),
            Self::LeftLowerLeg => (LeftKnee, LeftAnkle),
            Self::RightUpperLeg => (RightHip, RightKnee),
            Self::RightLowerLeg => (RightKnee, RightAnkle),
        }
    }
}

/// Heading of the shoulder-midpoint to hip-midpoint vector, in radians
pub fn torso_heading(pose: &Pose, min_confidence: f64) -> Option<f64> {
    let shoulders = angle_math::midpoint(
        pose.available(BodyPart::LeftShoulder, min_confidence)?,
        pose.available(BodyPart::RightShoulder, min_confidence)?,
    );
    let hips = angle_math::midpoint(
        pose.available(BodyPart::LeftHip, min_confidence)?,
        pose.available(BodyPart::RightHip, min_confidence)?,
    );
    Some(angle_math::heading(&shoulders, &hips))
}

/// Limb headings relative to the torso, normalized into (-π, π].
///
/// Empty when the torso itself is unavailable.
pub fn relative_angles(pose: &Pose, min_confidence: f64) -> BTreeMap<LimbSegment, f64> {
    let mut angles = BTreeMap::new();

    let Some(torso) = torso_heading(pose, min_confidence) else {
        return angles;
    };

    for segment in LimbSegment::all() {
        let (start, end) = segment.endpoints();
        if let (Some(start), Some(end)) = (
            pose.available(start, min_confidence),
            pose.available(end, min_confidence),
        ) {
            let limb = angle_math::heading(start, end);
            angles.insert(segment, angle_math::normalize_angle(limb - torso));
        }
    }

    angles
}

/// 1 - mean angular difference / π over segments present in both maps, 0 if none
pub fn compare_relative_angles(
    angles: &BTreeMap<LimbSegment, f64>,
    reference: &BTreeMap<LimbSegment, f64>,
) -> f64 {
    let differences: Vec<f64> = angles
        .iter()
        .filter_map(|(segment, angle)| {
            let other = reference.get(segment)?;
            Some(angle_math::normalize_angle(angle - other).abs())
        })
        .collect();

    if differences.is_empty() {
        return 0.0;
    }

    1.0 - differences.iter().mean() / PI
}

/// Score two skeletons by torso-relative limb headings
pub fn relative_angle_similarity(pose: &Pose, reference: &Pose, min_confidence: f64) -> f64 {
    compare_relative_angles(
        &relative_angles(pose, min_confidence),
        &relative_angles(reference, min_confidence),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::keypoint::Keypoint;

    fn figure(arm_dx: f64) -> Pose {
        Pose::new(vec![
            Keypoint::new("left_shoulder", 0.0, 0.0, 0.9),
            Keypoint::new("right_shoulder", 20.0, 0.0, 0.9),
            Keypoint::new("left_hip", 0.0, 40.0, 0.9),
            Keypoint::new("right_hip", 20.0, 40.0, 0.9),
            Keypoint::new("left_elbow", arm_dx, 15.0, 0.9),
            Keypoint::new("right_elbow", 20.0, 15.0, 0.9),
        ])
    }

    fn rotate(pose: &Pose, radians: f64) -> Pose {
        let (sin, cos) = radians.sin_cos();
        Pose::new(
            pose.keypoints
                .iter()
                .map(|kp| {
                    let mut out = kp.clone();
                    out.x = kp.x * cos - kp.y * sin;
                    out.y = kp.x * sin + kp.y * cos;
                    out
                })
                .collect(),
        )
    }

    #[test]
    fn test_identical_poses_score_one() {
        let pose = figure(-15.0);
        assert!((relative_angle_similarity(&pose, &pose, 0.3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_invariance() {
        let pose = figure(-15.0);
        let rotated = rotate(&pose, 0.7);
        assert!((relative_angle_similarity(&pose, &rotated, 0.3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_arm_raised_sideways_lowers_score() {
        // left upper arm hanging vs pointing straight out: π/2 on one of two segments
        let hanging = figure(0.0);
        let mut raised = figure(0.0);
        raised.keypoints[4] = Keypoint::new("left_elbow", -15.0, 0.0, 0.9);

        let score = relative_angle_similarity(&hanging, &raised, 0.3);
        assert!((score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_missing_torso_scores_zero() {
        let pose = figure(0.0).without(BodyPart::RightHip);
        assert!(relative_angles(&pose, 0.3).is_empty());
        assert_eq!(relative_angle_similarity(&pose, &figure(0.0), 0.3), 0.0);
    }
}

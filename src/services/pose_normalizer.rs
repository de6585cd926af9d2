/// Torso-axis normalization
///
/// Rotates every keypoint about the shoulder midpoint so that the
/// shoulder-midpoint to hip-midpoint vector points straight down the image.
/// This removes camera-relative body tilt before similarity scoring.

use std::f64::consts::FRAC_PI_2;

use crate::models::keypoint::{BodyPart, Pose};
use crate::services::angle_math;

/// Rotate `pose` so its torso axis is vertical.
///
/// Returns an unchanged copy when either shoulder or either hip is unavailable.
pub fn normalize_pose(pose: &Pose, min_confidence: f64) -> Pose {
    let (Some(left_shoulder), Some(right_shoulder), Some(left_hip), Some(right_hip)) = (
        pose.available(BodyPart::LeftShoulder, min_confidence),
        pose.available(BodyPart::RightShoulder, min_confidence),
        pose.available(BodyPart::LeftHip, min_confidence),
        pose.available(BodyPart::RightHip, min_confidence),
    ) else {
        return pose.clone();
    };

    let shoulder_center = angle_math::midpoint(left_shoulder, right_shoulder);
    let hip_center = angle_math::midpoint(left_hip, right_hip);

    let rotation = FRAC_PI_2 - angle_math::heading(&shoulder_center, &hip_center);
    let (sin, cos) = rotation.sin_cos();

    let keypoints = pose
        .keypoints
        .iter()
        .map(|kp| {
            let dx = kp.x - shoulder_center.x;
            let dy = kp.y - shoulder_center.y;
            let mut rotated = kp.clone();
            rotated.x = dx * cos - dy * sin + shoulder_center.x;
            rotated.y = dx * sin + dy * cos + shoulder_center.y;
            rotated
        })
        .collect();

    Pose {
        keypoints,
        score: pose.score,
    }
}

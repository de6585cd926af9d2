/// Facing detector
///
/// Classifies which way a person faces the camera from the horizontal nose
/// offset relative to the shoulder midpoint and from eye/ear visibility.
/// Only front-facing poses with confident nose and shoulders are marked valid
/// for scoring against a front-facing reference.

use tracing::debug;

use crate::models::keypoint::{BodyPart, Pose};
use crate::models::orientation::{Direction, Orientation};
use crate::services::angle_math;

/// Largest nose offset (in pose units) still counted as facing front
pub const DEFAULT_FRONT_OFFSET: f64 = 15.0;

const FRONT_ANGLE_GAIN: f64 = 2.0;
const SIDE_EAR_GAIN: f64 = 30.0;

/// Estimate the facing direction and an approximate yaw angle in degrees.
///
/// UNKNOWN when the nose or either shoulder is unavailable. FRONT needs both
/// eyes and both ears visible with the nose within `front_offset` of the
/// shoulder midpoint. A nose clearly off-center is SIDE whether or not the
/// ears are visible, since a profile usually hides one of them; anything else BACK.
pub fn estimate_orientation(pose: &Pose, min_confidence: f64, front_offset: f64) -> Orientation {
    let (Some(nose), Some(left_shoulder), Some(right_shoulder)) = (
        pose.available(BodyPart::Nose, min_confidence),
        pose.available(BodyPart::LeftShoulder, min_confidence),
        pose.available(BodyPart::RightShoulder, min_confidence),
    ) else {
        return Orientation::unknown();
    };

    let visible = |part| pose.available(part, min_confidence).is_some();
    let both_eyes = visible(BodyPart::LeftEye) && visible(BodyPart::RightEye);
    let both_ears = visible(BodyPart::LeftEar) && visible(BodyPart::RightEar);

    let shoulder_center = angle_math::midpoint(left_shoulder, right_shoulder);
    let nose_offset = nose.x - shoulder_center.x;

    let direction = if both_eyes && both_ears && nose_offset.abs() < front_offset {
        Direction::Front
    } else if nose_offset.abs() >= front_offset {
        Direction::Side
    } else {
        Direction::Back
    };

    let angle = match direction {
        Direction::Front => nose_offset * FRONT_ANGLE_GAIN,
        Direction::Side => {
            let shoulder_width = right_shoulder.x - left_shoulder.x;
            let ear_ratio = match (
                pose.available(BodyPart::LeftEar, min_confidence),
                pose.available(BodyPart::RightEar, min_confidence),
            ) {
                (Some(left), Some(right)) if shoulder_width.abs() > f64::EPSILON => {
                    (right.x - left.x).abs() / shoulder_width.abs()
                }
                _ => 0.0,
            };
            let (side, sign) = if nose_offset > 0.0 { (90.0, -1.0) } else { (-90.0, 1.0) };
            side + sign * (1.0 - ear_ratio) * SIDE_EAR_GAIN
        }
        _ => {
            // yaw from the shoulder-center to nose vector measured against image up
            let dx = nose.x - shoulder_center.x;
            let dy = nose.y - shoulder_center.y;
            dx.atan2(-dy).to_degrees().rem_euclid(360.0)
        }
    };

    let anchor_confidence = [nose.score, left_shoulder.score, right_shoulder.score]
        .into_iter()
        .flatten()
        .fold(f64::INFINITY, f64::min);
    let is_valid = direction == Direction::Front && anchor_confidence > min_confidence;

    debug!(%direction, angle, nose_offset, "estimated orientation");

    Orientation {
        angle,
        direction,
        is_valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::keypoint::Keypoint;

    fn head(nose_x: f64, ears: bool) -> Pose {
        let mut keypoints = vec![
            Keypoint::new("nose", nose_x, 20.0, 0.9),
            Keypoint::new("left_eye", 45.0, 15.0, 0.9),
            Keypoint::new("right_eye", 55.0, 15.0, 0.9),
            Keypoint::new("left_shoulder", 30.0, 60.0, 0.9),
            Keypoint::new("right_shoulder", 70.0, 60.0, 0.9),
        ];
        if ears {
            keypoints.push(Keypoint::new("left_ear", 40.0, 18.0, 0.9));
            keypoints.push(Keypoint::new("right_ear", 60.0, 18.0, 0.9));
        }
        Pose::new(keypoints)
    }

    #[test]
    fn test_centered_face_is_front() {
        let orientation = estimate_orientation(&head(52.0, true), 0.3, DEFAULT_FRONT_OFFSET);
        assert_eq!(orientation.direction, Direction::Front);
        assert!((orientation.angle - 4.0).abs() < 1e-9);
        assert!(orientation.is_valid);
    }

    #[test]
    fn test_offset_nose_is_side() {
        let orientation = estimate_orientation(&head(75.0, true), 0.3, DEFAULT_FRONT_OFFSET);
        assert_eq!(orientation.direction, Direction::Side);
        // ear ratio 20 / 40 = 0.5, so 90 - 0.5 * 30
        assert!((orientation.angle - 75.0).abs() < 1e-9);
        assert!(!orientation.is_valid);
    }

    #[test]
    fn test_side_does_not_need_ears() {
        let orientation = estimate_orientation(&head(75.0, false), 0.3, DEFAULT_FRONT_OFFSET);
        assert_eq!(orientation.direction, Direction::Side);
        // no ear spread, full profile correction
        assert!((orientation.angle - 60.0).abs() < 1e-9);

        let facing_left = estimate_orientation(&head(20.0, false), 0.3, DEFAULT_FRONT_OFFSET);
        assert_eq!(facing_left.direction, Direction::Side);
        assert!((facing_left.angle + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_hidden_ears_with_centered_nose_is_back() {
        let orientation = estimate_orientation(&head(50.0, false), 0.3, DEFAULT_FRONT_OFFSET);
        assert_eq!(orientation.direction, Direction::Back);
        assert!(!orientation.is_valid);
    }

    #[test]
    fn test_missing_shoulder_is_unknown() {
        let pose = head(50.0, true).without(BodyPart::RightShoulder);
        assert_eq!(
            estimate_orientation(&pose, 0.3, DEFAULT_FRONT_OFFSET),
            Orientation::unknown()
        );
    }
}

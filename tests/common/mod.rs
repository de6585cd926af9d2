// Shared skeleton fixtures for the integration tests
#![allow(dead_code)]

use pose_form::models::{Keypoint, Pose};

pub fn pose(points: &[(&str, f64, f64)]) -> Pose {
    Pose::new(
        points
            .iter()
            .map(|(name, x, y)| Keypoint::new(*name, *x, *y, 0.95))
            .collect(),
    )
}

/// Upright, arms hanging at the sides
pub fn standing() -> Pose {
    pose(&[
        ("nose", 50.0, 20.0),
        ("left_shoulder", 40.0, 40.0),
        ("right_shoulder", 60.0, 40.0),
        ("left_elbow", 40.0, 70.0),
        ("right_elbow", 60.0, 70.0),
        ("left_wrist", 40.0, 100.0),
        ("right_wrist", 60.0, 100.0),
        ("left_hip", 42.0, 100.0),
        ("right_hip", 58.0, 100.0),
        ("left_knee", 42.0, 140.0),
        ("right_knee", 58.0, 140.0),
        ("left_ankle", 42.0, 180.0),
        ("right_ankle", 58.0, 180.0),
    ])
}

/// Hips and knees bent, straight arms raised forward
pub fn squatting() -> Pose {
    pose(&[
        ("nose", 50.0, 40.0),
        ("left_shoulder", 40.0, 60.0),
        ("right_shoulder", 60.0, 60.0),
        ("left_elbow", 60.0, 80.0),
        ("right_elbow", 40.0, 80.0),
        ("left_wrist", 80.0, 100.0),
        ("right_wrist", 20.0, 100.0),
        ("left_hip", 42.0, 110.0),
        ("right_hip", 58.0, 110.0),
        ("left_knee", 72.0, 120.0),
        ("right_knee", 28.0, 120.0),
        ("left_ankle", 42.0, 160.0),
        ("right_ankle", 58.0, 160.0),
    ])
}

/// Standing legs with both elbows bent to a right angle
pub fn bent_arms() -> Pose {
    let mut pose = standing();
    for kp in pose.keypoints.iter_mut() {
        match kp.name.as_str() {
            "left_wrist" => {
                kp.x = 70.0;
                kp.y = 70.0;
            }
            "right_wrist" => {
                kp.x = 30.0;
                kp.y = 70.0;
            }
            _ => {}
        }
    }
    pose
}

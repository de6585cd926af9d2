/// Keypoint and skeleton models
///
/// A skeleton is the set of named keypoints a pose-estimation model produced
/// for one person in one frame. Names are unique within a skeleton and any
/// name may be absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PoseFormError;

/// Confidence below which a keypoint is treated as not detected
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;

/// A single named body landmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Body-part identifier (e.g., "left_shoulder")
    #[serde(default)]
    pub name: String,
    /// X coordinate (pixels or normalized 0-1, consistently per skeleton)
    pub x: f64,
    /// Y coordinate, growing downwards
    pub y: f64,
    /// Depth, only reported by 3D-capable models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detection confidence (0-1)
    #[serde(
        default,
        alias = "confidence",
        alias = "visibility",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<f64>,
}

impl Keypoint {
    /// Create a new 2D keypoint
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
            score: Some(score),
        }
    }

    /// Attach a depth coordinate
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Whether the keypoint was detected with at least `min_confidence`.
    ///
    /// A keypoint without a score counts as undetected.
    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.score.map_or(false, |score| score >= min_confidence)
    }

    /// Euclidean distance to another keypoint in the image plane
    pub fn distance_to(&self, other: &Keypoint) -> f64 {
        crate::services::angle_math::distance(self, other)
    }
}

/// COCO / MoveNet body parts. BlazePose reports the same names for these joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    /// Keypoint name as emitted by the pose models
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    /// All body parts in COCO index order
    pub fn all() -> [Self; 17] {
        [
            Self::Nose,
            Self::LeftEye,
            Self::RightEye,
            Self::LeftEar,
            Self::RightEar,
            Self::LeftShoulder,
            Self::RightShoulder,
            Self::LeftElbow,
            Self::RightElbow,
            Self::LeftWrist,
            Self::RightWrist,
            Self::LeftHip,
            Self::RightHip,
            Self::LeftKnee,
            Self::RightKnee,
            Self::LeftAnkle,
            Self::RightAnkle,
        ]
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPart {
    type Err = PoseFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|part| part.name() == s)
            .ok_or_else(|| PoseFormError::UnknownBodyPart(s.to_string()))
    }
}

/// Detected skeleton for one person in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    /// Overall detection confidence, when the model reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            score: None,
        }
    }

    /// Get keypoint by name
    pub fn keypoint(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }

    /// Get keypoint by body part, regardless of confidence
    pub fn get(&self, part: BodyPart) -> Option<&Keypoint> {
        self.keypoint(part.name())
    }

    /// Get keypoint by body part only if it was detected confidently
    pub fn available(&self, part: BodyPart, min_confidence: f64) -> Option<&Keypoint> {
        self.get(part).filter(|kp| kp.is_confident(min_confidence))
    }

    /// Check if all listed body parts are confidently detected
    pub fn has_all(&self, parts: &[BodyPart], min_confidence: f64) -> bool {
        parts
            .iter()
            .all(|part| self.available(*part, min_confidence).is_some())
    }

    /// Copy of this pose without the named keypoint
    pub fn without(&self, part: BodyPart) -> Pose {
        Pose {
            keypoints: self
                .keypoints
                .iter()
                .filter(|kp| kp.name != part.name())
                .cloned()
                .collect(),
            score: self.score,
        }
    }
}

/// The eight named joint angles used by squat detection and KEY_ANGLES scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointAngleKind {
    #[serde(rename = "leftElbowAngle", alias = "left_elbow")]
    LeftElbow,
    #[serde(rename = "leftShoulderAngle", alias = "left_shoulder")]
    LeftShoulder,
    #[serde(rename = "leftHipAngle", alias = "left_hip")]
    LeftHip,
    #[serde(rename = "leftKneeAngle", alias = "left_knee")]
    LeftKnee,
    #[serde(rename = "rightElbowAngle", alias = "right_elbow")]
    RightElbow,
    #[serde(rename = "rightShoulderAngle", alias = "right_shoulder")]
    RightShoulder,
    #[serde(rename = "rightHipAngle", alias = "right_hip")]
    RightHip,
    #[serde(rename = "rightKneeAngle", alias = "right_knee")]
    RightKnee,
}

impl JointAngleKind {
    pub fn all() -> [Self; 8] {
        [
            Self::LeftElbow,
            Self::LeftShoulder,
            Self::LeftHip,
            Self::LeftKnee,
            Self::RightElbow,
            Self::RightShoulder,
            Self::RightHip,
            Self::RightKnee,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftElbow => "leftElbowAngle",
            Self::LeftShoulder => "leftShoulderAngle",
            Self::LeftHip => "leftHipAngle",
            Self::LeftKnee => "leftKneeAngle",
            Self::RightElbow => "rightElbowAngle",
            Self::RightShoulder => "rightShoulderAngle",
            Self::RightHip => "rightHipAngle",
            Self::RightKnee => "rightKneeAngle",
        }
    }

    /// Keypoints defining the angle: (ray end, vertex, ray end)
    pub fn joints(&self) -> (BodyPart, BodyPart, BodyPart) {
        use BodyPart::*;
        match self {
            Self::LeftElbow => (LeftShoulder, LeftElbow, LeftWrist),
            Self::LeftShoulder => (LeftElbow, LeftShoulder, LeftHip),
            Self::LeftHip => (LeftShoulder, LeftHip, LeftKnee),
            Self::LeftKnee => (LeftHip, LeftKnee, LeftAnkle),
            Self::RightElbow => (RightShoulder, RightElbow, RightWrist),
            Self::RightShoulder => (RightElbow, RightShoulder, RightHip),
            Self::RightHip => (RightShoulder, RightHip, RightKnee),
            Self::RightKnee => (RightHip, RightKnee, RightAnkle),
        }
    }
}

impl fmt::Display for JointAngleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JointAngleKind {
    type Err = PoseFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::all()
            .into_iter()
            .find(|kind| {
                kind.name() == trimmed || kind.joints().1.name() == trimmed
            })
            .ok_or_else(|| PoseFormError::UnknownAngle(trimmed.to_string()))
    }
}

/// Training-mode pose checks
///
/// A check measures one quantity on the live skeleton (a joint angle or the
/// vertical gap between two keypoints) and compares it with a target.

use serde::{Deserialize, Serialize};

use crate::models::keypoint::BodyPart;

pub const DEFAULT_ANGLE_TOLERANCE: f64 = 5.0;
pub const DEFAULT_HEIGHT_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Greater,
    Less,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckKind {
    /// Angle at `joints[1]`, in degrees
    Angle {
        joints: [BodyPart; 3],
        comparison: Comparison,
        target_value: f64,
        #[serde(default)]
        tolerance: Option<f64>,
    },
    /// Absolute vertical distance between two keypoints
    Height {
        points: [BodyPart; 2],
        standard_value: f64,
        #[serde(default)]
        tolerance: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseCheck {
    pub id: String,
    #[serde(flatten)]
    pub kind: CheckKind,
}

/// Per-frame result of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    /// Measured value, `None` when the keypoints were unavailable
    pub value: Option<f64>,
    pub is_passing: bool,
    /// How long the check has been passing without interruption
    pub passing_ms: i64,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete body phase tracked by the squat state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquatPhase {
    #[default]
    Standing,
    Squatting,
}

impl fmt::Display for SquatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquatPhase::Standing => write!(f, "STANDING"),
            SquatPhase::Squatting => write!(f, "SQUATTING"),
        }
    }
}

/// Corrective or confirming feedback for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// Some required keypoint is missing or below the confidence threshold
    PoseIncomplete,
    /// A squat phase was just confirmed
    SquatCorrect,
    ArmsNotStraight,
    ArmPosition,
    HipsTooHigh,
    KneesMisaligned,
    TooLow,
    GoodForm,
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::SquatCorrect | Feedback::GoodForm)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Feedback::PoseIncomplete => "Make sure your whole body is in view",
            Feedback::SquatCorrect => "Squat posture is correct!",
            Feedback::ArmsNotStraight => "Keep your arms straighter",
            Feedback::ArmPosition => "Adjust your arm position",
            Feedback::HipsTooHigh => "Lower your hips more",
            Feedback::KneesMisaligned => "Keep your knees aligned",
            Feedback::TooLow => "Don't go too low, protect your knees",
            Feedback::GoodForm => "Good squat form!",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of feeding one frame to the squat state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    /// Phase to carry into the next frame
    pub phase: SquatPhase,
    /// Feedback to display, `None` leaves the previous feedback in place
    pub feedback: Option<Feedback>,
    /// Phase confirmed on this frame, if any
    pub completed: Option<SquatPhase>,
}

/// Record of one completed phase, kept by the caller for rep validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquatLog {
    pub phase: SquatPhase,
    pub timestamp: DateTime<Utc>,
    /// Opaque snapshot reference supplied by the caller (e.g. a frame id or data URL)
    #[serde(default)]
    pub image_data: String,
    #[serde(default)]
    pub is_valid: bool,
}

impl SquatLog {
    pub fn new(phase: SquatPhase, timestamp: DateTime<Utc>, image_data: impl Into<String>) -> Self {
        Self {
            phase,
            timestamp,
            image_data: image_data.into(),
            is_valid: false,
        }
    }
}

/// Squat phase classification
///
/// Each frame the eight limb angles are measured and checked against two
/// posture predicates. The phase cell is threaded through explicitly: the
/// caller passes the current phase in and stores the returned one.
///
/// From STANDING, confirming a standing posture emits a STANDING completion
/// and arms squat detection. From SQUATTING, confirming a squat emits a
/// SQUATTING completion and returns to STANDING. Frames where neither
/// posture holds produce corrective form feedback. A standing posture that
/// jitters across the thresholds can emit extra completions; there is no
/// dwell time or hysteresis.

use tracing::debug;

use crate::models::keypoint::{BodyPart, JointAngleKind, Pose, DEFAULT_MIN_CONFIDENCE};
use crate::models::squat::{Feedback, PhaseOutcome, SquatLog, SquatPhase};
use crate::services::angle_math;

/// Keypoints that must all be confidently detected before a frame is classified
pub const REQUIRED_KEYPOINTS: [BodyPart; 12] = [
    BodyPart::LeftShoulder,
    BodyPart::LeftElbow,
    BodyPart::LeftWrist,
    BodyPart::LeftHip,
    BodyPart::LeftKnee,
    BodyPart::LeftAnkle,
    BodyPart::RightShoulder,
    BodyPart::RightElbow,
    BodyPart::RightWrist,
    BodyPart::RightHip,
    BodyPart::RightKnee,
    BodyPart::RightAnkle,
];

// Standing: straight body, arms hanging
const STANDING_MIN_EXTENSION: f64 = 160.0;
const STANDING_MAX_SHOULDER: f64 = 20.0;

// Squatting: bent hips and knees, straight arms held forward
const SQUAT_MAX_FLEXION: f64 = 170.0;
const SQUAT_MIN_ELBOW: f64 = 130.0;
const SQUAT_MIN_SHOULDER: f64 = 30.0;
const SQUAT_MAX_SHOULDER: f64 = 90.0;

// Form checks
const FORM_MAX_SHOULDER: f64 = 120.0;
const FORM_MAX_HIP: f64 = 130.0;
const FORM_MAX_KNEE_ASYMMETRY: f64 = 15.0;
const FORM_MIN_KNEE: f64 = 60.0;

/// The eight limb angles of one frame, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbAngles {
    pub left_elbow: f64,
    pub left_shoulder: f64,
    pub left_hip: f64,
    pub left_knee: f64,
    pub right_elbow: f64,
    pub right_shoulder: f64,
    pub right_hip: f64,
    pub right_knee: f64,
}

impl LimbAngles {
    /// Measure all eight angles.
    ///
    /// Returns `None` when a required keypoint is missing, below
    /// `min_confidence`, or forms a zero-length limb.
    pub fn from_pose(pose: &Pose, min_confidence: f64) -> Option<Self> {
        if !pose.has_all(&REQUIRED_KEYPOINTS, min_confidence) {
            return None;
        }

        let measure = |kind: JointAngleKind| -> Option<f64> {
            let (a, b, c) = kind.joints();
            angle_math::angle(
                pose.available(a, min_confidence)?,
                pose.available(b, min_confidence)?,
                pose.available(c, min_confidence)?,
            )
        };

        Some(Self {
            left_elbow: measure(JointAngleKind::LeftElbow)?,
            left_shoulder: measure(JointAngleKind::LeftShoulder)?,
            left_hip: measure(JointAngleKind::LeftHip)?,
            left_knee: measure(JointAngleKind::LeftKnee)?,
            right_elbow: measure(JointAngleKind::RightElbow)?,
            right_shoulder: measure(JointAngleKind::RightShoulder)?,
            right_hip: measure(JointAngleKind::RightHip)?,
            right_knee: measure(JointAngleKind::RightKnee)?,
        })
    }

    pub fn get(&self, kind: JointAngleKind) -> f64 {
        match kind {
            JointAngleKind::LeftElbow => self.left_elbow,
            JointAngleKind::LeftShoulder => self.left_shoulder,
            JointAngleKind::LeftHip => self.left_hip,
            JointAngleKind::LeftKnee => self.left_knee,
            JointAngleKind::RightElbow => self.right_elbow,
            JointAngleKind::RightShoulder => self.right_shoulder,
            JointAngleKind::RightHip => self.right_hip,
            JointAngleKind::RightKnee => self.right_knee,
        }
    }
}

/// Upright body with straight arms hanging at the sides
pub fn is_standing(angles: &LimbAngles) -> bool {
    angles.left_hip > STANDING_MIN_EXTENSION
        && angles.right_hip > STANDING_MIN_EXTENSION
        && angles.left_knee > STANDING_MIN_EXTENSION
        && angles.right_knee > STANDING_MIN_EXTENSION
        && angles.left_elbow > STANDING_MIN_EXTENSION
        && angles.right_elbow > STANDING_MIN_EXTENSION
        && angles.left_shoulder < STANDING_MAX_SHOULDER
        && angles.right_shoulder < STANDING_MAX_SHOULDER
}

/// Bent hips and knees with straight arms raised forward
pub fn is_squatting(angles: &LimbAngles) -> bool {
    let shoulder_raised =
        |deg: f64| deg > SQUAT_MIN_SHOULDER && deg < SQUAT_MAX_SHOULDER;

    angles.left_hip < SQUAT_MAX_FLEXION
        && angles.right_hip < SQUAT_MAX_FLEXION
        && angles.left_knee < SQUAT_MAX_FLEXION
        && angles.right_knee < SQUAT_MAX_FLEXION
        && angles.left_elbow > SQUAT_MIN_ELBOW
        && angles.right_elbow > SQUAT_MIN_ELBOW
        && shoulder_raised(angles.left_shoulder)
        && shoulder_raised(angles.right_shoulder)
}

/// Corrective feedback for a posture that is neither standing nor squatting.
///
/// Checks run in order and the first failing one wins.
pub fn check_form(angles: &LimbAngles) -> Feedback {
    if angles.left_elbow <= SQUAT_MIN_ELBOW || angles.right_elbow <= SQUAT_MIN_ELBOW {
        return Feedback::ArmsNotStraight;
    }

    let shoulder_off = |deg: f64| deg <= SQUAT_MIN_SHOULDER || deg >= FORM_MAX_SHOULDER;
    if shoulder_off(angles.left_shoulder) || shoulder_off(angles.right_shoulder) {
        return Feedback::ArmPosition;
    }

    if angles.left_hip >= FORM_MAX_HIP || angles.right_hip >= FORM_MAX_HIP {
        return Feedback::HipsTooHigh;
    }

    if (angles.left_knee - angles.right_knee).abs() > FORM_MAX_KNEE_ASYMMETRY {
        return Feedback::KneesMisaligned;
    }

    if angles.left_knee < FORM_MIN_KNEE || angles.right_knee < FORM_MIN_KNEE {
        return Feedback::TooLow;
    }

    Feedback::GoodForm
}

/// Squat state machine with a configurable confidence threshold
#[derive(Debug, Clone)]
pub struct SquatDetector {
    min_confidence: f64,
}

impl SquatDetector {
    pub fn new() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Set minimum confidence threshold
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Advance the state machine by one frame
    pub fn detect(&self, pose: &Pose, phase: SquatPhase) -> PhaseOutcome {
        let Some(angles) = LimbAngles::from_pose(pose, self.min_confidence) else {
            debug!(%phase, "pose incomplete, skipping phase evaluation");
            return PhaseOutcome {
                phase,
                feedback: Some(Feedback::PoseIncomplete),
                completed: None,
            };
        };

        Self::step(&angles, phase)
    }

    /// Transition logic on already-measured angles
    pub fn step(angles: &LimbAngles, phase: SquatPhase) -> PhaseOutcome {
        let standing = is_standing(angles);
        let squatting = is_squatting(angles);

        let mut outcome = PhaseOutcome {
            phase,
            feedback: None,
            completed: None,
        };

        match phase {
            SquatPhase::Standing if standing => {
                outcome.completed = Some(SquatPhase::Standing);
                outcome.phase = SquatPhase::Squatting;
            }
            SquatPhase::Squatting if squatting => {
                outcome.completed = Some(SquatPhase::Squatting);
                outcome.phase = SquatPhase::Standing;
                outcome.feedback = Some(Feedback::SquatCorrect);
            }
            _ => {}
        }

        if let Some(completed) = outcome.completed {
            debug!(%completed, next = %outcome.phase, "squat phase completed");
        }

        if !standing && !squatting {
            outcome.feedback = Some(check_form(angles));
        }

        outcome
    }
}

impl Default for SquatDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the squat state machine by one frame with the default threshold
pub fn detect_squat(pose: &Pose, phase: SquatPhase) -> PhaseOutcome {
    SquatDetector::new().detect(pose, phase)
}

/// Count STANDING, SQUATTING, STANDING runs in a phase log.
///
/// Scans left to right; each matched triple marks its three entries valid
/// and the scan resumes at the closing STANDING so it can open the next rep.
pub fn count_valid_squats(logs: &mut [SquatLog]) -> usize {
    let mut count = 0;
    let mut i = 0;

    while i + 2 < logs.len() {
        if logs[i].phase == SquatPhase::Standing
            && logs[i + 1].phase == SquatPhase::Squatting
            && logs[i + 2].phase == SquatPhase::Standing
        {
            for log in &mut logs[i..=i + 2] {
                log.is_valid = true;
            }
            count += 1;
            i += 2;
        } else {
            i += 1;
        }
    }

    count
}

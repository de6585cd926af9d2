/// INVARIANT_FEATURES strategy: rotation and scale invariant skeleton features
///
/// Three parts, weighted 0.3 / 0.4 / 0.3:
/// - segment length ratios against shoulder width
/// - torso-relative limb angles (the RELATIVE_ANGLES computation)
/// - topology: joint relations, forearm crossing, and spatial pattern

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::models::keypoint::{BodyPart, Pose};
use crate::services::angle_math;
use crate::services::relative_angle_similarity::{
    compare_relative_angles, relative_angles, LimbSegment,
};

const LENGTH_RATIO_WEIGHT: f64 = 0.3;
const RELATIVE_ANGLE_WEIGHT: f64 = 0.4;
const TOPOLOGY_WEIGHT: f64 = 0.3;

const JOINT_RELATION_WEIGHT: f64 = 0.4;
const INTERSECTION_WEIGHT: f64 = 0.3;
const SPATIAL_PATTERN_WEIGHT: f64 = 0.3;

/// Vertical offset (in keypoint units) at which a left/right pair counts as fully asymmetric
const SYMMETRY_SCALE: f64 = 100.0;

/// Left/right pairs compared for symmetry
const SYMMETRIC_PAIRS: [(BodyPart, BodyPart); 6] = [
    (BodyPart::LeftShoulder, BodyPart::RightShoulder),
    (BodyPart::LeftElbow, BodyPart::RightElbow),
    (BodyPart::LeftWrist, BodyPart::RightWrist),
    (BodyPart::LeftHip, BodyPart::RightHip),
    (BodyPart::LeftKnee, BodyPart::RightKnee),
    (BodyPart::LeftAnkle, BodyPart::RightAnkle),
];

/// Body segments whose lengths are compared as ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BodySegment {
    Limb(LimbSegment),
    Torso,
}

impl BodySegment {
    pub fn all() -> Vec<Self> {
        LimbSegment::all()
            .into_iter()
            .map(Self::Limb)
            .chain(std::iter::once(Self::Torso))
            .collect()
    }

    pub fn endpoints(&self) -> (BodyPart, BodyPart) {
        match self {
            Self::Limb(limb) => limb.endpoints(),
            Self::Torso => (BodyPart::LeftShoulder, BodyPart::LeftHip),
        }
    }
}

/// Categorical joint relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointRelation {
    /// Hands: left wrist left of right wrist or not
    Hands,
    /// Left arm: elbow above shoulder or not
    LeftArm,
    /// Right arm: elbow above shoulder or not
    RightArm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationState {
    Normal,
    Crossed,
    Raised,
    Lowered,
}

/// Bounding-box shape of the confident keypoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub width: f64,
    pub height: f64,
    /// width / height, 0 when the box has no height
    pub aspect: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialPattern {
    pub symmetry: f64,
    pub distribution: Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub joint_relations: BTreeMap<JointRelation, RelationState>,
    /// Whether the forearms cross, absent if any forearm keypoint is missing
    pub forearms_cross: Option<bool>,
    pub spatial_pattern: SpatialPattern,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvariantFeatures {
    pub length_ratios: BTreeMap<BodySegment, f64>,
    pub relative_angles: BTreeMap<LimbSegment, f64>,
    pub topology: Topology,
}

impl InvariantFeatures {
    pub fn extract(pose: &Pose, min_confidence: f64) -> Self {
        Self {
            length_ratios: length_ratios(pose, min_confidence),
            relative_angles: relative_angles(pose, min_confidence),
            topology: Topology {
                joint_relations: joint_relations(pose, min_confidence),
                forearms_cross: forearms_cross(pose, min_confidence),
                spatial_pattern: SpatialPattern {
                    symmetry: symmetry(pose, min_confidence),
                    distribution: distribution(pose, min_confidence),
                },
            },
        }
    }
}

/// Segment lengths divided by shoulder width.
///
/// Empty when the shoulders are unavailable or coincide.
pub fn length_ratios(pose: &Pose, min_confidence: f64) -> BTreeMap<BodySegment, f64> {
    let mut ratios = BTreeMap::new();

    let shoulder_width = match (
        pose.available(BodyPart::LeftShoulder, min_confidence),
        pose.available(BodyPart::RightShoulder, min_confidence),
    ) {
        (Some(left), Some(right)) => angle_math::distance(left, right),
        _ => return ratios,
    };
    if shoulder_width <= f64::EPSILON {
        return ratios;
    }

    for segment in BodySegment::all() {
        let (start, end) = segment.endpoints();
        if let (Some(start), Some(end)) = (
            pose.available(start, min_confidence),
            pose.available(end, min_confidence),
        ) {
            ratios.insert(segment, angle_math::distance(start, end) / shoulder_width);
        }
    }

    ratios
}

pub fn joint_relations(pose: &Pose, min_confidence: f64) -> BTreeMap<JointRelation, RelationState> {
    let mut relations = BTreeMap::new();
    let get = |part| pose.available(part, min_confidence);

    if let (Some(left), Some(right)) = (get(BodyPart::LeftWrist), get(BodyPart::RightWrist)) {
        let state = if left.x < right.x {
            RelationState::Normal
        } else {
            RelationState::Crossed
        };
        relations.insert(JointRelation::Hands, state);
    }

    let arm_state = |shoulder, elbow| match (get(shoulder), get(elbow)) {
        (Some(shoulder), Some(elbow)) if elbow.y < shoulder.y => Some(RelationState::Raised),
        (Some(_), Some(_)) => Some(RelationState::Lowered),
        _ => None,
    };

    if let Some(state) = arm_state(BodyPart::LeftShoulder, BodyPart::LeftElbow) {
        relations.insert(JointRelation::LeftArm, state);
    }
    if let Some(state) = arm_state(BodyPart::RightShoulder, BodyPart::RightElbow) {
        relations.insert(JointRelation::RightArm, state);
    }

    relations
}

/// Whether the elbow-wrist segments of both arms intersect
pub fn forearms_cross(pose: &Pose, min_confidence: f64) -> Option<bool> {
    let get = |part| pose.available(part, min_confidence);
    Some(angle_math::segments_intersect(
        get(BodyPart::LeftElbow)?,
        get(BodyPart::LeftWrist)?,
        get(BodyPart::RightElbow)?,
        get(BodyPart::RightWrist)?,
    ))
}

/// Mean of 1 - min(|Δy| / 100, 1) over the available left/right pairs, 0 if none
pub fn symmetry(pose: &Pose, min_confidence: f64) -> f64 {
    let scores: Vec<f64> = SYMMETRIC_PAIRS
        .iter()
        .filter_map(|(left, right)| {
            let left = pose.available(*left, min_confidence)?;
            let right = pose.available(*right, min_confidence)?;
            let dy = (left.y - right.y).abs();
            Some(1.0 - (dy / SYMMETRY_SCALE).min(1.0))
        })
        .collect();

    if scores.is_empty() {
        0.0
    } else {
        scores.iter().mean()
    }
}

/// Bounding box of every confident keypoint
pub fn distribution(pose: &Pose, min_confidence: f64) -> Distribution {
    let points: Vec<_> = pose
        .keypoints
        .iter()
        .filter(|kp| kp.is_confident(min_confidence))
        .collect();

    if points.is_empty() {
        return Distribution::default();
    }

    let (min_x, max_x, min_y, max_y) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), kp| {
            (min_x.min(kp.x), max_x.max(kp.x), min_y.min(kp.y), max_y.max(kp.y))
        },
    );

    let width = max_x - min_x;
    let height = max_y - min_y;
    Distribution {
        width,
        height,
        aspect: if height > 0.0 { width / height } else { 0.0 },
    }
}

fn compare_length_ratios(
    ratios: &BTreeMap<BodySegment, f64>,
    reference: &BTreeMap<BodySegment, f64>,
) -> f64 {
    let differences: Vec<f64> = ratios
        .iter()
        .filter_map(|(segment, ratio)| Some((ratio - reference.get(segment)?).abs()))
        .collect();

    if differences.is_empty() {
        return 0.0;
    }

    1.0 - differences.iter().mean().min(1.0)
}

/// Fraction of keys present in both maps whose values agree, 0 if none are shared
fn agreement<K: Ord, V: PartialEq>(left: &BTreeMap<K, V>, right: &BTreeMap<K, V>) -> f64 {
    let mut shared = 0usize;
    let mut matches = 0usize;

    for (key, value) in left {
        if let Some(other) = right.get(key) {
            shared += 1;
            if value == other {
                matches += 1;
            }
        }
    }

    if shared == 0 {
        0.0
    } else {
        matches as f64 / shared as f64
    }
}

fn compare_spatial_patterns(pattern: &SpatialPattern, reference: &SpatialPattern) -> f64 {
    let symmetry = 1.0 - (pattern.symmetry - reference.symmetry).abs();
    let aspect_diff = (pattern.distribution.aspect - reference.distribution.aspect).abs();
    let distribution = 1.0 - aspect_diff.min(1.0);
    (symmetry + distribution) / 2.0
}

pub fn compare_topology(topology: &Topology, reference: &Topology) -> f64 {
    let relations = agreement(&topology.joint_relations, &reference.joint_relations);

    let intersections = match (topology.forearms_cross, reference.forearms_cross) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    };

    let spatial = compare_spatial_patterns(&topology.spatial_pattern, &reference.spatial_pattern);

    JOINT_RELATION_WEIGHT * relations
        + INTERSECTION_WEIGHT * intersections
        + SPATIAL_PATTERN_WEIGHT * spatial
}

/// Score two extracted feature sets
pub fn compare_features(features: &InvariantFeatures, reference: &InvariantFeatures) -> f64 {
    LENGTH_RATIO_WEIGHT * compare_length_ratios(&features.length_ratios, &reference.length_ratios)
        + RELATIVE_ANGLE_WEIGHT
            * compare_relative_angles(&features.relative_angles, &reference.relative_angles)
        + TOPOLOGY_WEIGHT * compare_topology(&features.topology, &reference.topology)
}

/// Score two skeletons by rotation and scale invariant features
pub fn invariant_features_similarity(pose: &Pose, reference: &Pose, min_confidence: f64) -> f64 {
    compare_features(
        &InvariantFeatures::extract(pose, min_confidence),
        &InvariantFeatures::extract(reference, min_confidence),
    )
}

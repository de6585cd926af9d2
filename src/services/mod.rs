// Pose scoring services

pub mod angle_math;
pub mod invariant_features;
pub mod key_angle_similarity;
pub mod orientation;
pub mod phase_classifier;
pub mod pose_check;
pub mod pose_normalizer;
pub mod relative_angle_similarity;
pub mod score_smoother;
pub mod session;
pub mod similarity_engine;

pub use orientation::estimate_orientation;
pub use phase_classifier::{count_valid_squats, detect_squat, LimbAngles, SquatDetector};
pub use pose_check::{evaluate_check, PoseCheckTracker};
pub use pose_normalizer::normalize_pose;
pub use score_smoother::ScoreSmoother;
pub use session::{ComparisonSession, ComparisonUpdate, SquatSession};
pub use similarity_engine::{
    calculate_combined_similarity, calculate_invariant_features_similarity,
    calculate_pose_similarity, calculate_relative_angle_similarity, SimilarityEngine,
};

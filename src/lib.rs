// Squat phase detection and pose similarity scoring over detected skeletons.
// Pose estimation itself happens elsewhere; this crate consumes its keypoints.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::ScoringConfig;
pub use error::{PoseFormError, Result};

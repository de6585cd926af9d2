use thiserror::Error;

/// Caller-usage errors raised by the scoring library.
///
/// Missing keypoints and degenerate geometry are not errors: they surface as
/// `None` measurements or as feedback values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseFormError {
    #[error("Unknown similarity strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown joint angle: {0}")]
    UnknownAngle(String),

    #[error("Unknown body part: {0}")]
    UnknownBodyPart(String),

    #[error("Invalid strategy weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PoseFormError>;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way the subject faces the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Front,
    Side,
    Back,
    Unknown,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Front => "front",
            Direction::Side => "side",
            Direction::Back => "back",
            Direction::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Estimated body orientation for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Approximate yaw in degrees (0 = facing the camera, ±90 = profile)
    pub angle: f64,
    pub direction: Direction,
    /// True when the subject faces the camera with a confident nose and shoulders
    pub is_valid: bool,
}

impl Orientation {
    pub fn unknown() -> Self {
        Self {
            angle: 0.0,
            direction: Direction::Unknown,
            is_valid: false,
        }
    }
}

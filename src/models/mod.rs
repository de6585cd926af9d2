pub mod keypoint;
pub mod orientation;
pub mod pose_check;
pub mod similarity;
pub mod squat;

pub use keypoint::*;
pub use orientation::*;
pub use pose_check::*;
pub use similarity::*;
pub use squat::*;

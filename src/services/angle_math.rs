/// Planar geometry on keypoints
///
/// Angles are measured in the image plane; depth is ignored.

use std::f64::consts::PI;

use crate::models::keypoint::Keypoint;

/// Lengths below this are treated as zero
const DEGENERATE_EPSILON: f64 = 1e-9;

/// Euclidean distance between two points in the image plane
pub fn distance(a: &Keypoint, b: &Keypoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle at vertex `b` formed by the rays to `a` and `c`, in degrees (0-180).
///
/// Uses the law of cosines on the three pairwise distances. Returns `None`
/// when either ray has zero length, since the angle is undefined there.
pub fn angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> Option<f64> {
    let ab = distance(a, b);
    let bc = distance(b, c);
    if ab < DEGENERATE_EPSILON || bc < DEGENERATE_EPSILON {
        return None;
    }
    let ac = distance(a, c);

    // Rounding can push collinear inputs a hair outside [-1, 1]
    let cos_angle = ((ab * ab + bc * bc - ac * ac) / (2.0 * ab * bc)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Heading of the vector `from -> to`, in radians within (-π, π]
pub fn heading(from: &Keypoint, to: &Keypoint) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Wrap an angle in radians into (-π, π]
pub fn normalize_angle(radians: f64) -> f64 {
    let wrapped = (radians + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Midpoint of two keypoints, carrying the lower of their scores
pub fn midpoint(a: &Keypoint, b: &Keypoint) -> Keypoint {
    let score = match (a.score, b.score) {
        (Some(sa), Some(sb)) => Some(sa.min(sb)),
        _ => None,
    };
    Keypoint {
        name: String::new(),
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
        z: None,
        score,
    }
}

/// Whether segments `p1-p2` and `p3-p4` cross, by the CCW orientation test
pub fn segments_intersect(p1: &Keypoint, p2: &Keypoint, p3: &Keypoint, p4: &Keypoint) -> bool {
    fn ccw(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> bool {
        (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
    }

    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}

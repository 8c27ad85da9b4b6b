use serde::{Deserialize, Serialize};

/// A position in normalized image-plane coordinates. Values are typically
/// within [0, 1] but are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Unsigned angle in degrees at vertex `b` between the rays `b -> a` and
/// `b -> c`. Always within [0, 180]; angles past 180 are folded back
/// (`360 - x`).
///
/// Known edge case: if any two of the points coincide, one ray has zero
/// length. `atan2` stays defined (it returns 0 for the zero vector), so a
/// value comes back, but it is geometrically meaningless. Callers are
/// expected to feed distinct landmark positions.
pub fn angle_at(a: Point, b: Point, c: Point) -> f32 {
    let theta = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let degrees = theta.to_degrees().abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A single estimated body-part position with its visibility confidence
/// (0.0 = not visible, 1.0 = fully visible).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The named landmark set the classifier consumes. Estimators either
/// produce the whole set or report no detection for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyLandmarks {
    pub left_ear: Landmark,
    pub right_ear: Landmark,
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
    pub left_hip: Landmark,
    pub right_hip: Landmark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodySide {
    Left,
    Right,
}

impl BodySide {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodySide::Left => "Left",
            BodySide::Right => "Right",
        }
    }
}

/// The ear/shoulder/hip triple of the side chosen for analysis.
#[derive(Debug, Clone, Copy)]
pub struct SideView {
    pub side: BodySide,
    pub ear: Point,
    pub shoulder: Point,
    pub hip: Point,
}

impl BodyLandmarks {
    /// Picks the lateral side to analyze from shoulder visibility.
    ///
    /// Left wins only on strictly greater visibility; an exact tie goes to
    /// the right side. Downstream consumers depend on this exact rule, so
    /// it must not be made symmetric.
    pub fn analysis_side(&self) -> SideView {
        if self.left_shoulder.visibility > self.right_shoulder.visibility {
            SideView {
                side: BodySide::Left,
                ear: self.left_ear.point(),
                shoulder: self.left_shoulder.point(),
                hip: self.left_hip.point(),
            }
        } else {
            SideView {
                side: BodySide::Right,
                ear: self.right_ear.point(),
                shoulder: self.right_shoulder.point(),
                hip: self.right_hip.point(),
            }
        }
    }
}

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::alert::AlertEvent;
use crate::geometry::{angle_at, Point};
use crate::pose::{BodyLandmarks, BodySide};

/// Neck angle (ear-shoulder-hip) must stay above this for the head to
/// count as upright.
pub const NECK_ANGLE_MIN_DEG: f32 = 145.0;
/// Torso angle against the vertical reference must stay below this for
/// the back to count as straight.
pub const TORSO_ANGLE_MAX_DEG: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostureVerdict {
    Good,
    /// Bad posture, carrying which sub-checks passed.
    #[serde(rename_all = "camelCase")]
    Bad { neck_ok: bool, torso_ok: bool },
    NoPerson,
}

impl PostureVerdict {
    pub fn is_good(&self) -> bool {
        matches!(self, PostureVerdict::Good)
    }
}

impl fmt::Display for PostureVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostureVerdict::Good => write!(f, "Good posture"),
            PostureVerdict::Bad { neck_ok, torso_ok } => {
                write!(f, "Fix:")?;
                if !neck_ok {
                    write!(f, " head")?;
                }
                if !torso_ok {
                    write!(f, " back")?;
                }
                Ok(())
            }
            PostureVerdict::NoPerson => write!(f, "Waiting for person"),
        }
    }
}

/// Per-frame view of what the classifier measured, for status surfaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureReading {
    pub side: BodySide,
    pub neck_angle: f32,
    pub torso_angle: f32,
    pub verdict: PostureVerdict,
}

/// Result of classifying one frame.
#[derive(Debug, Clone, Copy)]
pub struct Assessment {
    pub verdict: PostureVerdict,
    /// `None` when no person was detected this frame.
    pub reading: Option<PostureReading>,
    pub alert: Option<AlertEvent>,
}

/// Turns per-frame landmark sets into verdicts and applies the
/// sustained-bad-posture hysteresis.
///
/// A `BadPostureSustained` alert fires once the current bad streak exceeds
/// the threshold, and the streak baseline then resets to "now", so the
/// alert repeats every threshold interval for as long as the posture stays
/// bad.
pub struct PostureClassifier {
    alert_threshold: Duration,
    bad_since: Option<Instant>,
}

impl PostureClassifier {
    pub fn new(alert_threshold: Duration) -> Self {
        Self {
            alert_threshold,
            bad_since: None,
        }
    }

    pub fn assess(&mut self, pose: Option<&BodyLandmarks>, now: Instant) -> Assessment {
        let Some(pose) = pose else {
            // A detection dropout neither starts nor clears a bad streak:
            // the streak is paused and resumes on its original baseline
            // once landmarks reappear. This avoids spurious alert resets
            // on brief estimator misses.
            return Assessment {
                verdict: PostureVerdict::NoPerson,
                reading: None,
                alert: None,
            };
        };

        let view = pose.analysis_side();
        let neck_angle = angle_at(view.ear, view.shoulder, view.hip);
        // Synthetic point straight above the hip in image coordinates;
        // keeps the vertical reference independent of camera distance.
        let overhead = Point::new(view.hip.x, view.hip.y - 0.5);
        let torso_angle = angle_at(overhead, view.hip, view.shoulder);

        let neck_ok = neck_angle > NECK_ANGLE_MIN_DEG;
        let torso_ok = torso_angle < TORSO_ANGLE_MAX_DEG;

        let (verdict, alert) = if neck_ok && torso_ok {
            self.bad_since = None;
            (PostureVerdict::Good, None)
        } else {
            let verdict = PostureVerdict::Bad { neck_ok, torso_ok };
            let alert = match self.bad_since {
                None => {
                    self.bad_since = Some(now);
                    None
                }
                Some(since) if now.duration_since(since) > self.alert_threshold => {
                    self.bad_since = Some(now);
                    Some(AlertEvent::BadPostureSustained)
                }
                Some(_) => None,
            };
            (verdict, alert)
        };

        Assessment {
            verdict,
            reading: Some(PostureReading {
                side: view.side,
                neck_angle,
                torso_angle,
                verdict,
            }),
            alert,
        }
    }
}

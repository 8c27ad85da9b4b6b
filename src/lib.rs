//! Camera-based posture monitoring core.
//!
//! Classifies body posture from estimated skeletal landmarks, enforces a
//! work/break cadence with alerts, and aggregates posture quality over a
//! trailing window. Capture, landmark estimation, and alert rendering are
//! injected collaborators; see [`sensing::FrameSource`],
//! [`sensing::PoseEstimator`], and [`alert::AlertSink`].

pub mod alert;
pub mod geometry;
pub mod history;
pub mod pose;
pub mod posture;
pub mod sensing;
pub mod session;
pub mod settings;

pub use alert::{AlertDispatcher, AlertEvent, AlertSink, ChimeAlertSink};
pub use geometry::{angle_at, Point};
pub use history::{PostureHistory, PostureReport, PostureSample, ReportSummary, REPORT_WINDOW_SECS};
pub use pose::{BodyLandmarks, BodySide, Landmark};
pub use posture::{PostureClassifier, PostureReading, PostureVerdict};
pub use sensing::{CameraFrame, FrameSource, PoseEstimator};
pub use session::{MonitorController, MonitorSnapshot, MonitorStatus, SessionPhase, SessionState};
pub use settings::{CadenceSettings, SettingsStore};

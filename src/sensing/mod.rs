pub mod controller;
mod loop_worker;

pub use controller::SensingController;

use anyhow::Result;

use crate::pose::BodyLandmarks;

/// One raw color frame. The core never interprets the pixels; they exist
/// only to be forwarded to the estimator.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Capture collaborator. `open` acquires the device; dropping the source
/// releases it. `next_frame` may report that no frame is available right
/// now (`Ok(None)`), which just skips the current processing pass.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<()>;
    fn next_frame(&mut self) -> Result<Option<CameraFrame>>;
}

/// Landmark estimation collaborator, treated as a black box. `Ok(None)`
/// means no person was detected in the frame.
pub trait PoseEstimator: Send {
    fn detect(&mut self, frame: &CameraFrame) -> Result<Option<BodyLandmarks>>;
}

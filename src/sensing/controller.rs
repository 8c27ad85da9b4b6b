use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::alert::AlertDispatcher;
use crate::session::state::MonitorState;

use super::loop_worker::frame_loop;
use super::{FrameSource, PoseEstimator};

/// Owns the frame-loop worker and its cancellation token.
pub struct SensingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SensingController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub(crate) fn start_watching(
        &mut self,
        session_id: String,
        source: Box<dyn FrameSource>,
        estimator: Box<dyn PoseEstimator>,
        state: Arc<Mutex<MonitorState>>,
        alerts: AlertDispatcher,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("frame loop already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::task::spawn_blocking(move || {
            frame_loop(session_id, source, estimator, state, alerts, token_clone)
        });

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop_watching(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("frame loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}

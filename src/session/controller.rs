use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::info;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::alert::{AlertDispatcher, AlertSink};
use crate::history::PostureReport;
use crate::posture::PostureReading;
use crate::sensing::{FrameSource, PoseEstimator, SensingController};
use crate::settings::CadenceSettings;

use super::state::{MonitorState, MonitorStatus, SessionState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    pub status: MonitorStatus,
    pub session: SessionState,
    pub last_reading: Option<PostureReading>,
}

struct SessionTicker {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Top-level owner of a monitoring session.
///
/// All shared session state (classifier, history, countdown, latest
/// reading) lives behind one mutex; the frame loop and the session ticker
/// both go through it, which is what keeps the two periodic schedules
/// serialized.
#[derive(Clone)]
pub struct MonitorController {
    state: Arc<Mutex<MonitorState>>,
    sensing: Arc<Mutex<SensingController>>,
    ticker: Arc<Mutex<Option<SessionTicker>>>,
    alerts: AlertDispatcher,
}

impl MonitorController {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MonitorState::new())),
            sensing: Arc::new(Mutex::new(SensingController::new())),
            ticker: Arc::new(Mutex::new(None)),
            alerts: AlertDispatcher::new(sink),
        }
    }

    /// Starts a session: validates and snapshots the cadence settings,
    /// opens the capture device, and spawns the frame loop and the
    /// one-second session ticker.
    pub async fn start(
        &self,
        settings: CadenceSettings,
        mut source: Box<dyn FrameSource>,
        estimator: Box<dyn PoseEstimator>,
    ) -> Result<MonitorSnapshot> {
        settings.validate()?;

        {
            let state = self.state.lock().await;
            if state.status == MonitorStatus::Watching {
                bail!("monitor already active");
            }
        }

        // A capture failure leaves the monitor exactly as it was;
        // retrying is just calling start again.
        source.open().context("failed to open capture device")?;

        let session_id = Uuid::new_v4().to_string();
        {
            let mut state = self.state.lock().await;
            state.begin_session(session_id.clone(), &settings);
        }

        self.sensing.lock().await.start_watching(
            session_id.clone(),
            source,
            estimator,
            self.state.clone(),
            self.alerts.clone(),
        )?;

        self.spawn_ticker().await;

        info!(
            "session {session_id} started (work {}min, break {}min, alert threshold {}s)",
            settings.work_minutes, settings.break_minutes, settings.alert_threshold_secs
        );

        Ok(self.snapshot().await)
    }

    /// Stops the session: halts both periodic schedules and releases the
    /// capture device. History stays readable until the next start.
    pub async fn stop(&self) -> Result<()> {
        let session_id = {
            let mut state = self.state.lock().await;
            if state.status != MonitorStatus::Watching {
                bail!("no active session to stop");
            }
            state.status = MonitorStatus::Stopped;
            state.session_id.clone()
        };

        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel_token.cancel();
            let _ = ticker.handle.await;
        }
        self.sensing.lock().await.stop_watching().await?;

        info!(
            "session {} stopped",
            session_id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }

    /// User-initiated break: counts immediately, fires its alert, leaves
    /// the countdown alone.
    pub async fn take_break(&self) -> Result<u32> {
        let (event, count) = {
            let mut state = self.state.lock().await;
            if state.status != MonitorStatus::Watching {
                bail!("no active session");
            }
            let event = state.session.record_manual_break();
            (event, state.session.breaks_taken)
        };
        self.alerts.dispatch(event);
        Ok(count)
    }

    /// Aggregates the trailing report window on demand.
    pub async fn report(&self) -> PostureReport {
        let state = self.state.lock().await;
        state
            .history
            .summarize(Utc::now(), state.session.breaks_taken)
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let state = self.state.lock().await;
        MonitorSnapshot {
            status: state.status,
            session: state.session.clone(),
            last_reading: state.last_reading,
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel_token.cancel();
            previous.handle.abort();
        }

        let state = self.state.clone();
        let alerts = self.alerts.clone();
        let cancel_token = CancellationToken::new();
        let loop_token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let tick = Duration::from_secs(1);
            // First tick one full period out; a tick at t=0 would eat a
            // second the user never saw.
            let mut interval = time::interval_at(time::Instant::now() + tick, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let event = {
                            let mut guard = state.lock().await;
                            if guard.status != MonitorStatus::Watching {
                                break;
                            }
                            guard.session.tick()
                        };
                        if let Some(event) = event {
                            alerts.dispatch(event);
                        }
                    }
                    _ = loop_token.cancelled() => {
                        info!("session ticker shutting down");
                        break;
                    }
                }
            }
        });

        *ticker_guard = Some(SessionTicker {
            cancel_token,
            handle,
        });
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::alert::AlertDispatcher;
use crate::session::state::MonitorState;

use super::{FrameSource, PoseEstimator};

/// Target frame-processing cadence; roughly a webcam frame period.
const FRAME_INTERVAL_MS: u64 = 33;

/// Frame-processing loop. Runs on a blocking worker because both
/// collaborators are synchronous (device reads, model inference).
///
/// Each pass: grab a frame, estimate landmarks, then classify, update the
/// latest reading, and record history under the shared state lock. A
/// failed pass is logged and skipped; the loop keeps going. Overruns are
/// not compensated: when a pass takes longer than the interval, the next
/// one simply starts late.
pub(crate) fn frame_loop(
    session_id: String,
    mut source: Box<dyn FrameSource>,
    mut estimator: Box<dyn PoseEstimator>,
    state: Arc<Mutex<MonitorState>>,
    alerts: AlertDispatcher,
    cancel_token: CancellationToken,
) {
    let interval = Duration::from_millis(FRAME_INTERVAL_MS);
    info!("frame loop started for session {session_id}");

    while !cancel_token.is_cancelled() {
        let pass_started = Instant::now();

        if let Err(err) = process_frame(source.as_mut(), estimator.as_mut(), &state, &alerts) {
            warn!("frame processing failed for session {session_id}: {err:#}");
        }

        let elapsed = pass_started.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }

    info!("frame loop shutting down for session {session_id}");
    // Dropping the source here releases the capture device.
}

fn process_frame(
    source: &mut dyn FrameSource,
    estimator: &mut dyn PoseEstimator,
    state: &Arc<Mutex<MonitorState>>,
    alerts: &AlertDispatcher,
) -> Result<()> {
    let Some(frame) = source.next_frame()? else {
        return Ok(());
    };
    let pose = estimator.detect(&frame)?;

    let assessment = {
        let mut guard = state.blocking_lock();
        let assessment = guard.classifier.assess(pose.as_ref(), Instant::now());
        guard.last_reading = assessment.reading;
        guard.history.record(Utc::now(), assessment.verdict.is_good());
        assessment
    };

    if let Some(event) = assessment.alert {
        alerts.dispatch(event);
    }

    Ok(())
}

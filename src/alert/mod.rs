pub mod chime;

pub use chime::{AlertChime, ChimeAlertSink};

use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Events the monitor raises toward the alert delivery collaborator. Each
/// is causally distinct and fires independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertEvent {
    BadPostureSustained,
    BreakStarted,
    BreakEnded,
    ManualBreakTaken,
}

impl AlertEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertEvent::BadPostureSustained => "BadPostureSustained",
            AlertEvent::BreakStarted => "BreakStarted",
            AlertEvent::BreakEnded => "BreakEnded",
            AlertEvent::ManualBreakTaken => "ManualBreakTaken",
        }
    }
}

/// Delivery collaborator: turns an event into a platform notification
/// (sound, dialog, ...). Implementations may block; they run on the
/// dispatch thread, never on the caller.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, event: AlertEvent) -> Result<()>;
}

const DISPATCH_QUEUE_CAPACITY: usize = 16;

/// Best-effort, fire-and-forget alert dispatch.
///
/// Events are pushed into a bounded queue drained by a dedicated thread
/// that invokes the sink. `dispatch` never blocks and never surfaces
/// failures to the caller: a full queue drops the event, a sink error is
/// logged and swallowed. Classifier and timer correctness must not depend
/// on delivery.
#[derive(Clone)]
pub struct AlertDispatcher {
    sink: Arc<dyn AlertSink>,
    tx: Arc<Mutex<Option<SyncSender<AlertEvent>>>>,
}

impl AlertDispatcher {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self {
            sink,
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<SyncSender<AlertEvent>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|_| anyhow!("alert dispatcher state poisoned"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::sync_channel::<AlertEvent>(DISPATCH_QUEUE_CAPACITY);
        let sink = Arc::clone(&self.sink);

        thread::Builder::new()
            .name("alert-dispatch".to_string())
            .spawn(move || {
                while let Ok(event) = rx.recv() {
                    if let Err(err) = sink.deliver(event) {
                        warn!("alert delivery failed for {}: {err:#}", event.as_str());
                    }
                }
            })
            .map_err(|err| anyhow!("failed to spawn alert dispatch thread: {err}"))?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    pub fn dispatch(&self, event: AlertEvent) {
        let tx = match self.ensure_thread() {
            Ok(tx) => tx,
            Err(err) => {
                warn!("alert {} dropped: {err:#}", event.as_str());
                return;
            }
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("alert queue full, dropping {}", event.as_str());
            }
            Err(TrySendError::Disconnected(event)) => {
                warn!("alert dispatch thread gone, dropping {}", event.as_str());
            }
        }
    }
}

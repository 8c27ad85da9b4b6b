use serde::{Deserialize, Serialize};

use crate::alert::AlertEvent;
use crate::history::PostureHistory;
use crate::posture::{PostureClassifier, PostureReading};
use crate::settings::CadenceSettings;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MonitorStatus {
    Idle,
    Watching,
    Stopped,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        MonitorStatus::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Working,
    OnBreak,
}

/// Work/break countdown, driven by one tick per second from the session
/// ticker. Durations are snapshotted at construction and stay fixed for
/// the life of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: SessionPhase,
    pub remaining_secs: u64,
    pub breaks_taken: u32,
    pub work_duration_secs: u64,
    pub break_duration_secs: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&CadenceSettings::default())
    }
}

impl SessionState {
    pub fn new(settings: &CadenceSettings) -> Self {
        Self::with_durations(settings.work_duration_secs(), settings.break_duration_secs())
    }

    pub fn with_durations(work_duration_secs: u64, break_duration_secs: u64) -> Self {
        Self {
            phase: SessionPhase::Working,
            remaining_secs: work_duration_secs,
            breaks_taken: 0,
            work_duration_secs,
            break_duration_secs,
        }
    }

    /// Advances the countdown by one second and performs the phase
    /// transition when it hits zero.
    ///
    /// A finished work phase starts the break without touching
    /// `breaks_taken`; the break only counts once it completes.
    pub fn tick(&mut self) -> Option<AlertEvent> {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        match self.phase {
            SessionPhase::Working => {
                self.phase = SessionPhase::OnBreak;
                self.remaining_secs = self.break_duration_secs;
                Some(AlertEvent::BreakStarted)
            }
            SessionPhase::OnBreak => {
                self.phase = SessionPhase::Working;
                self.remaining_secs = self.work_duration_secs;
                self.breaks_taken += 1;
                Some(AlertEvent::BreakEnded)
            }
        }
    }

    /// A user-initiated break: counted immediately, countdown and phase
    /// untouched.
    pub fn record_manual_break(&mut self) -> AlertEvent {
        self.breaks_taken += 1;
        AlertEvent::ManualBreakTaken
    }

    /// Countdown rendered as `MM:SS` for status surfaces.
    pub fn format_remaining(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }
}

/// Everything the frame loop and the session ticker share. Both periodic
/// activities mutate this through one mutex; nothing else may hold pieces
/// of session state.
pub(crate) struct MonitorState {
    pub(crate) status: MonitorStatus,
    pub(crate) session_id: Option<String>,
    pub(crate) session: SessionState,
    pub(crate) classifier: PostureClassifier,
    pub(crate) history: PostureHistory,
    pub(crate) last_reading: Option<PostureReading>,
}

impl MonitorState {
    pub(crate) fn new() -> Self {
        let settings = CadenceSettings::default();
        Self {
            status: MonitorStatus::Idle,
            session_id: None,
            session: SessionState::new(&settings),
            classifier: PostureClassifier::new(settings.alert_threshold()),
            history: PostureHistory::new(),
            last_reading: None,
        }
    }

    /// Resets all per-session state under a fresh id. The previous
    /// session's history is discarded here, not at stop, so reports keep
    /// working on a stopped monitor.
    pub(crate) fn begin_session(&mut self, session_id: String, settings: &CadenceSettings) {
        self.status = MonitorStatus::Watching;
        self.session_id = Some(session_id);
        self.session = SessionState::new(settings);
        self.classifier = PostureClassifier::new(settings.alert_threshold());
        self.history = PostureHistory::new();
        self.last_reading = None;
    }
}

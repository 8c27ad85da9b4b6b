use std::fmt;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// Trailing span the report aggregates over.
pub const REPORT_WINDOW_SECS: i64 = 1800;

/// One recorded posture observation. Samples are appended in timestamp
/// order and spaced at least a second apart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureSample {
    pub timestamp: DateTime<Utc>,
    pub is_good: bool,
}

/// Append-only posture history for one session.
///
/// The buffer is never pruned: at one sample per second it stays small for
/// any realistic session length, and pruning would blur the distinction
/// between "no history" and "no recent history" in reports.
#[derive(Debug, Default)]
pub struct PostureHistory {
    samples: Vec<PostureSample>,
}

impl PostureHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[PostureSample] {
        &self.samples
    }

    /// Appends a sample unless the previous one is less than a second old.
    /// The spacing is a lower bound: slow frame processing stretches it,
    /// it is never compressed. Returns whether a sample was recorded.
    pub fn record(&mut self, now: DateTime<Utc>, is_good: bool) -> bool {
        if let Some(last) = self.samples.last() {
            if now.signed_duration_since(last.timestamp) < ChronoDuration::seconds(1) {
                return false;
            }
        }
        self.samples.push(PostureSample {
            timestamp: now,
            is_good,
        });
        true
    }

    /// Aggregates the samples within the trailing report window.
    pub fn summarize(&self, now: DateTime<Utc>, breaks_taken: u32) -> PostureReport {
        if self.samples.is_empty() {
            return PostureReport::NoHistory;
        }

        let window = ChronoDuration::seconds(REPORT_WINDOW_SECS);
        let recent = self
            .samples
            .iter()
            .filter(|sample| now.signed_duration_since(sample.timestamp) <= window);

        let mut total = 0usize;
        let mut good = 0usize;
        for sample in recent {
            total += 1;
            if sample.is_good {
                good += 1;
            }
        }

        if total == 0 {
            return PostureReport::NoRecentData;
        }

        PostureReport::Summary(ReportSummary {
            total_samples: total,
            good_samples: good,
            bad_samples: total - good,
            good_percentage: 100.0 * good as f64 / total as f64,
            breaks_taken,
        })
    }
}

/// Outcome of a report request. The two empty cases stay distinct: an
/// untouched history reads differently from one that is merely stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PostureReport {
    NoHistory,
    NoRecentData,
    Summary(ReportSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_samples: usize,
    pub good_samples: usize,
    pub bad_samples: usize,
    pub good_percentage: f64,
    pub breaks_taken: u32,
}

impl ReportSummary {
    // Samples arrive at one per second, so a count is a second count.
    pub fn total_minutes(&self) -> f64 {
        self.total_samples as f64 / 60.0
    }

    pub fn good_minutes(&self) -> f64 {
        self.good_samples as f64 / 60.0
    }

    pub fn bad_minutes(&self) -> f64 {
        self.bad_samples as f64 / 60.0
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Posture report (last {} min)", self.total_minutes() as u64)?;
        writeln!(f, "Good time: {:.1} min", self.good_minutes())?;
        writeln!(f, "Bad time: {:.1} min", self.bad_minutes())?;
        writeln!(f, "Score: {:.1}%", self.good_percentage)?;
        write!(f, "Breaks taken: {}", self.breaks_taken)
    }
}

impl fmt::Display for PostureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostureReport::NoHistory => write!(f, "No data collected yet."),
            PostureReport::NoRecentData => write!(f, "No recent data."),
            PostureReport::Summary(summary) => summary.fmt(f),
        }
    }
}

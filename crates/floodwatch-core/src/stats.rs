//! Read-side summaries: per-session health, per-task status, and aggregate
//! monitor statistics. All of these are point-in-time snapshots assembled on
//! demand; none of them hold locks past the call that built them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health classification for a single session, derived from its recent flood
/// count against the session thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionHealth {
    /// Recent flood count below the warn threshold.
    Ok,
    /// At or above the warn threshold, below critical.
    Warning,
    /// At or above the critical threshold.
    Critical,
}

impl SessionHealth {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Snapshot of one session's standing with the rate limiter.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// Health tier derived from `recent_floods`.
    pub status: SessionHealth,
    /// Floods raised by this session inside the sliding window.
    pub recent_floods: usize,
    /// Sum of wait times for the windowed floods, in seconds.
    pub total_wait_seconds: u64,
    /// Timestamp of this session's most recent flood, windowed or not.
    pub last_flood: Option<DateTime<Utc>>,
}

/// Snapshot of one task's standing against the task-blocked threshold.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaskStatus {
    /// Floods attributed to this task inside the sliding window.
    pub recent_floods: usize,
    /// Whether the windowed count has reached the task critical threshold.
    pub should_pause: bool,
}

/// Aggregate counters for the whole monitor.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonitorStats {
    /// Events ever recorded, including any since evicted by retention.
    pub total_events: u64,
    /// Alerts ever created, including any since evicted by retention.
    pub total_alerts: u64,
    /// Session-critical alert firings since startup.
    pub sessions_paused: u64,
    /// Task-blocked alert firings since startup.
    pub tasks_paused: u64,
    /// Sum of all recorded wait times, in seconds.
    pub total_wait_time: u64,
    /// `total_wait_time / total_events`, or 0.0 when no events exist.
    pub avg_wait_time: f64,
    /// Currently unacknowledged alerts.
    pub active_alerts: usize,
    /// Retained events with timestamps inside the last hour.
    pub events_last_hour: usize,
    /// Subscriber callbacks that panicked or timed out.
    pub callback_failures: u64,
}

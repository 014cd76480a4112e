//! Alert type definitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::events::FloodEvent;

/// Severity tier of an alert.
///
/// The ordering (`Low < Medium < High < Critical`) exists for display and
/// filtering only; it plays no part in suppression logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational.
    Low,
    /// Needs attention soon.
    Medium,
    /// Needs attention now.
    High,
    /// Immediate action required.
    Critical,
}

impl AlertSeverity {
    /// Static string representation for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Icon used by the textual report.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Low => "ℹ️",
            Self::Medium => "⚠️",
            Self::High => "❗",
            Self::Critical => "🚨",
        }
    }
}

/// The threshold check that produced an alert.
///
/// Each kind carries a fixed severity and title, so the evaluator only has to
/// pick the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Session reached the warn flood count within the window.
    SessionWarn,
    /// Session reached the critical flood count within the window.
    SessionCritical,
    /// A single event's wait exceeded the critical wait threshold.
    LongWait,
    /// Task reached the critical flood count within the window.
    TaskBlocked,
}

impl AlertKind {
    /// Stable identifier for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionWarn => "session-warn",
            Self::SessionCritical => "session-critical",
            Self::LongWait => "long-wait",
            Self::TaskBlocked => "task-blocked",
        }
    }

    /// Human-readable alert title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::SessionWarn => "Session flood warning",
            Self::SessionCritical => "Session flood critical",
            Self::LongWait => "Long flood wait",
            Self::TaskBlocked => "Task blocked by floods",
        }
    }

    /// Severity tier fixed per kind.
    #[must_use]
    pub fn severity(&self) -> AlertSeverity {
        match self {
            Self::SessionWarn => AlertSeverity::Medium,
            Self::SessionCritical | Self::TaskBlocked => AlertSeverity::Critical,
            Self::LongWait => AlertSeverity::High,
        }
    }
}

/// Acknowledgment record for an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgement {
    /// When the alert was acknowledged.
    pub at: DateTime<Utc>,
    /// Operator that acknowledged it, if known.
    pub by: Option<i64>,
}

/// An alert raised by the threshold evaluator.
///
/// The event list is fixed at creation: shared, read-only references the
/// alert never owns or mutates. Acknowledgment is the only mutable dimension
/// and is monotonic: once acknowledged an alert never re-opens.
#[derive(Debug)]
pub struct FloodAlert {
    /// Unique alert id (UUID v4).
    pub alert_id: String,
    /// The threshold check that fired.
    pub kind: AlertKind,
    /// Severity tier, fixed per kind.
    pub severity: AlertSeverity,
    /// Short human-readable title.
    pub title: String,
    /// Descriptive message with the triggering numbers.
    pub message: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// The events that caused this alert, oldest first.
    pub events: Vec<Arc<FloodEvent>>,
    ack: RwLock<Option<Acknowledgement>>,
}

impl FloodAlert {
    pub(crate) fn new(
        alert_id: String,
        kind: AlertKind,
        message: String,
        events: Vec<Arc<FloodEvent>>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            alert_id,
            kind,
            severity: kind.severity(),
            title: kind.title().to_string(),
            message,
            timestamp,
            events,
            ack: RwLock::new(None),
        }
    }

    /// Returns `true` once the alert has been acknowledged.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.ack.read().is_some()
    }

    /// The current acknowledgment record, if any.
    #[must_use]
    pub fn acknowledgement(&self) -> Option<Acknowledgement> {
        *self.ack.read()
    }

    /// Acknowledges the alert. Last writer wins: re-acknowledging overwrites
    /// the previous `at`/`by` with the latest caller's.
    pub(crate) fn acknowledge(&self, at: DateTime<Utc>, by: Option<i64>) {
        *self.ack.write() = Some(Acknowledgement { at, by });
    }
}

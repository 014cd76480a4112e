//! Threshold configuration for flood evaluation.
//!
//! A flat mapping from threshold name to numeric value. Any subset may be
//! overridden at runtime through [`Thresholds::apply`]; unknown keys are
//! ignored, never an error. Updates take effect for subsequent evaluations
//! only; already-created alerts are never altered.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Threshold values driving alert creation.
///
/// `floods_per_task_warn` is configured but deliberately not wired to any
/// alert; only the task-critical tier fires. Changing that would change
/// observable alerting behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Recent session floods that trigger a MEDIUM session alert. Defaults to `3`.
    #[serde(default = "default_floods_per_session_warn")]
    pub floods_per_session_warn: u64,

    /// Recent session floods that trigger a CRITICAL session alert. Defaults to `5`.
    #[serde(default = "default_floods_per_session_critical")]
    pub floods_per_session_critical: u64,

    /// Task warn threshold; configured but not evaluated. Defaults to `5`.
    #[serde(default = "default_floods_per_task_warn")]
    pub floods_per_task_warn: u64,

    /// Recent task floods that trigger a CRITICAL task alert. Defaults to `10`.
    #[serde(default = "default_floods_per_task_critical")]
    pub floods_per_task_critical: u64,

    /// Wait-seconds warn level; reserved for display. Defaults to `300`.
    #[serde(default = "default_wait_seconds_warn")]
    pub wait_seconds_warn: u64,

    /// Single-event wait that triggers a HIGH long-wait alert. Defaults to `600`.
    #[serde(default = "default_wait_seconds_critical")]
    pub wait_seconds_critical: u64,

    /// Sliding window length in minutes. Defaults to `60`.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,
}

fn default_floods_per_session_warn() -> u64 {
    3
}

fn default_floods_per_session_critical() -> u64 {
    5
}

fn default_floods_per_task_warn() -> u64 {
    5
}

fn default_floods_per_task_critical() -> u64 {
    10
}

fn default_wait_seconds_warn() -> u64 {
    300
}

fn default_wait_seconds_critical() -> u64 {
    600
}

fn default_window_minutes() -> u64 {
    60
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            floods_per_session_warn: default_floods_per_session_warn(),
            floods_per_session_critical: default_floods_per_session_critical(),
            floods_per_task_warn: default_floods_per_task_warn(),
            floods_per_task_critical: default_floods_per_task_critical(),
            wait_seconds_warn: default_wait_seconds_warn(),
            wait_seconds_critical: default_wait_seconds_critical(),
            window_minutes: default_window_minutes(),
        }
    }
}

impl Thresholds {
    /// Returns the sliding window as a [`Duration`].
    #[must_use]
    pub fn window(&self) -> Duration {
        #[allow(clippy::cast_possible_wrap)]
        Duration::minutes(self.window_minutes as i64)
    }

    /// Merges named overrides into this mapping.
    ///
    /// Unknown keys are debug-logged and skipped.
    pub fn apply<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        for (key, value) in overrides {
            match key {
                "floods_per_session_warn" => self.floods_per_session_warn = value,
                "floods_per_session_critical" => self.floods_per_session_critical = value,
                "floods_per_task_warn" => self.floods_per_task_warn = value,
                "floods_per_task_critical" => self.floods_per_task_critical = value,
                "wait_seconds_warn" => self.wait_seconds_warn = value,
                "wait_seconds_critical" => self.wait_seconds_critical = value,
                "window_minutes" => self.window_minutes = value,
                unknown => {
                    debug!(key = unknown, "ignoring unknown threshold key");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.floods_per_session_warn, 3);
        assert_eq!(t.floods_per_session_critical, 5);
        assert_eq!(t.floods_per_task_warn, 5);
        assert_eq!(t.floods_per_task_critical, 10);
        assert_eq!(t.wait_seconds_warn, 300);
        assert_eq!(t.wait_seconds_critical, 600);
        assert_eq!(t.window_minutes, 60);
    }

    #[test]
    fn test_apply_known_keys() {
        let mut t = Thresholds::default();
        t.apply([("floods_per_session_warn", 1), ("window_minutes", 5)]);
        assert_eq!(t.floods_per_session_warn, 1);
        assert_eq!(t.window_minutes, 5);
        // Untouched fields keep their defaults
        assert_eq!(t.floods_per_session_critical, 5);
    }

    #[test]
    fn test_apply_ignores_unknown_keys() {
        let mut t = Thresholds::default();
        t.apply([("no_such_threshold", 42)]);
        assert_eq!(t, Thresholds::default());
    }

    #[test]
    fn test_window_duration() {
        let t = Thresholds::default();
        assert_eq!(t.window(), Duration::minutes(60));
    }
}

//! Threshold evaluation for recorded flood events.
//!
//! The evaluator is edge-triggered: it runs exactly once per recorded event,
//! against the window snapshots captured at append time, and never polls.
//! Checks run in a fixed order and are independent: one call can fire a
//! session alert, a long-wait alert, and a task alert together.
//!
//! There is deliberately no cross-call deduplication or cooldown: every
//! qualifying event re-fires its tier. Operators see each instance.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    alerts::{AlertKind, AlertManager, FloodAlert},
    events::RecordedEvent,
    thresholds::Thresholds,
};

/// Evaluates thresholds for each recorded event and creates alerts.
pub struct ThresholdEvaluator {
    alert_manager: Arc<AlertManager>,
    /// Sessions pushed over the critical tier, cumulative.
    sessions_paused: AtomicU64,
    /// Tasks pushed over the blocked tier, cumulative.
    tasks_paused: AtomicU64,
}

impl ThresholdEvaluator {
    /// Creates an evaluator that files alerts with `alert_manager`.
    #[must_use]
    pub fn new(alert_manager: Arc<AlertManager>) -> Self {
        Self {
            alert_manager,
            sessions_paused: AtomicU64::new(0),
            tasks_paused: AtomicU64::new(0),
        }
    }

    /// Runs all threshold checks for one recorded event.
    ///
    /// `thresholds` is the caller's snapshot of the live configuration, taken
    /// once per call so a concurrent `update_thresholds` affects the next
    /// event, never this one. Returns the alerts created by this call.
    pub fn evaluate(
        &self,
        recorded: &RecordedEvent,
        thresholds: &Thresholds,
        now: DateTime<Utc>,
    ) -> Vec<Arc<FloodAlert>> {
        let mut created = Vec::new();
        let event = &recorded.event;

        // 1. Session tiers, mutually exclusive per call: only the higher fires.
        let session_count = recorded.recent_session.len() as u64;
        if session_count >= thresholds.floods_per_session_critical {
            let message = format!(
                "Session '{}' raised {} floods in the last {} minutes",
                event.session_id, session_count, thresholds.window_minutes
            );
            created.push(self.alert_manager.create(
                AlertKind::SessionCritical,
                message,
                recorded.recent_session.clone(),
                now,
            ));
            self.sessions_paused.fetch_add(1, Ordering::Relaxed);
        } else if session_count >= thresholds.floods_per_session_warn {
            let message = format!(
                "Session '{}' raised {} floods in the last {} minutes",
                event.session_id, session_count, thresholds.window_minutes
            );
            created.push(self.alert_manager.create(
                AlertKind::SessionWarn,
                message,
                recorded.recent_session.clone(),
                now,
            ));
        }

        // 2. Absolute wait, independent of the session outcome.
        if event.wait_seconds >= thresholds.wait_seconds_critical {
            let message = format!(
                "Session '{}' received a {} second flood wait",
                event.session_id, event.wait_seconds
            );
            created.push(self.alert_manager.create(
                AlertKind::LongWait,
                message,
                vec![Arc::clone(event)],
                now,
            ));
        }

        // 3. Task tier. floods_per_task_warn is configured but intentionally
        // not evaluated; only the critical tier fires.
        if let (Some(task_id), Some(recent_task)) =
            (event.task_id.as_ref(), recorded.recent_task.as_ref())
        {
            let task_count = recent_task.len() as u64;
            if task_count >= thresholds.floods_per_task_critical {
                let message = format!(
                    "Task '{}' raised {} floods in the last {} minutes",
                    task_id, task_count, thresholds.window_minutes
                );
                created.push(self.alert_manager.create(
                    AlertKind::TaskBlocked,
                    message,
                    recent_task.clone(),
                    now,
                ));
                self.tasks_paused.fetch_add(1, Ordering::Relaxed);
            }
        }

        if !created.is_empty() {
            debug!(
                event_id = event.event_id,
                session_id = %event.session_id,
                alerts = created.len(),
                "threshold evaluation created alerts"
            );
        }

        created
    }

    /// Cumulative count of session-critical firings.
    #[must_use]
    pub fn sessions_paused(&self) -> u64 {
        self.sessions_paused.load(Ordering::Relaxed)
    }

    /// Cumulative count of task-blocked firings.
    #[must_use]
    pub fn tasks_paused(&self) -> u64 {
        self.tasks_paused.load(Ordering::Relaxed)
    }
}

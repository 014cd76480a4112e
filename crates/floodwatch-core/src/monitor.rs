//! The [`FloodMonitor`] facade and its builder.
//!
//! The monitor wires the event store, the threshold evaluator, the alert
//! manager, and the callback dispatcher together behind one handle that is
//! cheap to share across worker sessions. All public operations are safe
//! under concurrent invocation; unrelated sessions never contend on a shared
//! lock during ingestion.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    alerts::{AlertHandler, AlertManager, AlertSeverity, CallbackDispatcher, FloodAlert},
    clock::{Clock, SystemClock},
    config::MonitorConfig,
    errors::MonitorError,
    evaluator::ThresholdEvaluator,
    events::{EventStore, FloodEvent, FloodType},
    stats::{MonitorStats, SessionHealth, SessionStatus, TaskStatus},
    thresholds::Thresholds,
};

/// How many active alerts [`FloodMonitor::report`] lists before truncating.
const REPORT_ALERT_LIMIT: usize = 5;

/// Errors from [`FloodMonitorBuilder::build`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The supplied configuration failed validation.
    #[error("invalid configuration: {0}")]
    ConfigValidation(String),
}

/// Central coordinator for flood event ingestion, threshold evaluation, and
/// alerting.
///
/// Construct via [`FloodMonitor::builder`]. The monitor owns no background
/// work except the dispatcher worker, which must be started with
/// [`FloodMonitor::start`] for subscriber callbacks to run; every other
/// operation happens inline on the caller's thread.
pub struct FloodMonitor {
    clock: Arc<dyn Clock>,
    thresholds: RwLock<Thresholds>,
    store: EventStore,
    evaluator: ThresholdEvaluator,
    alerts: Arc<AlertManager>,
    dispatcher: Arc<CallbackDispatcher>,
}

impl std::fmt::Debug for FloodMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloodMonitor").finish_non_exhaustive()
    }
}

impl FloodMonitor {
    /// Returns a builder with default configuration.
    #[must_use]
    pub fn builder() -> FloodMonitorBuilder {
        FloodMonitorBuilder::default()
    }

    /// Records one flood signal and evaluates thresholds for it.
    ///
    /// This is the hot path called by worker sessions. The append and the
    /// window snapshot are atomic per session/task key; evaluation and alert
    /// creation happen inline, while subscriber callbacks run on the
    /// dispatcher worker and never block this call.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if `session_id` is empty, or if `task_id` is
    /// present but empty.
    pub fn record_event(
        &self,
        flood_type: FloodType,
        session_id: &str,
        wait_seconds: u64,
        task_id: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<Arc<FloodEvent>, MonitorError> {
        let now = self.clock.now();
        // One snapshot per call: a concurrent update_thresholds applies to
        // the next event, and the store window matches what the evaluator sees.
        let thresholds = self.thresholds.read().clone();

        let recorded = self.store.record(
            flood_type,
            session_id,
            wait_seconds,
            task_id,
            user_id,
            now,
            thresholds.window(),
        )?;

        info!(
            event_id = recorded.event.event_id,
            flood_type = flood_type.as_str(),
            session_id,
            wait_seconds,
            task_id,
            "flood event recorded"
        );

        self.evaluator.evaluate(&recorded, &thresholds, now);
        Ok(Arc::clone(&recorded.event))
    }

    /// Marks an event resolved at the current clock time.
    ///
    /// Returns `false` for an unknown id. Re-resolving keeps the original
    /// resolution time.
    pub fn resolve_event(&self, event_id: u64) -> bool {
        self.store.resolve(event_id, self.clock.now())
    }

    /// Acknowledges an alert, recording who and when.
    ///
    /// Returns `false` for an unknown id. Re-acknowledging succeeds and
    /// overwrites the previous acknowledgment (last writer wins).
    pub fn acknowledge_alert(&self, alert_id: &str, user_id: Option<i64>) -> bool {
        self.alerts.acknowledge(alert_id, user_id, self.clock.now())
    }

    /// Unacknowledged alerts, newest first, optionally filtered by severity.
    #[must_use]
    pub fn active_alerts(&self, severity: Option<AlertSeverity>) -> Vec<Arc<FloodAlert>> {
        self.alerts.active_alerts(severity)
    }

    /// Registers a subscriber callback for every newly created alert.
    ///
    /// Handlers run on the dispatcher worker in registration order; a
    /// panicking or slow handler is isolated and counted, never propagated.
    pub fn subscribe(&self, handler: Arc<dyn AlertHandler>) {
        self.dispatcher.subscribe(handler);
    }

    /// Starts the dispatcher worker that delivers alerts to subscribers.
    ///
    /// Alerts created before `start` queue up and are delivered once the
    /// worker runs. Must be called from within a tokio runtime.
    pub fn start(&self) -> JoinHandle<()> {
        self.dispatcher.start()
    }

    /// Point-in-time standing of one session, computed fresh from the
    /// current window.
    #[must_use]
    pub fn session_status(&self, session_id: &str) -> SessionStatus {
        let now = self.clock.now();
        let thresholds = self.thresholds.read().clone();
        let recent = self
            .store
            .recent_for_session(session_id, now, thresholds.window());

        let count = recent.len() as u64;
        let status = if count >= thresholds.floods_per_session_critical {
            SessionHealth::Critical
        } else if count >= thresholds.floods_per_session_warn {
            SessionHealth::Warning
        } else {
            SessionHealth::Ok
        };

        SessionStatus {
            status,
            recent_floods: recent.len(),
            total_wait_seconds: recent.iter().map(|e| e.wait_seconds).sum(),
            last_flood: self.store.last_session_flood(session_id),
        }
    }

    /// Point-in-time standing of one task.
    ///
    /// `should_pause` is advisory; acting on it is the caller's decision.
    #[must_use]
    pub fn task_status(&self, task_id: &str) -> TaskStatus {
        let now = self.clock.now();
        let thresholds = self.thresholds.read().clone();
        let recent = self.store.recent_for_task(task_id, now, thresholds.window());

        TaskStatus {
            recent_floods: recent.len(),
            should_pause: recent.len() as u64 >= thresholds.floods_per_task_critical,
        }
    }

    /// Aggregate counters for the whole monitor.
    #[must_use]
    pub fn stats(&self) -> MonitorStats {
        let total_events = self.store.total_events();
        let total_wait_time = self.store.total_wait_time();
        let avg_wait_time = if total_events == 0 {
            0.0
        } else {
            total_wait_time as f64 / total_events as f64
        };

        MonitorStats {
            total_events,
            total_alerts: self.alerts.total_alerts(),
            sessions_paused: self.evaluator.sessions_paused(),
            tasks_paused: self.evaluator.tasks_paused(),
            total_wait_time,
            avg_wait_time,
            active_alerts: self.alerts.active_count(),
            events_last_hour: self.store.events_last_hour(self.clock.now()),
            callback_failures: self.dispatcher.failure_count(),
        }
    }

    /// Merges threshold overrides into the live configuration.
    ///
    /// Unknown keys are ignored. Takes effect for subsequent evaluations;
    /// already-created alerts are unaffected.
    pub fn update_thresholds<'a, I>(&self, overrides: I)
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        self.thresholds.write().apply(overrides);
    }

    /// A copy of the live thresholds.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds.read().clone()
    }

    /// Human-readable summary for direct display by a chat or console front
    /// end: aggregate counters plus up to five active alerts, newest first.
    #[must_use]
    pub fn report(&self) -> String {
        let stats = self.stats();
        let active = self.alerts.active_alerts(None);

        let mut out = String::from("🌊 Flood Monitor Report\n");
        out.push_str(&format!(
            "Events: {} total, {} in the last hour\n",
            stats.total_events, stats.events_last_hour
        ));
        out.push_str(&format!(
            "Total wait: {}s (avg {:.1}s)\n",
            stats.total_wait_time, stats.avg_wait_time
        ));
        out.push_str(&format!("Active alerts: {}\n", stats.active_alerts));

        for alert in active.iter().take(REPORT_ALERT_LIMIT) {
            out.push_str(&format!("{} {}\n", alert.severity.icon(), alert.title));
        }
        if active.len() > REPORT_ALERT_LIMIT {
            out.push_str(&format!("… and {} more\n", active.len() - REPORT_ALERT_LIMIT));
        }

        out
    }
}

/// Builder for [`FloodMonitor`], the single injection point for
/// configuration, clock, and initial subscribers.
#[derive(Default)]
pub struct FloodMonitorBuilder {
    config: MonitorConfig,
    thresholds: Option<Thresholds>,
    clock: Option<Arc<dyn Clock>>,
    handlers: Vec<Arc<dyn AlertHandler>>,
}

impl FloodMonitorBuilder {
    /// Uses the given configuration instead of compiled defaults.
    #[must_use]
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the thresholds section of the configuration.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Injects a clock. Tests use [`ManualClock`](crate::clock::ManualClock)
    /// to control window expiry deterministically.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Registers a subscriber before the monitor is built.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn AlertHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Validates the configuration and assembles the monitor.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ConfigValidation`] if the effective
    /// configuration fails [`MonitorConfig::validate`].
    pub fn build(self) -> Result<FloodMonitor, BuildError> {
        let mut config = self.config;
        if let Some(thresholds) = self.thresholds {
            config.thresholds = thresholds;
        }
        config.validate().map_err(BuildError::ConfigValidation)?;

        let dispatcher = Arc::new(CallbackDispatcher::new(config.callback_timeout()));
        for handler in self.handlers {
            dispatcher.subscribe(handler);
        }

        let alerts = Arc::new(AlertManager::new(
            Arc::clone(&dispatcher),
            config.retention.max_alerts,
        ));

        Ok(FloodMonitor {
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            thresholds: RwLock::new(config.thresholds),
            store: EventStore::new(config.retention.max_events),
            evaluator: ThresholdEvaluator::new(Arc::clone(&alerts)),
            alerts,
            dispatcher,
        })
    }
}

//! Alert management and storage.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{
    dispatcher::CallbackDispatcher,
    types::{AlertKind, AlertSeverity, FloodAlert},
};
use crate::events::FloodEvent;

/// Default cap on alerts kept in memory.
pub const DEFAULT_MAX_ALERTS: usize = 1000;

/// Creates, stores, and acknowledges alerts.
///
/// This is the only creation path for [`FloodAlert`]s. Retention is bounded:
/// when approaching capacity, acknowledged alerts are removed first, then the
/// oldest alerts are evicted FIFO, so active and recent alerts are preserved.
pub struct AlertManager {
    alerts: RwLock<Vec<Arc<FloodAlert>>>,
    dispatcher: Arc<CallbackDispatcher>,
    total_alerts: AtomicU64,
    max_alerts: usize,
}

impl AlertManager {
    /// Creates a manager retaining at most `max_alerts` alerts.
    #[must_use]
    pub fn new(dispatcher: Arc<CallbackDispatcher>, max_alerts: usize) -> Self {
        Self {
            alerts: RwLock::new(Vec::new()),
            dispatcher,
            total_alerts: AtomicU64::new(0),
            max_alerts,
        }
    }

    /// Creates, stores, and dispatches a new alert.
    ///
    /// The event list is fixed here and never mutated afterwards. The alert
    /// is handed to the callback dispatcher before returning; callback
    /// outcomes never affect creation.
    pub fn create(
        &self,
        kind: AlertKind,
        message: String,
        events: Vec<Arc<FloodEvent>>,
        now: DateTime<Utc>,
    ) -> Arc<FloodAlert> {
        let alert = Arc::new(FloodAlert::new(
            Uuid::new_v4().to_string(),
            kind,
            message,
            events,
            now,
        ));

        {
            let mut alerts = self.alerts.write();

            // At 90% capacity, drop acknowledged alerts first
            if alerts.len() >= self.max_alerts * 9 / 10 {
                alerts.retain(|a| !a.is_acknowledged());
            }

            // If still at capacity, evict oldest
            while alerts.len() >= self.max_alerts {
                alerts.remove(0);
            }

            alerts.push(Arc::clone(&alert));
        }

        self.total_alerts.fetch_add(1, Ordering::Relaxed);

        info!(
            alert_id = %alert.alert_id,
            kind = alert.kind.as_str(),
            severity = alert.severity.as_str(),
            message = %alert.message,
            "alert created"
        );

        self.dispatcher.dispatch(Arc::clone(&alert));
        alert
    }

    /// Acknowledges an alert.
    ///
    /// Returns `false` for unknown ids. Re-acknowledging succeeds
    /// idempotently, overwriting `acknowledged_by`/`acknowledged_at` with the
    /// latest caller (last writer wins).
    pub fn acknowledge(&self, alert_id: &str, user_id: Option<i64>, now: DateTime<Utc>) -> bool {
        let alerts = self.alerts.read();
        match alerts.iter().find(|a| a.alert_id == alert_id) {
            Some(alert) => {
                alert.acknowledge(now, user_id);
                true
            }
            None => false,
        }
    }

    /// Non-acknowledged alerts, optionally filtered by severity, newest first.
    #[must_use]
    pub fn active_alerts(&self, severity: Option<AlertSeverity>) -> Vec<Arc<FloodAlert>> {
        self.alerts
            .read()
            .iter()
            .rev()
            .filter(|a| !a.is_acknowledged())
            .filter(|a| severity.map_or(true, |s| a.severity == s))
            .cloned()
            .collect()
    }

    /// Count of non-acknowledged alerts.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.alerts.read().iter().filter(|a| !a.is_acknowledged()).count()
    }

    /// Number of alerts created since construction.
    #[must_use]
    pub fn total_alerts(&self) -> u64 {
        self.total_alerts.load(Ordering::Relaxed)
    }

    /// Looks up a retained alert by id.
    #[must_use]
    pub fn get(&self, alert_id: &str) -> Option<Arc<FloodAlert>> {
        self.alerts.read().iter().find(|a| a.alert_id == alert_id).cloned()
    }
}

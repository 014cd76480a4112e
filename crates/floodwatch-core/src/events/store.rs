//! Append-only flood event storage.
//!
//! The store keeps an identity map by event id plus per-session and per-task
//! indices used to compute recent-window subsets. Appending to an index and
//! computing that key's window snapshot happen under the same `DashMap` entry
//! guard, which serializes writers on the same key without a global lock;
//! unrelated sessions never contend.
//!
//! Retention is a FIFO cap: when `max_events` is exceeded the oldest events
//! are evicted from the identity map and removed from their index vectors.
//! Alerts hold their own `Arc` references, so eviction never mutates an
//! already-created alert.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::trace;

use super::types::{FloodEvent, FloodType};
use crate::errors::MonitorError;

/// Default cap on retained events.
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

/// Outcome of a successful [`EventStore::record`] call.
///
/// Window snapshots are captured under the per-key entry guard at append
/// time, so the evaluator sees counts that cannot be under- or double-counted
/// by concurrent writers on the same key.
#[derive(Debug)]
pub struct RecordedEvent {
    /// The newly recorded event.
    pub event: Arc<FloodEvent>,
    /// Session events within the window, including `event`, oldest first.
    pub recent_session: Vec<Arc<FloodEvent>>,
    /// Task events within the window, if the event is task-scoped.
    pub recent_task: Option<Vec<Arc<FloodEvent>>>,
}

/// Append-only record of flood events with windowed lookups.
pub struct EventStore {
    next_id: AtomicU64,
    /// Identity map by event id.
    events: DashMap<u64, Arc<FloodEvent>>,
    /// Insertion order, for FIFO eviction.
    order: Mutex<VecDeque<u64>>,
    session_index: DashMap<Arc<str>, Vec<Arc<FloodEvent>>>,
    task_index: DashMap<Arc<str>, Vec<Arc<FloodEvent>>>,
    total_events: AtomicU64,
    total_wait_time: AtomicU64,
    max_events: usize,
}

impl EventStore {
    /// Creates a store retaining at most `max_events` events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            events: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            session_index: DashMap::new(),
            task_index: DashMap::new(),
            total_events: AtomicU64::new(0),
            total_wait_time: AtomicU64::new(0),
            max_events,
        }
    }

    /// Records a flood event and returns it with its window snapshots.
    ///
    /// Always succeeds once inputs are valid; it never depends on the outcome
    /// of threshold evaluation, which the caller runs afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::EmptySessionId`] or [`MonitorError::EmptyTaskId`]
    /// for malformed keys; nothing is recorded in that case.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        flood_type: FloodType,
        session_id: &str,
        wait_seconds: u64,
        task_id: Option<&str>,
        user_id: Option<i64>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<RecordedEvent, MonitorError> {
        if session_id.is_empty() {
            return Err(MonitorError::EmptySessionId);
        }
        if matches!(task_id, Some(t) if t.is_empty()) {
            return Err(MonitorError::EmptyTaskId);
        }

        let event_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session: Arc<str> = Arc::from(session_id);
        let task: Option<Arc<str>> = task_id.map(Arc::from);
        let event = Arc::new(FloodEvent::new(
            event_id,
            flood_type,
            Arc::clone(&session),
            task.clone(),
            wait_seconds,
            now,
            user_id,
        ));

        self.events.insert(event_id, Arc::clone(&event));
        self.total_events.fetch_add(1, Ordering::Relaxed);
        self.total_wait_time.fetch_add(wait_seconds, Ordering::Relaxed);

        let recent_session = {
            let mut entry = self.session_index.entry(session).or_default();
            entry.push(Arc::clone(&event));
            within_window(&entry, now, window)
        };

        let recent_task = task.map(|key| {
            let mut entry = self.task_index.entry(key).or_default();
            entry.push(Arc::clone(&event));
            within_window(&entry, now, window)
        });

        self.enforce_retention(event_id);

        trace!(
            event_id,
            session_id = %event.session_id,
            flood_type = event.flood_type.as_str(),
            wait_seconds,
            "flood event recorded"
        );

        Ok(RecordedEvent { event, recent_session, recent_task })
    }

    /// Marks an event resolved.
    ///
    /// Returns `false` for unknown ids. Resolving an already-resolved event is
    /// a no-op that still returns `true`.
    pub fn resolve(&self, event_id: u64, now: DateTime<Utc>) -> bool {
        match self.events.get(&event_id) {
            Some(event) => {
                event.resolve(now);
                true
            }
            None => false,
        }
    }

    /// Looks up an event by id.
    #[must_use]
    pub fn get(&self, event_id: u64) -> Option<Arc<FloodEvent>> {
        self.events.get(&event_id).map(|e| Arc::clone(&e))
    }

    /// Session events within the window ending at `now`, oldest first.
    #[must_use]
    pub fn recent_for_session(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Vec<Arc<FloodEvent>> {
        self.session_index
            .get(session_id)
            .map(|entry| within_window(&entry, now, window))
            .unwrap_or_default()
    }

    /// Task events within the window ending at `now`, oldest first.
    #[must_use]
    pub fn recent_for_task(
        &self,
        task_id: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Vec<Arc<FloodEvent>> {
        self.task_index
            .get(task_id)
            .map(|entry| within_window(&entry, now, window))
            .unwrap_or_default()
    }

    /// Timestamp of the newest retained event for a session, window-independent.
    #[must_use]
    pub fn last_session_flood(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.session_index
            .get(session_id)
            .and_then(|entry| entry.last().map(|e| e.timestamp))
    }

    /// Number of successful `record` calls since construction.
    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.total_events.load(Ordering::Relaxed)
    }

    /// Sum of `wait_seconds` across all recorded events.
    #[must_use]
    pub fn total_wait_time(&self) -> u64 {
        self.total_wait_time.load(Ordering::Relaxed)
    }

    /// Count of retained events recorded within the last hour.
    #[must_use]
    pub fn events_last_hour(&self, now: DateTime<Utc>) -> usize {
        self.events
            .iter()
            .filter(|e| now.signed_duration_since(e.timestamp) < Duration::hours(1))
            .count()
    }

    /// Number of currently retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Evicts oldest events past the retention cap, pruning their index
    /// entries. Lock order: the FIFO mutex is taken first, entry guards
    /// second; `record` never holds an entry guard while taking the mutex.
    fn enforce_retention(&self, new_event_id: u64) {
        let mut order = self.order.lock();
        order.push_back(new_event_id);

        while order.len() > self.max_events {
            let Some(oldest) = order.pop_front() else { break };
            if let Some((_, evicted)) = self.events.remove(&oldest) {
                self.unindex(&evicted);
                trace!(event_id = oldest, "evicted event past retention cap");
            }
        }
    }

    fn unindex(&self, evicted: &FloodEvent) {
        let session = Arc::clone(&evicted.session_id);
        if let Some(mut entry) = self.session_index.get_mut(&session) {
            entry.retain(|e| e.event_id != evicted.event_id);
        }
        self.session_index.remove_if(&session, |_, events| events.is_empty());

        if let Some(task) = evicted.task_id.as_ref() {
            if let Some(mut entry) = self.task_index.get_mut(task) {
                entry.retain(|e| e.event_id != evicted.event_id);
            }
            self.task_index.remove_if(task, |_, events| events.is_empty());
        }
    }
}

/// Window membership uses strict less-than on elapsed time: an event exactly
/// at the window boundary is excluded.
fn within_window(
    events: &[Arc<FloodEvent>],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<Arc<FloodEvent>> {
    events
        .iter()
        .filter(|e| now.signed_duration_since(e.timestamp) < window)
        .cloned()
        .collect()
}

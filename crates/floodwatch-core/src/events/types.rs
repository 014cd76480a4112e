//! Flood event type definitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Kind of provider-side rate-limit signal raised by a worker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloodType {
    /// Provider-mandated cooldown for N seconds.
    FloodWait,
    /// Too many messages to unknown peers.
    PeerFlood,
    /// Recipient privacy settings blocked the send.
    PrivacyRestricted,
    /// The sending account was banned.
    UserBanned,
    /// The session's authorization is no longer valid.
    SessionExpired,
}

impl FloodType {
    /// Static string representation for log fields and report lines.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FloodWait => "flood_wait",
            Self::PeerFlood => "peer_flood",
            Self::PrivacyRestricted => "privacy_restricted",
            Self::UserBanned => "user_banned",
            Self::SessionExpired => "session_expired",
        }
    }
}

/// A single recorded flood signal.
///
/// Identity, type, session/task association, and `wait_seconds` never change
/// after creation. Only the resolution state mutates, and only through
/// [`resolve`](Self::resolve); it is interior-mutable so shared `Arc`
/// references held by indices and alerts all observe the same resolution.
#[derive(Debug)]
pub struct FloodEvent {
    /// Unique id, allocated from a monotonically increasing sequence.
    /// Creation order is discoverable by id order.
    pub event_id: u64,
    /// The kind of flood signal.
    pub flood_type: FloodType,
    /// Worker session that raised the signal. Never empty.
    pub session_id: Arc<str>,
    /// Campaign/task in progress, absent if not task-scoped.
    pub task_id: Option<Arc<str>>,
    /// Provider-mandated cooldown in seconds, 0 if not applicable.
    pub wait_seconds: u64,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Operator whose action triggered the flood, if known.
    pub user_id: Option<i64>,
    resolution: RwLock<Option<DateTime<Utc>>>,
}

impl FloodEvent {
    pub(crate) fn new(
        event_id: u64,
        flood_type: FloodType,
        session_id: Arc<str>,
        task_id: Option<Arc<str>>,
        wait_seconds: u64,
        timestamp: DateTime<Utc>,
        user_id: Option<i64>,
    ) -> Self {
        Self {
            event_id,
            flood_type,
            session_id,
            task_id,
            wait_seconds,
            timestamp,
            user_id,
            resolution: RwLock::new(None),
        }
    }

    /// Returns `true` once the event has been resolved by an operator.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolution.read().is_some()
    }

    /// Resolution time, if the event has been resolved.
    #[must_use]
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        *self.resolution.read()
    }

    /// Marks the event resolved. Idempotent: a second resolution keeps the
    /// original `resolved_at`.
    pub(crate) fn resolve(&self, now: DateTime<Utc>) {
        let mut slot = self.resolution.write();
        if slot.is_none() {
            *slot = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event() -> FloodEvent {
        FloodEvent::new(1, FloodType::FloodWait, Arc::from("s1"), None, 30, Utc::now(), None)
    }

    #[test]
    fn test_new_event_is_unresolved() {
        let e = event();
        assert!(!e.is_resolved());
        assert!(e.resolved_at().is_none());
    }

    #[test]
    fn test_resolve_keeps_first_timestamp() {
        let e = event();
        let first = Utc::now();
        e.resolve(first);
        e.resolve(first + Duration::minutes(5));

        assert!(e.is_resolved());
        assert_eq!(e.resolved_at(), Some(first));
    }

    #[test]
    fn test_flood_type_as_str() {
        assert_eq!(FloodType::FloodWait.as_str(), "flood_wait");
        assert_eq!(FloodType::PeerFlood.as_str(), "peer_flood");
        assert_eq!(FloodType::SessionExpired.as_str(), "session_expired");
    }
}

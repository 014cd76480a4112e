//! Monitor error definitions.

use thiserror::Error;

/// Errors that can occur when recording flood events.
///
/// Unknown event or alert ids are not errors: `resolve_event` and
/// `acknowledge_alert` return `false` for those, since idempotent retries make
/// them frequent, expected outcomes.
///
/// A negative `wait_seconds` is unrepresentable here: the field is `u64`, so
/// the "must be non-negative" constraint is enforced by the type system.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MonitorError {
    /// `record_event` was called with an empty session id.
    #[error("session id must not be empty")]
    EmptySessionId,

    /// `record_event` was called with a present but empty task id.
    #[error("task id must not be empty when provided")]
    EmptyTaskId,
}

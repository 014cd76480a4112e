//! Flood event recording and windowed lookup.
//!
//! ## Components
//!
//! - **[`FloodEvent`]**: Immutable record of a provider-side flood signal
//! - **[`FloodType`]**: The enumerated signal kinds
//! - **[`EventStore`]**: Append-only store with per-session and per-task
//!   indices and bounded FIFO retention

pub mod store;
pub mod types;

pub use store::{EventStore, RecordedEvent};
pub use types::{FloodEvent, FloodType};

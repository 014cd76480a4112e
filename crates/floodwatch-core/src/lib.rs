//! # Floodwatch Core
//!
//! Core library for the floodwatch abuse/flood threshold monitor.
//!
//! A fleet of messaging worker sessions reports provider-side rate-limit
//! signals ("flood wait") to one [`FloodMonitor`] instance. The monitor
//! aggregates those signals over a sliding time window per session and per
//! task, escalates severity through configurable thresholds, and emits alerts
//! that subscribers can turn into throttling decisions or notifications.
//!
//! This crate provides the foundational components for:
//!
//! - **[`events`]**: Append-only flood event store with per-session and
//!   per-task indices and bounded FIFO retention.
//!
//! - **[`evaluator`]**: Edge-triggered threshold evaluation, invoked once per
//!   recorded event (no background polling).
//!
//! - **[`alerts`]**: Alert lifecycle management (creation, acknowledgment,
//!   retention) and subscriber callback dispatch with per-callback isolation.
//!
//! - **[`monitor`]**: The [`FloodMonitor`] facade and its builder, the single
//!   dependency-injection surface for clock, configuration, and handlers.
//!
//! - **[`config`]**: Layered configuration loading (TOML file + environment
//!   overrides) with validation.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        FloodMonitor                        │
//! │  ┌──────────────┐  ┌────────────────────┐  ┌────────────┐  │
//! │  │  EventStore  │  │ ThresholdEvaluator │  │ AlertMgr   │  │
//! │  └──────┬───────┘  └─────────┬──────────┘  └─────┬──────┘  │
//! │         │                    │                   │         │
//! │   session/task          window snapshots   CallbackDisp.   │
//! │   indices (DashMap)     + tier decisions   (worker queue)  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Event Flow
//!
//! ```text
//! worker session manager
//!        │ record_event(flood_type, session, wait, task?, user?)
//!        ▼
//! ┌─────────────┐
//! │ EventStore  │  append + per-key window snapshot (atomic per key)
//! └──────┬──────┘
//!        ▼
//! ┌─────────────────────┐
//! │ ThresholdEvaluator  │  session tier │ long-wait │ task tier
//! └──────┬──────────────┘
//!        ▼ zero or more alerts
//! ┌─────────────┐      ┌────────────────────┐
//! │ AlertManager│ ───► │ CallbackDispatcher │ ───► subscribers
//! └─────────────┘      └────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use floodwatch_core::{events::FloodType, monitor::FloodMonitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = FloodMonitor::builder().build()?;
//!     let _worker = monitor.start();
//!
//!     monitor.record_event(FloodType::FloodWait, "session-1", 30, None, None)?;
//!
//!     println!("{}", monitor.report());
//!     Ok(())
//! }
//! ```

pub mod alerts;
pub mod clock;
pub mod config;
pub mod errors;
pub mod evaluator;
pub mod events;
pub mod logging;
pub mod monitor;
pub mod stats;
pub mod thresholds;

pub use alerts::{AlertHandler, AlertKind, AlertSeverity, FloodAlert};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use errors::MonitorError;
pub use events::{FloodEvent, FloodType};
pub use monitor::{BuildError, FloodMonitor, FloodMonitorBuilder};
pub use stats::{MonitorStats, SessionHealth, SessionStatus, TaskStatus};
pub use thresholds::Thresholds;

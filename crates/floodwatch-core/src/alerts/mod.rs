//! Alert lifecycle and subscriber notification.
//!
//! ## Components
//!
//! - **[`AlertManager`]**: Creates, stores, and acknowledges alerts; the only
//!   creation path for [`FloodAlert`]s
//! - **[`CallbackDispatcher`]**: Delivers newly created alerts to registered
//!   [`AlertHandler`]s off the record path, isolating failures per handler
//! - **[`FloodAlert`]**: Individual alert instances with a fixed event list
//! - **[`AlertKind`]** / **[`AlertSeverity`]**: Classification for display
//!   and filtering

pub mod dispatcher;
pub mod manager;
pub mod types;

pub use dispatcher::{AlertHandler, CallbackDispatcher};
pub use manager::AlertManager;
pub use types::{Acknowledgement, AlertKind, AlertSeverity, FloodAlert};

//! Logging initialization for host processes embedding the monitor.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes the global tracing subscriber from the logging configuration.
///
/// `RUST_LOG` takes precedence over `config.level` when set. Call once from
/// the host binary; subsequent calls panic from the global-default guard in
/// `tracing_subscriber`.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,floodwatch_core={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer().pretty().with_target(false);
        registry.with(fmt_layer).init();
    }
}

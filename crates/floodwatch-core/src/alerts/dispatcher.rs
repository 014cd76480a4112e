//! Alert callback dispatch.
//!
//! Subscribers register through the closed [`AlertHandler`] capability and
//! are invoked in registration order for every newly created alert. Delivery
//! runs on a background worker fed by an unbounded queue, so producing an
//! alert never blocks on a slow subscriber. Each invocation is isolated: a
//! panicking handler is caught at the task boundary and a handler exceeding
//! the configured timeout is abandoned; in both cases later handlers still
//! run and the alert is still considered successfully created.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::{Mutex, RwLock};
use tokio::{sync::mpsc, task::JoinHandle, time::timeout};
use tracing::{debug, error, info, warn};

use super::types::FloodAlert;

/// Default bound on a single handler invocation.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Capability interface for alert subscribers.
///
/// Handlers run off the record path and may perform I/O, but each invocation
/// is bounded by the dispatcher's callback timeout.
pub trait AlertHandler: Send + Sync {
    /// Called once for each newly created alert.
    fn handle(&self, alert: &FloodAlert);
}

impl<F> AlertHandler for F
where
    F: Fn(&FloodAlert) + Send + Sync,
{
    fn handle(&self, alert: &FloodAlert) {
        self(alert);
    }
}

/// Delivers created alerts to registered handlers.
pub struct CallbackDispatcher {
    handlers: RwLock<Vec<Arc<dyn AlertHandler>>>,
    queue: mpsc::UnboundedSender<Arc<FloodAlert>>,
    /// Receiver parked here until [`start`](Self::start) claims it.
    inbox: Mutex<Option<mpsc::UnboundedReceiver<Arc<FloodAlert>>>>,
    callback_timeout: Duration,
    failures: AtomicU64,
}

impl CallbackDispatcher {
    /// Creates a dispatcher whose handler invocations are bounded by
    /// `callback_timeout`.
    #[must_use]
    pub fn new(callback_timeout: Duration) -> Self {
        let (queue, inbox) = mpsc::unbounded_channel();
        Self {
            handlers: RwLock::new(Vec::new()),
            queue,
            inbox: Mutex::new(Some(inbox)),
            callback_timeout,
            failures: AtomicU64::new(0),
        }
    }

    /// Registers a handler. Handlers are invoked in registration order.
    pub fn subscribe(&self, handler: Arc<dyn AlertHandler>) {
        self.handlers.write().push(handler);
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Number of handler invocations that panicked or timed out.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Enqueues an alert for delivery. Never blocks.
    pub(crate) fn dispatch(&self, alert: Arc<FloodAlert>) {
        if self.queue.send(alert).is_err() {
            warn!("alert dropped: callback worker has exited");
        }
    }

    /// Starts the background delivery task.
    ///
    /// Must be called from within a tokio runtime, at most once; alerts
    /// created before the worker starts are queued and delivered once it
    /// runs. The task exits when the dispatcher is dropped and the queue
    /// drains.
    #[must_use]
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let Some(mut inbox) = self.inbox.lock().take() else {
            warn!("callback dispatcher already started");
            return tokio::spawn(async {});
        };

        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            info!(
                timeout_seconds = dispatcher.callback_timeout.as_secs(),
                "starting alert callback worker"
            );

            while let Some(alert) = inbox.recv().await {
                dispatcher.deliver(alert).await;
            }

            debug!("alert queue closed, callback worker exiting");
        })
    }

    /// Invokes every registered handler for one alert, in order.
    async fn deliver(&self, alert: Arc<FloodAlert>) {
        let handlers: Vec<Arc<dyn AlertHandler>> = self.handlers.read().clone();

        for (index, handler) in handlers.into_iter().enumerate() {
            let payload = Arc::clone(&alert);
            // spawn_blocking gives a task boundary that contains panics,
            // and lets a timed-out handler finish off-path instead of
            // stalling delivery to the remaining handlers.
            let invocation = tokio::task::spawn_blocking(move || handler.handle(&payload));

            match timeout(self.callback_timeout, invocation).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_panic() => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    error!(
                        handler = index,
                        alert_id = %alert.alert_id,
                        "alert handler panicked - recovering"
                    );
                }
                Ok(Err(_)) => {
                    // Cancelled; runtime is shutting down.
                }
                Err(_) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        handler = index,
                        alert_id = %alert.alert_id,
                        timeout_seconds = self.callback_timeout.as_secs(),
                        "alert handler exceeded timeout, abandoning"
                    );
                }
            }
        }
    }
}

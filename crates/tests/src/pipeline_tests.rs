//! End-to-end tests for the ingestion → evaluation → subscriber pipeline.
//!
//! These tests drive the monitor exclusively through its public API and
//! observe the results through subscriber callbacks, the way an embedding
//! worker-session manager would.

use std::sync::Arc;

use floodwatch_core::{
    AlertHandler, AlertKind, AlertSeverity, Clock, FloodAlert, FloodMonitor, FloodType,
    ManualClock,
};
use tokio::{
    sync::mpsc,
    time::{timeout, Duration},
};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn collector() -> (Arc<dyn AlertHandler>, mpsc::UnboundedReceiver<AlertKind>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = Arc::new(move |alert: &FloodAlert| {
        let _ = tx.send(alert.kind);
    });
    (handler, rx)
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<AlertKind>) -> AlertKind {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for alert delivery")
        .expect("alert channel closed")
}

#[tokio::test]
async fn test_escalation_reaches_subscriber() {
    let (handler, mut rx) = collector();
    let monitor = FloodMonitor::builder().with_handler(handler).build().unwrap();
    let _worker = monitor.start();

    // Three floods in quick succession cross the warn tier
    for _ in 0..3 {
        monitor
            .record_event(FloodType::FloodWait, "session-1", 30, None, None)
            .unwrap();
    }
    assert_eq!(recv(&mut rx).await, AlertKind::SessionWarn);

    // Events four and five: another warn, then critical
    monitor
        .record_event(FloodType::FloodWait, "session-1", 30, None, None)
        .unwrap();
    monitor
        .record_event(FloodType::FloodWait, "session-1", 30, None, None)
        .unwrap();

    assert_eq!(recv(&mut rx).await, AlertKind::SessionWarn);
    assert_eq!(recv(&mut rx).await, AlertKind::SessionCritical);
}

#[tokio::test]
async fn test_panicking_subscriber_does_not_stop_delivery() {
    let (ok_handler, mut rx) = collector();
    let monitor = FloodMonitor::builder().build().unwrap();

    // Registration order matters: the panicking handler runs first
    monitor.subscribe(Arc::new(|_: &FloodAlert| panic!("subscriber bug")));
    monitor.subscribe(ok_handler);
    let _worker = monitor.start();

    monitor
        .record_event(FloodType::FloodWait, "session-1", 900, None, None)
        .unwrap();

    // Delivery is sequential per alert, so once the second handler has run
    // the first handler's panic has already been recorded
    assert_eq!(recv(&mut rx).await, AlertKind::LongWait);
    assert_eq!(monitor.stats().callback_failures, 1);

    // Ingestion keeps working after the panic
    monitor
        .record_event(FloodType::FloodWait, "session-2", 700, None, None)
        .unwrap();
    assert_eq!(recv(&mut rx).await, AlertKind::LongWait);
}

#[tokio::test]
async fn test_alerts_created_before_start_are_delivered() {
    let (handler, mut rx) = collector();
    let monitor = FloodMonitor::builder().with_handler(handler).build().unwrap();

    // No worker yet: the alert queues
    monitor
        .record_event(FloodType::PeerFlood, "session-1", 800, None, None)
        .unwrap();
    let _worker = monitor.start();

    assert_eq!(recv(&mut rx).await, AlertKind::LongWait);
}

#[tokio::test]
async fn test_sessions_do_not_cross_contaminate() {
    let (handler, mut rx) = collector();
    let clock = Arc::new(ManualClock::default());
    let monitor = FloodMonitor::builder()
        .with_clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .with_handler(handler)
        .build()
        .unwrap();
    let _worker = monitor.start();

    // Two floods each on three sessions: six events, zero alerts
    for session in ["a", "b", "c"] {
        for _ in 0..2 {
            monitor
                .record_event(FloodType::FloodWait, session, 10, None, None)
                .unwrap();
        }
    }
    assert!(monitor.active_alerts(None).is_empty());

    // The third flood on one session fires for that session only
    monitor
        .record_event(FloodType::FloodWait, "b", 10, None, None)
        .unwrap();
    assert_eq!(recv(&mut rx).await, AlertKind::SessionWarn);
    assert_eq!(monitor.active_alerts(None).len(), 1);
    assert_eq!(monitor.session_status("a").recent_floods, 2);
    assert_eq!(monitor.session_status("b").recent_floods, 3);
}

#[tokio::test]
async fn test_task_blocked_pipeline() {
    let (handler, mut rx) = collector();
    let monitor = FloodMonitor::builder().with_handler(handler).build().unwrap();
    let _worker = monitor.start();

    // Ten floods for one task spread across sessions so only the task
    // tier accumulates
    for i in 0..10 {
        monitor
            .record_event(
                FloodType::FloodWait,
                &format!("session-{i}"),
                0,
                Some("broadcast-42"),
                None,
            )
            .unwrap();
    }

    assert_eq!(recv(&mut rx).await, AlertKind::TaskBlocked);
    assert!(monitor.task_status("broadcast-42").should_pause);

    let critical = monitor.active_alerts(Some(AlertSeverity::Critical));
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].events.len(), 10);
}

#[tokio::test]
async fn test_acknowledged_alert_leaves_active_set() {
    let (handler, mut rx) = collector();
    let monitor = FloodMonitor::builder().with_handler(handler).build().unwrap();
    let _worker = monitor.start();

    monitor
        .record_event(FloodType::FloodWait, "session-1", 700, None, None)
        .unwrap();
    recv(&mut rx).await;

    let active = monitor.active_alerts(None);
    assert_eq!(active.len(), 1);
    let alert_id = active[0].alert_id.clone();

    assert!(monitor.acknowledge_alert(&alert_id, Some(7)));
    assert!(monitor.active_alerts(None).is_empty());
    assert_eq!(active[0].acknowledgement().unwrap().by, Some(7));

    // Re-acknowledging succeeds and takes the latest caller
    assert!(monitor.acknowledge_alert(&alert_id, Some(8)));
    assert_eq!(active[0].acknowledgement().unwrap().by, Some(8));
}

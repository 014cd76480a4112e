//! Retention behavior observed through the public API, using small caps so
//! eviction happens within a handful of events.

use floodwatch_core::{
    AlertSeverity, FloodMonitor, FloodType, MonitorConfig,
};

fn config(max_events: usize, max_alerts: usize) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.retention.max_events = max_events;
    config.retention.max_alerts = max_alerts;
    config
}

#[tokio::test]
async fn test_oldest_events_are_evicted_first() {
    let monitor = FloodMonitor::builder()
        .with_config(config(5, 1000))
        .build()
        .unwrap();

    let mut event_ids = Vec::new();
    for i in 0..8 {
        // Distinct sessions so no alerts fire
        let event = monitor
            .record_event(FloodType::FloodWait, &format!("s{i}"), 10, None, None)
            .unwrap();
        event_ids.push(event.event_id);
    }

    // Cumulative counters survive eviction
    let stats = monitor.stats();
    assert_eq!(stats.total_events, 8);
    assert_eq!(stats.total_wait_time, 80);

    // Only the newest five are retained
    assert_eq!(stats.events_last_hour, 5);
    for evicted in &event_ids[..3] {
        assert!(!monitor.resolve_event(*evicted));
    }
    for kept in &event_ids[3..] {
        assert!(monitor.resolve_event(*kept));
    }

    // Evicted events also leave the per-session indices
    assert_eq!(monitor.session_status("s0").recent_floods, 0);
    assert_eq!(monitor.session_status("s7").recent_floods, 1);
}

#[tokio::test]
async fn test_acknowledged_alerts_evicted_before_active() {
    let monitor = FloodMonitor::builder()
        .with_config(config(10_000, 10))
        .build()
        .unwrap();

    // Long waits make one alert per event
    let raise = |session: &str| {
        monitor
            .record_event(FloodType::FloodWait, session, 900, None, None)
            .unwrap();
    };

    raise("victim");
    let acked_id = monitor.active_alerts(None)[0].alert_id.clone();
    assert!(monitor.acknowledge_alert(&acked_id, Some(1)));

    // Push the store to the 90% cleanup mark; the acknowledged alert goes,
    // every active alert stays
    for i in 0..9 {
        raise(&format!("s{i}"));
    }

    assert_eq!(monitor.active_alerts(None).len(), 9);
    assert_eq!(monitor.stats().total_alerts, 10);
}

#[tokio::test]
async fn test_active_alerts_evicted_fifo_when_all_active() {
    let monitor = FloodMonitor::builder()
        .with_config(config(10_000, 5))
        .build()
        .unwrap();

    for i in 0..7 {
        monitor
            .record_event(FloodType::FloodWait, &format!("s{i}"), 900, None, None)
            .unwrap();
    }

    let active = monitor.active_alerts(Some(AlertSeverity::High));
    assert_eq!(active.len(), 5);
    // Newest first: the survivors are the alerts for s2..s6
    assert!(active[0].message.contains("s6"));
    assert!(active[4].message.contains("s2"));
    assert_eq!(monitor.stats().total_alerts, 7);
}

//! Tests for the reporting facade: per-session and per-task status, the
//! aggregate counters, and the text report, driven with a manual clock so
//! window expiry is deterministic.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use floodwatch_core::{
    Clock, FloodMonitor, FloodType, ManualClock, SessionHealth,
};

fn manual_monitor() -> (FloodMonitor, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    ));
    let monitor = FloodMonitor::builder()
        .with_clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build()
        .unwrap();
    (monitor, clock)
}

#[test]
fn test_session_status_tracks_window_not_lifetime() {
    let (monitor, clock) = manual_monitor();

    monitor
        .record_event(FloodType::FloodWait, "s1", 120, None, None)
        .unwrap();
    clock.advance(Duration::minutes(50));
    monitor
        .record_event(FloodType::FloodWait, "s1", 60, None, None)
        .unwrap();

    // Both events are inside the window at T+50
    let status = monitor.session_status("s1");
    assert_eq!(status.recent_floods, 2);
    assert_eq!(status.total_wait_seconds, 180);

    // At T+61 the first event has aged out; the second is still in
    clock.advance(Duration::minutes(11));
    let status = monitor.session_status("s1");
    assert_eq!(status.status, SessionHealth::Ok);
    assert_eq!(status.recent_floods, 1);
    assert_eq!(status.total_wait_seconds, 60);

    // last_flood survives window expiry entirely
    clock.advance(Duration::hours(5));
    let status = monitor.session_status("s1");
    assert_eq!(status.recent_floods, 0);
    assert_eq!(
        status.last_flood,
        Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 50, 0).unwrap())
    );
}

#[test]
fn test_unknown_session_and_task_are_quiet() {
    let (monitor, _clock) = manual_monitor();

    let status = monitor.session_status("never-seen");
    assert_eq!(status.status, SessionHealth::Ok);
    assert_eq!(status.recent_floods, 0);
    assert_eq!(status.last_flood, None);

    let task = monitor.task_status("never-seen");
    assert_eq!(task.recent_floods, 0);
    assert!(!task.should_pause);
}

#[test]
fn test_stats_serialize_for_api_export() {
    let (monitor, _clock) = manual_monitor();

    monitor
        .record_event(FloodType::UserBanned, "s1", 0, Some("t1"), Some(99))
        .unwrap();

    let json = serde_json::to_value(monitor.stats()).unwrap();
    assert_eq!(json["total_events"], 1);
    assert_eq!(json["events_last_hour"], 1);
    assert_eq!(json["active_alerts"], 0);

    let json = serde_json::to_value(monitor.session_status("s1")).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["recent_floods"], 1);
}

#[test]
fn test_report_orders_newest_first() {
    let (monitor, clock) = manual_monitor();

    // Warn on s1 first, long wait on s2 a minute later
    for _ in 0..3 {
        monitor
            .record_event(FloodType::FloodWait, "s1", 10, None, None)
            .unwrap();
    }
    clock.advance(Duration::minutes(1));
    monitor
        .record_event(FloodType::FloodWait, "s2", 900, None, None)
        .unwrap();

    let report = monitor.report();
    let wait_line = report.find("Long flood wait").unwrap();
    let warn_line = report.find("Session flood warning").unwrap();
    assert!(wait_line < warn_line, "newest alert should be listed first:\n{report}");
    assert!(report.contains("Active alerts: 2"));
}

#[test]
fn test_report_without_alerts_shows_counters_only() {
    let (monitor, _clock) = manual_monitor();

    monitor
        .record_event(FloodType::SessionExpired, "s1", 45, None, None)
        .unwrap();

    let report = monitor.report();
    assert!(report.contains("Events: 1 total, 1 in the last hour"));
    assert!(report.contains("Total wait: 45s (avg 45.0s)"));
    assert!(report.contains("Active alerts: 0"));
    assert!(!report.contains("⚠️"));
}

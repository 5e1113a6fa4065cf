//! Tests for observers and audit sinks

use std::sync::Arc;
use std::time::Duration;

use hvac_parking_lot::core::{
    build_audit_event, ChannelObserver, CompositeObserver, InMemoryAuditSink, ServiceAction,
    ServiceObserver, UsageLog,
};

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);

    sink.on_service_started(7, 2);
    sink.on_service_stopped(7);
    sink.on_wait_time_finalized(7, Duration::from_millis(1500));

    assert_eq!(
        sink.events_for(7),
        vec![
            ServiceAction::Started { speed: 2 },
            ServiceAction::Stopped,
            ServiceAction::WaitFinalized { waited_ms: 1500 },
        ]
    );
    assert!(sink.events_for(8).is_empty());
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(1, ServiceAction::Stopped));
    sink.record(build_audit_event(2, ServiceAction::Stopped));
    sink.record(build_audit_event(3, ServiceAction::Stopped));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].room, 2); // First one popped
    assert_eq!(events[1].room, 3);
}

#[test]
fn test_audit_event_serializes_tagged_action() {
    let event = build_audit_event(5, ServiceAction::Started { speed: 3 });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["room"], 5);
    assert_eq!(json["action"]["action"], "started");
    assert_eq!(json["action"]["speed"], 3);
}

#[test]
fn test_channel_observer_forwards() {
    let (tx, rx) = crossbeam_channel::bounded(4);
    let observer = ChannelObserver::new(tx);
    observer.on_service_started(9, 1);
    let event = rx.try_recv().unwrap();
    assert_eq!(event.room, 9);
    assert_eq!(event.action, ServiceAction::Started { speed: 1 });
}

#[test]
fn test_usage_log_lines() {
    let log = UsageLog::new();
    log.on_service_started(4, 3);
    log.on_service_stopped(4);

    let records = log.records_for(4);
    assert_eq!(records.len(), 2);
    assert!(records[0].to_line().starts_with("4 0 3 "));
    assert!(records[1].to_line().starts_with("4 3 0 "));
    assert_eq!(log.current_speed(4), 0);
}

#[test]
fn test_composite_reaches_every_observer() {
    let sink = Arc::new(InMemoryAuditSink::new(8));
    let log = Arc::new(UsageLog::new());
    let composite = CompositeObserver::new().with(sink.clone()).with(log.clone());

    composite.on_service_started(2, 2);
    composite.on_wait_time_finalized(2, Duration::from_secs(3));

    assert_eq!(sink.events().len(), 2);
    assert_eq!(log.current_speed(2), 2);
    assert_eq!(log.total_wait(2), Duration::from_secs(3));
}

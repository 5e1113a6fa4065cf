//! Tests for builder modules

use std::sync::Arc;

use hvac_parking_lot::builders::{build_in_memory_service, build_scheduler};
use hvac_parking_lot::config::SchedulerConfig;
use hvac_parking_lot::core::{InMemoryAuditSink, RecordStore, SchedulerError};
use hvac_parking_lot::infra::InMemoryRecordStore;
use hvac_parking_lot::util::clock::ManualClock;
use hvac_parking_lot::util::serde::RoomStatus;

#[test]
fn test_build_scheduler_uses_instance_count() {
    let cfg = SchedulerConfig::default().with_instance_count(4);
    let scheduler = build_scheduler(
        &cfg,
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(InMemoryAuditSink::new(8)),
        Arc::new(ManualClock::new()),
    )
    .unwrap();
    assert_eq!(scheduler.cluster().capacity(), 4);
    assert_eq!(scheduler.population(), 0);
}

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let cfg = SchedulerConfig::default().with_instance_count(0);
    let result = build_scheduler(
        &cfg,
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(InMemoryAuditSink::new(8)),
        Arc::new(ManualClock::new()),
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_in_memory_service_registers_rooms() {
    let cfg = SchedulerConfig::default().with_room_count(5);
    let (service, handles) = build_in_memory_service(cfg).unwrap();

    assert_eq!(handles.records.len(), 5);
    assert_eq!(handles.records.current(5).unwrap().status, RoomStatus::Off);
    assert!(handles.records.current(6).is_none());

    service.shutdown().unwrap();
}

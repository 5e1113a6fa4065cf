//! Tests for error types

use hvac_parking_lot::core::SchedulerError;
use hvac_parking_lot::runtime::api::{
    status_code, STATUS_INVALID_ARGUMENTS, STATUS_INVALID_ROOM, STATUS_UNAVAILABLE,
};

#[test]
fn test_invalid_priority_error() {
    let err = SchedulerError::InvalidPriority(4);
    assert_eq!(
        format!("{err}"),
        "invalid priority: target speed 4 is not one of 1, 2, 3"
    );
}

#[test]
fn test_not_found_error() {
    let err = SchedulerError::NotFound(12);
    assert_eq!(format!("{err}"), "room 12 not found");
}

#[test]
fn test_capacity_exceeded_error() {
    let err = SchedulerError::CapacityExceeded;
    assert_eq!(format!("{err}"), "capacity exceeded");
}

#[test]
fn test_backend_error() {
    let err = SchedulerError::Backend("thread gone".to_string());
    assert_eq!(format!("{err}"), "backend error: thread gone");
}

#[test]
fn test_legacy_status_codes() {
    assert_eq!(status_code(&SchedulerError::InvalidRoom(0)), STATUS_INVALID_ROOM);
    assert_eq!(
        status_code(&SchedulerError::InvalidPriority(9)),
        STATUS_INVALID_ARGUMENTS
    );
    assert_eq!(
        status_code(&SchedulerError::InvalidStatus("warm".into())),
        STATUS_INVALID_ARGUMENTS
    );
    assert_eq!(status_code(&SchedulerError::ShutDown), STATUS_UNAVAILABLE);
}

#[test]
fn test_error_converts_into_anyhow() {
    fn fails() -> hvac_parking_lot::core::AppResult<()> {
        Err(SchedulerError::ShutDown.into())
    }
    let err = fails().unwrap_err();
    assert_eq!(
        err.downcast_ref::<SchedulerError>(),
        Some(&SchedulerError::ShutDown)
    );
}

//! Tests for utility functions

use std::time::Duration;

use hvac_parking_lot::core::SchedulerError;
use hvac_parking_lot::util::clock::{now_ms, Clock, ManualClock};
use hvac_parking_lot::util::serde::{RoomStatus, Tier};

#[test]
fn test_now_ms() {
    let t1 = now_ms();
    std::thread::sleep(Duration::from_millis(10));
    let t2 = now_ms();
    assert!(t2 > t1);
}

#[test]
fn test_manual_clock() {
    let clock = ManualClock::new();
    let start = clock.now();
    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.now() - start, Duration::from_secs(90));
}

#[test]
fn test_tier_speed_mapping() {
    assert_eq!(Tier::from_speed(1), Ok(Tier::Low));
    assert_eq!(Tier::from_speed(3).map(Tier::speed), Ok(3));
    assert_eq!(Tier::from_speed(0), Err(SchedulerError::InvalidPriority(0)));
    assert!(Tier::High > Tier::Mid);
}

#[test]
fn test_room_status_parse() {
    assert_eq!("on".parse::<RoomStatus>(), Ok(RoomStatus::On));
    assert_eq!("poweroff".parse::<RoomStatus>(), Ok(RoomStatus::Off));
    assert_eq!("hibernate".parse::<RoomStatus>(), Ok(RoomStatus::Hibernate));
    assert!("standby".parse::<RoomStatus>().is_err());
    assert!(!RoomStatus::Hibernate.is_active());
}

#[test]
fn test_room_status_serde() {
    let json = serde_json::to_string(&RoomStatus::Hibernate).unwrap();
    let back: RoomStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, RoomStatus::Hibernate);
}

#[test]
fn test_init_tracing_is_repeatable() {
    hvac_parking_lot::util::telemetry::init_tracing();
    hvac_parking_lot::util::telemetry::init_tracing();
    tracing::info!("tracing initialised");
}

//! Tests for configuration validation

use hvac_parking_lot::config::SchedulerConfig;

#[test]
fn test_default_config_is_valid() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.instance_count, 3);
    assert_eq!(cfg.room_count, 200);
}

#[test]
fn test_config_invalid_instance_count() {
    let invalid = SchedulerConfig::default().with_instance_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_room_count() {
    let invalid = SchedulerConfig::default().with_room_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_audit_buffer() {
    let invalid = SchedulerConfig {
        audit_buffer: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_blank_thread_name() {
    let invalid = SchedulerConfig {
        thread_name: "  ".into(),
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_from_json_fills_defaults() {
    let cfg = SchedulerConfig::from_json_str(r#"{"instance_count": 5}"#).unwrap();
    assert_eq!(cfg.instance_count, 5);
    assert_eq!(cfg.room_count, 200);
    assert_eq!(cfg.thread_name, "hvac-scheduler");
}

#[test]
fn test_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{"instance_count": 0}"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_from_env_overrides_defaults() {
    std::env::set_var("HVAC_INSTANCE_COUNT", "5");
    std::env::set_var("HVAC_ROOM_COUNT", " 50 ");
    let cfg = SchedulerConfig::from_env().unwrap();
    assert_eq!(cfg.instance_count, 5);
    assert_eq!(cfg.room_count, 50);

    std::env::set_var("HVAC_INSTANCE_COUNT", "many");
    let err = SchedulerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("HVAC_INSTANCE_COUNT"));

    std::env::remove_var("HVAC_INSTANCE_COUNT");
    std::env::remove_var("HVAC_ROOM_COUNT");
}

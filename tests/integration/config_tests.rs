use std::fs;

use chrono::{NaiveDate, Weekday};
use scurve_core_lib::error::AppError;
use scurve_core_lib::models::config::{TimelineStep, ValueUnit};
use scurve_core_lib::models::schedule::MilestoneGate;
use scurve_core_lib::services::config_service::{self, ConfigFormat};
use tempfile::tempdir;

const YAML_CONFIG: &str = r#"
schedule:
  baseline: 2024-09-01
  milestones:
    - name: issued
      weight: 0.5
    - name: approved
      weight: 0.5
      offsetDays: 14
      gate: completionFlag
recoveryFactor: 0.5
excludedStatuses: [CANCELLED, SUPERSEDED]
valueUnit: percentage
timelineStep:
  kind: weekly
  anchor: Mon
extraSentinels: [TBD]
"#;

#[test]
fn yaml_file_loads_with_defaults_for_missing_fields() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("progress.yaml");
    fs::write(&path, YAML_CONFIG).expect("write config");

    let config = config_service::load_from_path(&path).expect("config");
    assert_eq!(
        config.schedule.baseline,
        NaiveDate::from_ymd_opt(2024, 9, 1).expect("date")
    );
    assert_eq!(config.schedule.names(), vec!["issued", "approved"]);
    assert_eq!(config.schedule.milestones[1].offset_days, 14);
    assert_eq!(
        config.schedule.milestones[1].gate,
        MilestoneGate::CompletionFlag
    );
    assert_eq!(config.recovery_factor, 0.5);
    assert_eq!(config.value_unit, ValueUnit::Percentage);
    assert_eq!(
        config.timeline_step,
        TimelineStep::Weekly {
            anchor: Weekday::Mon
        }
    );
    assert!(config.is_excluded_status(Some("SUPERSEDED")));
    assert_eq!(config.fallback_weight, 1.0);
    assert!(config.prefer_explicit_expected);
    assert_eq!(config.delay_threshold_days, 14);
}

#[test]
fn json_file_loads() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("progress.json");
    fs::write(
        &path,
        r#"{"fallbackWeight": 2.5, "timelineStep": {"kind": "days", "days": 14}}"#,
    )
    .expect("write config");

    let config = config_service::load_from_path(&path).expect("config");
    assert_eq!(config.fallback_weight, 2.5);
    assert_eq!(config.timeline_step.step_days(), 14);
    assert_eq!(config.schedule.len(), 3);
}

#[test]
fn zero_day_step_is_rejected() {
    let err = config_service::parse_str(
        "timelineStep:\n  kind: days\n  days: 0\n",
        ConfigFormat::Yaml,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
}

#[test]
fn malformed_yaml_surfaces_decode_error() {
    let err = config_service::parse_str("schedule: [unterminated", ConfigFormat::Yaml).unwrap_err();
    assert!(matches!(err, AppError::Yaml(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().expect("temp dir");
    let err = config_service::load_from_path(dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, AppError::Io(_)));
}

#[test]
fn empty_schedule_is_rejected() {
    let err = config_service::parse_str(
        r#"{"schedule": {"baseline": "2024-08-01", "milestones": []}}"#,
        ConfigFormat::Json,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
}

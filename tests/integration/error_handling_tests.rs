// Fatal and recoverable data conditions

use chrono::NaiveDate;
use scurve_core_lib::commands::CommandError;
use scurve_core_lib::error::AppError;
use scurve_core_lib::models::config::ProgressConfig;
use scurve_core_lib::models::register::RegisterRow;
use scurve_core_lib::models::schedule::Perspective;
use scurve_core_lib::services::progress_service::ProgressService;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn service() -> ProgressService {
    ProgressService::new(ProgressConfig::default()).expect("service")
}

#[test]
fn empty_register_is_no_data() {
    let err = service().compute(&[], ymd(2024, 8, 20)).unwrap_err();
    assert!(matches!(err, AppError::NoData { .. }));
    assert!(err.is_fatal_data_condition());
}

#[test]
fn fully_excluded_register_is_no_data() {
    let config = ProgressConfig {
        excluded_statuses: vec!["VOID".to_string()],
        ..ProgressConfig::default()
    };
    let rows = vec![
        RegisterRow::new("1", "Civil").with_status("VOID"),
        RegisterRow::new("2", "Civil").with_status(" VOID "),
    ];
    let err = ProgressService::new(config)
        .expect("service")
        .compute(&rows, ymd(2024, 8, 20))
        .unwrap_err();
    match err {
        AppError::NoData { reason } => assert!(reason.contains("excluded")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn register_without_any_valid_date_is_no_timeline() {
    let rows = vec![RegisterRow::new("1", "Civil")
        .with_offset(1.0e12)
        .with_actual("issued", "########")
        .with_actual("reviewed", "not a date")];
    let err = service().compute(&rows, ymd(2024, 8, 20)).unwrap_err();
    assert!(matches!(err, AppError::NoTimeline { .. }));

    let command_error = CommandError::from(err);
    assert_eq!(command_error.code, "NO_TIMELINE");
}

#[test]
fn unparseable_dates_never_abort_the_run() {
    let rows = vec![
        RegisterRow::new("1", "Civil")
            .with_weight(10.0)
            .with_actual("issued", "32/13/2024")
            .with_expected("reviewed", "tomorrow"),
        RegisterRow::new("2", "Civil")
            .with_weight(10.0)
            .with_actual("issued", "2024-08-05"),
    ];
    let report = service()
        .compute(&rows, ymd(2024, 8, 20))
        .expect("report despite bad dates");

    assert_eq!(report.diagnostics.unparsed_count(), 2);
    assert_eq!(report.diagnostics.unparsed_by_field["actual.issued"], 1);
    assert_eq!(report.diagnostics.unparsed_by_field["expected.reviewed"], 1);
    assert!((report.summary.actual_today - 4.0).abs() < 1e-9);
}

#[test]
fn history_after_today_collapses_actual_timeline() {
    let rows = vec![RegisterRow::new("1", "Civil")
        .with_weight(10.0)
        .with_actual("issued", "2024-09-10")];
    let report = service()
        .compute(&rows, ymd(2024, 8, 20))
        .expect("report");

    assert!(report
        .diagnostics
        .degenerate_timelines
        .contains(&Perspective::Actual));
    assert_eq!(report.actual.points.len(), 1);
    assert_eq!(report.actual.points[0].date, ymd(2024, 8, 20));
    assert_eq!(report.actual.points[0].value, 0.0);
}

#[test]
fn invalid_configuration_is_rejected_before_computing() {
    let config = ProgressConfig {
        fallback_weight: -1.0,
        ..ProgressConfig::default()
    };
    let err = ProgressService::new(config).unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
    assert_eq!(CommandError::from(err).code, "CONFIG_ERROR");
}

#[test]
fn mistyped_offset_does_not_stretch_the_planned_horizon() {
    let rows = vec![
        RegisterRow::new("1", "Civil")
            .with_weight(10.0)
            .with_offset(90_000_000.0),
        RegisterRow::new("2", "Civil").with_weight(10.0).with_offset(0.0),
    ];
    let report = service()
        .compute(&rows, ymd(2024, 8, 25))
        .expect("report");

    assert_eq!(report.summary.expected_end_date, ymd(2024, 8, 16));
    assert!(report.expected.points.len() <= 4);
    assert_eq!(report.expected.breakdown.len(), report.expected.points.len());
    assert!(report
        .diagnostics
        .schedule_warnings
        .iter()
        .any(|warning| warning.contains("item 1")));
    assert_eq!(report.items[0].expected_dates, vec![None, None, None]);
}

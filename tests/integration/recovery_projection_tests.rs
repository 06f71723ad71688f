use chrono::NaiveDate;
use scurve_core_lib::models::config::{ProgressConfig, TimelineStep};
use scurve_core_lib::models::curve::{CurvePoint, ProgressCurve};
use scurve_core_lib::models::register::RegisterRow;
use scurve_core_lib::models::schedule::Perspective;
use scurve_core_lib::services::progress_service::ProgressService;
use scurve_core_lib::services::recovery_projector::RecoveryProjector;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn curve(perspective: Perspective, points: &[(NaiveDate, f64)]) -> ProgressCurve {
    ProgressCurve {
        perspective,
        horizon: points.last().expect("point").0,
        points: points
            .iter()
            .map(|(date, value)| CurvePoint::new(*date, *value))
            .collect(),
        last_progress_at: None,
        milestones: Vec::new(),
        breakdown: Vec::new(),
    }
}

#[test]
fn ahead_of_schedule_register_has_no_projection() {
    let rows = vec![RegisterRow::new("A", "Civil")
        .with_weight(10.0)
        .with_flag(true)
        .with_actual("issued", "2024-07-20")
        .with_actual("reviewed", "2024-07-25")
        .with_actual("replied", "2024-07-28")];

    let service = ProgressService::new(ProgressConfig::default()).expect("service");
    let report = service.compute(&rows, ymd(2024, 8, 20)).expect("report");

    assert!(report.projected.is_none());
    assert_eq!(report.summary.recovery_end_date, None);
    assert!(report.summary.delay_today <= 0.0);
}

#[test]
fn projection_converges_for_a_range_of_factors() {
    let actual = curve(
        Perspective::Actual,
        &[(ymd(2024, 1, 7), 5.0), (ymd(2024, 6, 2), 20.0)],
    );
    let expected = curve(
        Perspective::Expected,
        &[(ymd(2024, 1, 7), 10.0), (ymd(2024, 12, 29), 120.0)],
    );

    for factor in [0.0, 0.25, 0.5, 0.75, 1.0, 2.0] {
        let projector = RecoveryProjector::new(factor, 7, 520);
        let projection = projector
            .project(&actual, &expected, ymd(2024, 6, 2), ymd(2024, 1, 1))
            .expect("projection");

        let last = projection.points.last().expect("point");
        assert!((last.value - 120.0).abs() < 1e-9, "factor {factor}");
        assert!(projection.converged);
        let point_limit = projection.duration_steps.floor() as usize + 2;
        assert!(projection.points.len() <= point_limit, "factor {factor}");
        assert_eq!(projection.recovery_end_date, last.date);
        assert!(projection
            .points
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date && pair[0].value <= pair[1].value));
    }
}

#[test]
fn larger_factor_lengthens_recovery() {
    let actual = curve(Perspective::Actual, &[(ymd(2024, 6, 2), 20.0)]);
    let expected = curve(
        Perspective::Expected,
        &[(ymd(2024, 1, 7), 10.0), (ymd(2024, 12, 29), 120.0)],
    );

    let fast = RecoveryProjector::new(0.25, 7, 520)
        .project(&actual, &expected, ymd(2024, 6, 2), ymd(2024, 1, 1))
        .expect("projection");
    let slow = RecoveryProjector::new(1.0, 7, 520)
        .project(&actual, &expected, ymd(2024, 6, 2), ymd(2024, 1, 1))
        .expect("projection");

    assert!(fast.recovery_end_date < slow.recovery_end_date);
    assert!(fast.slope_per_step > slow.slope_per_step);
}

#[test]
fn day_step_configuration_drives_projection_stride() {
    let config = ProgressConfig {
        timeline_step: TimelineStep::Days { days: 1 },
        ..ProgressConfig::default()
    };
    let projector = RecoveryProjector::from_config(&config);
    let actual = curve(Perspective::Actual, &[(ymd(2024, 8, 1), 0.0)]);
    let expected = curve(
        Perspective::Expected,
        &[(ymd(2024, 8, 1), 0.0), (ymd(2024, 8, 21), 10.0)],
    );

    let projection = projector
        .project(&actual, &expected, ymd(2024, 8, 1), ymd(2024, 8, 1))
        .expect("projection");

    // 20 days * 100% delay * 0.75 => 15 daily steps.
    assert!((projection.duration_steps - 15.0).abs() < 1e-9);
    assert_eq!(projection.points[1].date, ymd(2024, 8, 2));
    assert!(projection.converged);
    assert!(projection.recovery_end_date <= ymd(2024, 8, 17));
}

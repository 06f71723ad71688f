use chrono::NaiveDate;
use scurve_core_lib::models::config::ProgressConfig;
use scurve_core_lib::models::register::{RawCell, RegisterRow};
use scurve_core_lib::services::date_normalizer::{DateNormalizer, DateOutcome, EXPLICIT_FORMATS};
use scurve_core_lib::services::progress_service::ProgressService;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Samples avoid day/month pairs that read differently in either order.
fn samples() -> Vec<NaiveDate> {
    vec![
        ymd(2024, 2, 29),
        ymd(2023, 12, 31),
        ymd(2024, 1, 1),
        ymd(2000, 3, 15),
        ymd(2031, 10, 28),
    ]
}

#[test]
fn every_explicit_format_round_trips() {
    let normalizer = DateNormalizer::default();
    for format in EXPLICIT_FORMATS {
        for date in samples() {
            let rendered = date.format(format).to_string();
            assert_eq!(
                normalizer.normalize(&RawCell::text(rendered.clone())),
                Some(date),
                "format {format} rendered {rendered}"
            );
        }
    }
}

#[test]
fn upper_and_lower_case_month_names_round_trip() {
    let normalizer = DateNormalizer::default();
    for date in samples() {
        for format in ["%d-%b-%y", "%d %B %Y", "%b %d, %Y"] {
            let rendered = date.format(format).to_string();
            assert_eq!(
                normalizer.normalize(&RawCell::text(rendered.to_uppercase())),
                Some(date)
            );
            assert_eq!(
                normalizer.normalize(&RawCell::text(rendered.to_lowercase())),
                Some(date)
            );
        }
    }
}

#[test]
fn sentinel_column_normalizes_in_order() {
    let normalizer = DateNormalizer::default();
    let column: Vec<RawCell> = ["0-Jan-00", "########", "", "15-Mar-24"]
        .into_iter()
        .map(RawCell::from)
        .collect();
    assert_eq!(
        normalizer.normalize_all(&column),
        vec![None, None, None, Some(ymd(2024, 3, 15))]
    );
}

#[test]
fn normalization_is_deterministic_across_rows() {
    let normalizer = DateNormalizer::default();
    let raw = RawCell::text("01/02/2025");
    let results: Vec<Option<NaiveDate>> = (0..20).map(|_| normalizer.normalize(&raw)).collect();
    assert!(results.iter().all(|value| *value == Some(ymd(2025, 2, 1))));
}

#[test]
fn impossible_calendar_dates_are_unparseable() {
    let normalizer = DateNormalizer::default();
    for raw in ["29/02/2023", "31-Apr-24", "2023-02-30", "00/00/0000"] {
        assert_eq!(
            normalizer.classify(&RawCell::text(raw)),
            DateOutcome::Unparseable,
            "value {raw}"
        );
    }
}

#[test]
fn text_years_outside_plausible_window_are_rejected() {
    let normalizer = DateNormalizer::default();
    assert_eq!(
        normalizer.classify(&RawCell::text("0024-03-15")),
        DateOutcome::Unparseable
    );
    assert_eq!(
        normalizer.classify(&RawCell::text("15/03/2500")),
        DateOutcome::Unparseable
    );
}

#[test]
fn actual_and_expected_fields_share_rules() {
    let raws = ["15-Mar-24", "15/03/2024", "2024-03-15", "March 15, 2024"];
    let rows: Vec<RegisterRow> = raws
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            RegisterRow::new(format!("{index}"), "Civil")
                .with_actual("issued", *raw)
                .with_expected("issued", *raw)
        })
        .collect();

    let service = ProgressService::new(ProgressConfig::default()).expect("service");
    let report = service.compute(&rows, ymd(2024, 4, 1)).expect("report");

    assert_eq!(report.diagnostics.unparsed_count(), 0);
    for item in &report.items {
        assert_eq!(item.expected_dates[0], Some(ymd(2024, 3, 15)));
    }
    assert_eq!(report.summary.items_started, raws.len());
    assert!(report.delays.is_empty());
}

#[test]
fn mixed_missing_and_present_fields_compare_cleanly() {
    let normalizer = DateNormalizer::default();
    let cells = [
        RawCell::Missing,
        RawCell::text("NaT"),
        RawCell::Number(45366.0),
        RawCell::Date(ymd(2024, 3, 16)),
        RawCell::text("garbage"),
    ];
    let values: Vec<Option<NaiveDate>> = normalizer.normalize_all(&cells);
    for left in &values {
        for right in &values {
            let _ = left <= right;
        }
    }
    assert_eq!(values[2], Some(ymd(2024, 3, 15)));
    assert!(values[2] < values[3]);
    assert_eq!(values[4], None);
}

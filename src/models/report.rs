use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::config::ValueUnit;
use super::curve::{ProgressCurve, RecoveryProjection};
use super::schedule::Perspective;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total_weight: f64,
    pub actual_today: f64,
    pub expected_today: f64,
    pub final_actual: f64,
    pub final_expected: f64,
    pub delay_today: f64,
    /// Delay relative to the expected final value, always in percent.
    pub delay_percentage: f64,
    /// Actual progress today relative to the total weight, always in percent.
    pub actual_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_end_date: Option<NaiveDate>,
    pub start_date: NaiveDate,
    pub expected_end_date: NaiveDate,
    pub items_total: usize,
    pub items_started: usize,
    pub items_finalized: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupProgress {
    pub group_key: String,
    pub item_count: usize,
    pub finalized_count: usize,
    pub actual_at_end: f64,
    pub expected_at_end: f64,
    pub actual_today: f64,
    pub expected_today: f64,
    pub delay_percentage_today: f64,
    /// Items with a recorded actual date, per milestone name.
    pub milestone_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(tag = "kind", content = "milestone", rename_all = "camelCase")]
pub enum ItemStage {
    NotStarted,
    Reached(usize),
    Finalized,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: String,
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DelayEntry {
    pub id: String,
    pub group_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub milestone: String,
    pub expected: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<NaiveDate>,
    pub delay_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Derived per-item figures, kept apart from the canonical item dates.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemProgress {
    pub id: String,
    pub group_key: String,
    pub expected_dates: Vec<Option<NaiveDate>>,
    pub actual_today: f64,
    pub expected_today: f64,
    pub actual_at_end: f64,
    pub expected_at_end: f64,
    pub stage: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateDiagnostic {
    pub row_id: String,
    pub field: String,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDiagnostics {
    pub unparsed_dates: Vec<DateDiagnostic>,
    pub unparsed_by_field: BTreeMap<String, usize>,
    pub excluded_rows: usize,
    pub weight_fallbacks: usize,
    pub negative_weights: usize,
    pub unknown_milestones: Vec<String>,
    pub schedule_warnings: Vec<String>,
    pub degenerate_timelines: Vec<Perspective>,
}

impl ProgressDiagnostics {
    pub fn record_unparsed(
        &mut self,
        row_id: impl Into<String>,
        field: impl Into<String>,
        raw: impl Into<String>,
    ) {
        let field = field.into();
        *self.unparsed_by_field.entry(field.clone()).or_insert(0) += 1;
        self.unparsed_dates.push(DateDiagnostic {
            row_id: row_id.into(),
            field,
            raw: raw.into(),
        });
    }

    pub fn unparsed_count(&self) -> usize {
        self.unparsed_dates.len()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub today: NaiveDate,
    pub value_unit: ValueUnit,
    pub actual: ProgressCurve,
    pub expected: ProgressCurve,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected: Option<RecoveryProjection>,
    pub summary: ProgressSummary,
    pub groups: Vec<GroupProgress>,
    pub stages: Vec<StageCount>,
    pub delays: Vec<DelayEntry>,
    pub items: Vec<ItemProgress>,
    pub diagnostics: ProgressDiagnostics,
}

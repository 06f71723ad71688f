use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::config::{ProgressConfig, ValueUnit};
use crate::models::curve::{ProgressCurve, RecoveryProjection};
use crate::models::register::{RawCell, RegisterRow, WorkItem};
use crate::models::report::{
    GroupProgress, ItemProgress, ProgressDiagnostics, ProgressReport, ProgressSummary,
};
use crate::models::schedule::Perspective;
use crate::services::breakdown_service::BreakdownService;
use crate::services::config_service;
use crate::services::cumulative_aggregator::CumulativeAggregator;
use crate::services::date_normalizer::{DateNormalizer, DateOutcome};
use crate::services::recovery_projector::RecoveryProjector;
use crate::services::schedule_deriver::ScheduleDeriver;
use crate::services::timeline_builder::{Timeline, TimelineBuilder};
use crate::utils::numeric::{percent_of, percentage_factor};

/// Runs one register snapshot through the whole pipeline.
///
/// Holds only configuration; every call to [`ProgressService::compute`]
/// starts from the raw rows again.
#[derive(Debug, Clone)]
pub struct ProgressService {
    config: ProgressConfig,
    normalizer: DateNormalizer,
    config_warnings: Vec<String>,
}

impl ProgressService {
    pub fn new(config: ProgressConfig) -> AppResult<Self> {
        let config_warnings = config_service::validate(&config)?;
        for warning in &config_warnings {
            warn!(target: "app::config", %warning, "configuration warning");
        }
        let normalizer = DateNormalizer::new(&config.extra_sentinels);
        Ok(Self {
            config,
            normalizer,
            config_warnings,
        })
    }

    pub fn compute(&self, rows: &[RegisterRow], today: NaiveDate) -> AppResult<ProgressReport> {
        if rows.is_empty() {
            return Err(AppError::no_data("register has no rows"));
        }

        let mut diagnostics = ProgressDiagnostics {
            schedule_warnings: self.config_warnings.clone(),
            ..ProgressDiagnostics::default()
        };

        let kept: Vec<&RegisterRow> = rows
            .iter()
            .filter(|row| !self.config.is_excluded_status(row.status.as_deref()))
            .collect();
        diagnostics.excluded_rows = rows.len() - kept.len();
        if kept.is_empty() {
            return Err(AppError::no_data(format!(
                "all {} rows excluded by status",
                rows.len()
            )));
        }

        let mut unknown_milestones = BTreeSet::new();
        let mut items: Vec<WorkItem> = kept
            .iter()
            .map(|row| self.normalize_row(row, &mut diagnostics, &mut unknown_milestones))
            .collect();
        diagnostics.unknown_milestones = unknown_milestones.into_iter().collect();
        for (field, count) in &diagnostics.unparsed_by_field {
            warn!(target: "app::dates", %field, count, "unparseable dates treated as missing");
        }

        let schedule = &self.config.schedule;
        let deriver = ScheduleDeriver::new(schedule, self.config.prefer_explicit_expected);
        for item in &mut items {
            let derived = deriver.derive_expected(item);
            item.expected = derived.dates;
            diagnostics.schedule_warnings.extend(derived.warnings);
        }

        let actual_start = earliest(&items, Perspective::Actual);
        let expected_start = earliest(&items, Perspective::Expected);
        let start_date = match (actual_start, expected_start) {
            (Some(actual), Some(expected)) => actual.min(expected),
            (Some(date), None) | (None, Some(date)) => date,
            (None, None) => {
                return Err(AppError::no_timeline(
                    "no valid actual or expected dates in the register",
                ))
            }
        };
        let expected_horizon = planned_completion(&items, schedule.len()).unwrap_or(today);

        let builder = TimelineBuilder::new(self.config.timeline_step);
        let actual_timeline = match actual_start {
            Some(start) => builder.build(start, today),
            None => Timeline::single(today),
        };
        let expected_timeline = match expected_start {
            Some(start) => builder.build(start, expected_horizon),
            None => Timeline::single(expected_horizon),
        };
        if actual_timeline.degenerate {
            diagnostics.degenerate_timelines.push(Perspective::Actual);
        }
        if expected_timeline.degenerate {
            diagnostics.degenerate_timelines.push(Perspective::Expected);
        }

        let aggregator = CumulativeAggregator::new(schedule);
        let mut actual = aggregator.aggregate(&items, &actual_timeline, today, Perspective::Actual);
        let mut expected = aggregator.aggregate(
            &items,
            &expected_timeline,
            expected_horizon,
            Perspective::Expected,
        );

        let projector = RecoveryProjector::from_config(&self.config);
        let mut projected = projector.project(&actual, &expected, today, start_date);

        let breakdown = BreakdownService::new(schedule);
        let end = today.max(expected_horizon);
        let mut groups = breakdown.group_progress(&items, today, end);
        let mut item_progress = breakdown.item_progress(&items, today, end);
        let stages = breakdown.stage_counts(&items);
        let delays = breakdown.delays(
            &items,
            today,
            self.config.delay_threshold_days,
            self.config.include_completed_in_delays,
        );

        let total_weight: f64 = items.iter().map(|item| item.weight).sum();
        let actual_today = actual.value_at(today);
        let expected_today = expected.value_at(today);
        let final_expected = expected.last_value();
        let delay_today = expected_today - actual_today;
        let mut summary = ProgressSummary {
            total_weight,
            actual_today,
            expected_today,
            final_actual: actual.last_value(),
            final_expected,
            delay_today,
            delay_percentage: percent_of(delay_today, final_expected),
            actual_percentage: percent_of(actual_today, total_weight),
            recovery_end_date: projected.as_ref().map(|p| p.recovery_end_date),
            start_date,
            expected_end_date: expected_horizon,
            items_total: items.len(),
            items_started: breakdown.started_count(&items, today),
            items_finalized: breakdown.finalized_count(&items),
        };

        if self.config.value_unit == ValueUnit::Percentage {
            let factor = percentage_factor(total_weight);
            apply_percentage(
                factor,
                &mut actual,
                &mut expected,
                projected.as_mut(),
                &mut summary,
                &mut groups,
                &mut item_progress,
            );
        }

        info!(
            target: "app::progress",
            rows = rows.len(),
            items = items.len(),
            excluded = diagnostics.excluded_rows,
            unparsed = diagnostics.unparsed_count(),
            actual_today = summary.actual_today,
            expected_today = summary.expected_today,
            projected = projected.is_some(),
            "progress computed"
        );

        Ok(ProgressReport {
            today,
            value_unit: self.config.value_unit,
            actual,
            expected,
            projected,
            summary,
            groups,
            stages,
            delays,
            items: item_progress,
            diagnostics,
        })
    }

    fn normalize_row(
        &self,
        row: &RegisterRow,
        diagnostics: &mut ProgressDiagnostics,
        unknown_milestones: &mut BTreeSet<String>,
    ) -> WorkItem {
        let mut item = WorkItem::new(row.id.clone(), row.group_key.clone(), self.config.schedule.len());
        item.title = row.title.clone();
        item.status = row.status.clone();
        item.weight = self.resolve_weight(row, diagnostics);
        item.schedule_offset_days = resolve_offset(row, diagnostics);
        item.completion_gate = row.completion_flag.as_flag();
        item.actual = self.normalize_dates(
            &row.id,
            &row.actual_dates,
            Perspective::Actual,
            diagnostics,
            unknown_milestones,
        );
        item.expected = self.normalize_dates(
            &row.id,
            &row.expected_dates,
            Perspective::Expected,
            diagnostics,
            unknown_milestones,
        );
        item
    }

    fn resolve_weight(&self, row: &RegisterRow, diagnostics: &mut ProgressDiagnostics) -> f64 {
        match row.weight.as_number() {
            Some(weight) if weight < 0.0 => {
                warn!(target: "app::progress", row_id = %row.id, weight, "negative weight clamped to zero");
                diagnostics.negative_weights += 1;
                0.0
            }
            Some(weight) => weight,
            None => {
                debug!(target: "app::progress", row_id = %row.id, raw = %row.weight, "weight fallback applied");
                diagnostics.weight_fallbacks += 1;
                self.config.fallback_weight
            }
        }
    }

    fn normalize_dates(
        &self,
        row_id: &str,
        cells: &BTreeMap<String, RawCell>,
        perspective: Perspective,
        diagnostics: &mut ProgressDiagnostics,
        unknown_milestones: &mut BTreeSet<String>,
    ) -> Vec<Option<NaiveDate>> {
        let schedule = &self.config.schedule;
        let mut dates = vec![None; schedule.len()];
        for (name, cell) in cells {
            let Some(index) = schedule.index_of(name) else {
                unknown_milestones.insert(name.clone());
                continue;
            };
            match self.normalizer.classify(cell) {
                DateOutcome::Parsed(date) => dates[index] = Some(date),
                DateOutcome::Missing => {}
                DateOutcome::Unparseable => diagnostics.record_unparsed(
                    row_id,
                    format!("{}.{}", perspective, schedule.milestones[index].name),
                    cell.to_string(),
                ),
            }
        }
        dates
    }
}

fn resolve_offset(row: &RegisterRow, diagnostics: &mut ProgressDiagnostics) -> Option<i64> {
    if row.schedule_offset.is_missing() {
        return None;
    }
    match row.schedule_offset.as_number() {
        Some(days) => Some(days.round() as i64),
        None => {
            if !row.schedule_offset.to_string().trim().is_empty() {
                diagnostics.schedule_warnings.push(format!(
                    "item {}: schedule offset '{}' is not numeric",
                    row.id, row.schedule_offset
                ));
            }
            None
        }
    }
}

fn earliest(items: &[WorkItem], perspective: Perspective) -> Option<NaiveDate> {
    items.iter().flat_map(|item| item.dates(perspective)).min()
}

/// Latest planned date of the final milestone, else the latest planned date
/// of any milestone.
fn planned_completion(items: &[WorkItem], milestones: usize) -> Option<NaiveDate> {
    let last_index = milestones.checked_sub(1)?;
    items
        .iter()
        .filter_map(|item| item.date(Perspective::Expected, last_index))
        .max()
        .or_else(|| {
            items
                .iter()
                .flat_map(|item| item.dates(Perspective::Expected))
                .max()
        })
}

fn apply_percentage(
    factor: f64,
    actual: &mut ProgressCurve,
    expected: &mut ProgressCurve,
    projected: Option<&mut RecoveryProjection>,
    summary: &mut ProgressSummary,
    groups: &mut [GroupProgress],
    items: &mut [ItemProgress],
) {
    actual.scale(factor);
    expected.scale(factor);
    if let Some(projection) = projected {
        projection.scale(factor);
    }

    summary.actual_today *= factor;
    summary.expected_today *= factor;
    summary.final_actual *= factor;
    summary.final_expected *= factor;
    summary.delay_today *= factor;

    for group in groups {
        group.actual_at_end *= factor;
        group.expected_at_end *= factor;
        group.actual_today *= factor;
        group.expected_today *= factor;
    }
    for item in items {
        item.actual_today *= factor;
        item.expected_today *= factor;
        item.actual_at_end *= factor;
        item.expected_at_end *= factor;
    }
}

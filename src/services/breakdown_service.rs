use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::register::WorkItem;
use crate::models::report::{DelayEntry, GroupProgress, ItemProgress, ItemStage, StageCount};
use crate::models::schedule::{MilestoneSchedule, Perspective};
use crate::services::weight_model::MilestoneWeightModel;
use crate::utils::numeric::percent_of;

const STAGE_NOT_STARTED: &str = "not_started";
const STAGE_FINALIZED: &str = "finalized";
const STATUS_UNSPECIFIED: &str = "unspecified";

/// Per-item, per-group and per-stage views derived from canonical items.
/// Nothing here writes back into the items.
#[derive(Debug, Clone, Copy)]
pub struct BreakdownService<'a> {
    schedule: &'a MilestoneSchedule,
    model: MilestoneWeightModel<'a>,
}

impl<'a> BreakdownService<'a> {
    pub fn new(schedule: &'a MilestoneSchedule) -> Self {
        Self {
            schedule,
            model: MilestoneWeightModel::new(schedule),
        }
    }

    /// Furthest run of recorded actual milestones, counted from the first.
    pub fn item_stage(&self, item: &WorkItem) -> ItemStage {
        let recorded = (0..self.schedule.len())
            .take_while(|index| item.date(Perspective::Actual, *index).is_some())
            .count();

        if recorded == 0 {
            return ItemStage::NotStarted;
        }

        let every_gate_admits = self
            .schedule
            .milestones
            .iter()
            .all(|milestone| milestone.gate.admits(item, Perspective::Actual));
        if recorded == self.schedule.len() && every_gate_admits {
            ItemStage::Finalized
        } else {
            ItemStage::Reached(recorded - 1)
        }
    }

    pub fn stage_label(&self, stage: ItemStage) -> String {
        match stage {
            ItemStage::NotStarted => STAGE_NOT_STARTED.to_string(),
            ItemStage::Reached(index) => self
                .schedule
                .milestones
                .get(index)
                .map(|milestone| milestone.name.clone())
                .unwrap_or_else(|| STAGE_NOT_STARTED.to_string()),
            ItemStage::Finalized => STAGE_FINALIZED.to_string(),
        }
    }

    pub fn item_progress(
        &self,
        items: &[WorkItem],
        today: NaiveDate,
        end: NaiveDate,
    ) -> Vec<ItemProgress> {
        items
            .iter()
            .map(|item| ItemProgress {
                id: item.id.clone(),
                group_key: item.group_key.clone(),
                expected_dates: item.expected.clone(),
                actual_today: self.model.weighted_contribution(item, today, Perspective::Actual),
                expected_today: self
                    .model
                    .weighted_contribution(item, today, Perspective::Expected),
                actual_at_end: self.model.weighted_contribution(item, end, Perspective::Actual),
                expected_at_end: self
                    .model
                    .weighted_contribution(item, end, Perspective::Expected),
                stage: self.stage_label(self.item_stage(item)),
            })
            .collect()
    }

    /// Groups ordered by key.
    pub fn group_progress(
        &self,
        items: &[WorkItem],
        today: NaiveDate,
        end: NaiveDate,
    ) -> Vec<GroupProgress> {
        let mut groups: BTreeMap<&str, GroupProgress> = BTreeMap::new();

        for item in items {
            let group = groups
                .entry(item.group_key.as_str())
                .or_insert_with(|| GroupProgress {
                    group_key: item.group_key.clone(),
                    item_count: 0,
                    finalized_count: 0,
                    actual_at_end: 0.0,
                    expected_at_end: 0.0,
                    actual_today: 0.0,
                    expected_today: 0.0,
                    delay_percentage_today: 0.0,
                    milestone_counts: self
                        .schedule
                        .milestones
                        .iter()
                        .map(|milestone| (milestone.name.clone(), 0))
                        .collect(),
                });

            group.item_count += 1;
            if self.item_stage(item) == ItemStage::Finalized {
                group.finalized_count += 1;
            }
            group.actual_at_end += self.model.weighted_contribution(item, end, Perspective::Actual);
            group.expected_at_end +=
                self.model
                    .weighted_contribution(item, end, Perspective::Expected);
            group.actual_today += self
                .model
                .weighted_contribution(item, today, Perspective::Actual);
            group.expected_today +=
                self.model
                    .weighted_contribution(item, today, Perspective::Expected);

            for (index, milestone) in self.schedule.milestones.iter().enumerate() {
                if item.date(Perspective::Actual, index).is_some() {
                    if let Some(count) = group.milestone_counts.get_mut(&milestone.name) {
                        *count += 1;
                    }
                }
            }
        }

        groups
            .into_values()
            .map(|mut group| {
                group.delay_percentage_today =
                    percent_of(group.expected_today - group.actual_today, group.expected_today);
                group
            })
            .collect()
    }

    /// Item counts per stage and status, stages in lifecycle order.
    pub fn stage_counts(&self, items: &[WorkItem]) -> Vec<StageCount> {
        let mut counts: BTreeMap<(ItemStage, String), usize> = BTreeMap::new();
        for item in items {
            let status = item
                .status
                .as_deref()
                .map(str::trim)
                .filter(|status| !status.is_empty())
                .unwrap_or(STATUS_UNSPECIFIED)
                .to_string();
            *counts.entry((self.item_stage(item), status)).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|((stage, status), count)| StageCount {
                stage: self.stage_label(stage),
                status,
                count,
            })
            .collect()
    }

    /// Items whose first milestone lags its planned date by at least
    /// `threshold_days`. Unreached milestones are measured against `today`.
    pub fn delays(
        &self,
        items: &[WorkItem],
        today: NaiveDate,
        threshold_days: i64,
        include_completed: bool,
    ) -> Vec<DelayEntry> {
        let Some(first) = self.schedule.milestones.first() else {
            return Vec::new();
        };

        items
            .iter()
            .filter(|item| include_completed || !item.completion_gate)
            .filter_map(|item| {
                let expected = item.date(Perspective::Expected, 0)?;
                let actual = item.date(Perspective::Actual, 0);
                let delay_days = (actual.unwrap_or(today) - expected).num_days();
                (delay_days >= threshold_days).then(|| DelayEntry {
                    id: item.id.clone(),
                    group_key: item.group_key.clone(),
                    title: item.title.clone(),
                    milestone: first.name.clone(),
                    expected,
                    actual,
                    delay_days,
                    status: item.status.clone(),
                })
            })
            .collect()
    }

    /// Items whose first milestone has an actual date on or before `today`.
    pub fn started_count(&self, items: &[WorkItem], today: NaiveDate) -> usize {
        items
            .iter()
            .filter(|item| {
                item.date(Perspective::Actual, 0)
                    .is_some_and(|date| date <= today)
            })
            .count()
    }

    pub fn finalized_count(&self, items: &[WorkItem]) -> usize {
        items
            .iter()
            .filter(|item| self.item_stage(item) == ItemStage::Finalized)
            .count()
    }
}

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::schedule::MilestoneSchedule;

pub const DEFAULT_FALLBACK_WEIGHT: f64 = 1.0;
pub const DEFAULT_RECOVERY_FACTOR: f64 = 0.75;
pub const DEFAULT_DELAY_THRESHOLD_DAYS: i64 = 14;
pub const DEFAULT_MAX_PROJECTION_STEPS: usize = 520;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueUnit {
    #[default]
    Raw,
    Percentage,
}

impl ValueUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueUnit::Raw => "raw",
            ValueUnit::Percentage => "percentage",
        }
    }
}

/// Spacing of the evaluation grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimelineStep {
    /// One point per week, on the anchor weekday.
    Weekly {
        #[serde(default = "default_anchor")]
        anchor: Weekday,
    },
    /// One point every `days` days starting at the timeline start.
    Days { days: u32 },
}

fn default_anchor() -> Weekday {
    Weekday::Sun
}

impl TimelineStep {
    pub fn step_days(&self) -> i64 {
        match self {
            TimelineStep::Weekly { .. } => 7,
            TimelineStep::Days { days } => i64::from((*days).max(1)),
        }
    }
}

impl Default for TimelineStep {
    fn default() -> Self {
        TimelineStep::Weekly {
            anchor: default_anchor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressConfig {
    pub schedule: MilestoneSchedule,
    /// Weight used when a row's weight is absent or not numeric.
    pub fallback_weight: f64,
    pub recovery_factor: f64,
    /// Rows whose status matches one of these (case-sensitive) are dropped.
    pub excluded_statuses: Vec<String>,
    pub value_unit: ValueUnit,
    pub timeline_step: TimelineStep,
    pub prefer_explicit_expected: bool,
    pub extra_sentinels: Vec<String>,
    pub delay_threshold_days: i64,
    pub include_completed_in_delays: bool,
    pub max_projection_steps: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            schedule: MilestoneSchedule::default(),
            fallback_weight: DEFAULT_FALLBACK_WEIGHT,
            recovery_factor: DEFAULT_RECOVERY_FACTOR,
            excluded_statuses: Vec::new(),
            value_unit: ValueUnit::Raw,
            timeline_step: TimelineStep::default(),
            prefer_explicit_expected: true,
            extra_sentinels: Vec::new(),
            delay_threshold_days: DEFAULT_DELAY_THRESHOLD_DAYS,
            include_completed_in_delays: true,
            max_projection_steps: DEFAULT_MAX_PROJECTION_STEPS,
        }
    }
}

impl ProgressConfig {
    /// Case-sensitive match after trimming surrounding whitespace from both
    /// the row status and the configured entries.
    pub fn is_excluded_status(&self, status: Option<&str>) -> bool {
        match status {
            Some(value) => self
                .excluded_statuses
                .iter()
                .any(|excluded| excluded.trim() == value.trim()),
            None => false,
        }
    }
}

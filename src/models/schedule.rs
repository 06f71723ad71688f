use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::register::WorkItem;

pub const DEFAULT_BASELINE: (i32, u32, u32) = (2024, 8, 1);

/// Which set of milestone dates a computation reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Actual,
    Expected,
}

impl Perspective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Perspective::Actual => "actual",
            Perspective::Expected => "expected",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition an item must meet before a recorded milestone counts.
///
/// Gates only restrict the actual perspective. The expected perspective is
/// derived from configuration alone and always admits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MilestoneGate {
    #[default]
    Always,
    CompletionFlag,
}

impl MilestoneGate {
    pub fn admits(&self, item: &WorkItem, perspective: Perspective) -> bool {
        match (self, perspective) {
            (_, Perspective::Expected) => true,
            (MilestoneGate::Always, Perspective::Actual) => true,
            (MilestoneGate::CompletionFlag, Perspective::Actual) => item.completion_gate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSpec {
    pub name: String,
    pub weight: f64,
    /// Days after the previous milestone's expected date (after the item's
    /// baseline date for the first milestone).
    #[serde(default)]
    pub offset_days: i64,
    #[serde(default)]
    pub gate: MilestoneGate,
}

impl MilestoneSpec {
    pub fn new(name: impl Into<String>, weight: f64, offset_days: i64) -> Self {
        Self {
            name: name.into(),
            weight,
            offset_days,
            gate: MilestoneGate::Always,
        }
    }

    pub fn gated(mut self, gate: MilestoneGate) -> Self {
        self.gate = gate;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSchedule {
    pub baseline: NaiveDate,
    pub milestones: Vec<MilestoneSpec>,
}

impl MilestoneSchedule {
    pub fn new(baseline: NaiveDate, milestones: Vec<MilestoneSpec>) -> Self {
        Self {
            baseline,
            milestones,
        }
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.milestones
            .iter()
            .position(|milestone| milestone.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn names(&self) -> Vec<String> {
        self.milestones
            .iter()
            .map(|milestone| milestone.name.clone())
            .collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.milestones.iter().map(|milestone| milestone.weight).sum()
    }
}

impl Default for MilestoneSchedule {
    fn default() -> Self {
        let (year, month, day) = DEFAULT_BASELINE;
        Self {
            baseline: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            milestones: vec![
                MilestoneSpec::new("issued", 0.4, 0),
                MilestoneSpec::new("reviewed", 0.3, 10),
                MilestoneSpec::new("replied", 0.3, 5).gated(MilestoneGate::CompletionFlag),
            ],
        }
    }
}

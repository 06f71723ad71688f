use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::models::register::WorkItem;
use crate::models::schedule::MilestoneSchedule;
use crate::services::date_normalizer::plausible_year;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivedSchedule {
    pub dates: Vec<Option<NaiveDate>>,
    pub warnings: Vec<String>,
}

/// Computes planned milestone dates from the baseline, the item's own offset
/// and the configured per-milestone deltas.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleDeriver<'a> {
    schedule: &'a MilestoneSchedule,
    prefer_explicit: bool,
}

impl<'a> ScheduleDeriver<'a> {
    pub fn new(schedule: &'a MilestoneSchedule, prefer_explicit: bool) -> Self {
        Self {
            schedule,
            prefer_explicit,
        }
    }

    /// Never fails: a date that overflows or falls outside the plausible year
    /// window turns that milestone and every later one into `None` and
    /// appends a warning.
    pub fn derive_expected(&self, item: &WorkItem) -> DerivedSchedule {
        let mut derived = DerivedSchedule {
            dates: Vec::with_capacity(self.schedule.len()),
            warnings: Vec::new(),
        };
        let item_offset = item.schedule_offset_days.unwrap_or(0);
        let mut previous: Option<NaiveDate> = None;
        let mut broken = false;

        for (index, milestone) in self.schedule.milestones.iter().enumerate() {
            if broken {
                derived.dates.push(None);
                continue;
            }

            let explicit = if self.prefer_explicit {
                item.expected.get(index).copied().flatten()
            } else {
                None
            };

            let date = match explicit {
                Some(date) => Some(date),
                None => {
                    let anchor = if index == 0 {
                        shift(self.schedule.baseline, item_offset)
                    } else {
                        previous
                    };
                    anchor
                        .and_then(|anchor| shift(anchor, milestone.offset_days))
                        .filter(plausible_year)
                }
            };

            if date.is_none() {
                broken = true;
                let message = format!(
                    "item {}: expected date for '{}' is out of range",
                    item.id, milestone.name
                );
                warn!(
                    target: "app::schedule",
                    item_id = %item.id,
                    milestone = %milestone.name,
                    item_offset,
                    "expected date out of range"
                );
                derived.warnings.push(message);
            }

            previous = date;
            derived.dates.push(date);
        }

        derived
    }
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|offset| date.checked_add_signed(offset))
}

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::models::config::TimelineStep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub points: Vec<NaiveDate>,
    /// Set when the grid collapsed to a single point at the end date.
    pub degenerate: bool,
}

impl Timeline {
    pub fn single(end: NaiveDate) -> Self {
        Self {
            points: vec![end],
            degenerate: true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineBuilder {
    step: TimelineStep,
}

impl TimelineBuilder {
    pub fn new(step: TimelineStep) -> Self {
        Self { step }
    }

    pub fn step_days(&self) -> i64 {
        self.step.step_days()
    }

    /// Ordered grid within `[start, end]`; always at least one point.
    pub fn build(&self, start: NaiveDate, end: NaiveDate) -> Timeline {
        if start > end {
            debug!(target: "app::aggregate", %start, %end, "timeline start after end");
            return Timeline::single(end);
        }

        let first = match self.step {
            TimelineStep::Weekly { anchor } => {
                let ahead = (7 + anchor.num_days_from_monday()
                    - start.weekday().num_days_from_monday())
                    % 7;
                start.checked_add_days(Days::new(u64::from(ahead)))
            }
            TimelineStep::Days { .. } => Some(start),
        };

        let stride = Days::new(self.step.step_days().unsigned_abs());
        let mut points = Vec::new();
        let mut cursor = first;
        while let Some(point) = cursor.filter(|point| *point <= end) {
            points.push(point);
            cursor = point.checked_add_days(stride);
        }

        if points.is_empty() {
            debug!(target: "app::aggregate", %start, %end, "timeline grid empty");
            return Timeline::single(end);
        }

        Timeline {
            points,
            degenerate: false,
        }
    }
}

use chrono::NaiveDate;
use tracing::debug;

use crate::models::curve::{CurvePoint, ProgressCurve};
use crate::models::register::WorkItem;
use crate::models::schedule::{MilestoneSchedule, Perspective};
use crate::services::timeline_builder::Timeline;
use crate::services::weight_model::{MilestoneEvent, MilestoneWeightModel};

/// Running totals over date-sorted milestone events.
struct EventSweep {
    events: Vec<MilestoneEvent>,
    cursor: usize,
    total: f64,
    per_milestone: Vec<f64>,
}

impl EventSweep {
    fn new(events: Vec<MilestoneEvent>, milestones: usize) -> Self {
        Self {
            events,
            cursor: 0,
            total: 0.0,
            per_milestone: vec![0.0; milestones],
        }
    }

    /// Applies every event dated on or before `date`; true when the total grew.
    fn advance_to(&mut self, date: NaiveDate) -> bool {
        let before = self.total;
        while let Some(event) = self.events.get(self.cursor) {
            if event.date > date {
                break;
            }
            self.total += event.weight_delta;
            if let Some(slot) = self.per_milestone.get_mut(event.milestone_index) {
                *slot += event.weight_delta;
            }
            self.cursor += 1;
        }
        self.total > before
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CumulativeAggregator<'a> {
    model: MilestoneWeightModel<'a>,
}

impl<'a> CumulativeAggregator<'a> {
    pub fn new(schedule: &'a MilestoneSchedule) -> Self {
        Self {
            model: MilestoneWeightModel::new(schedule),
        }
    }

    pub fn aggregate(
        &self,
        items: &[WorkItem],
        timeline: &Timeline,
        horizon: NaiveDate,
        perspective: Perspective,
    ) -> ProgressCurve {
        let schedule = self.model.schedule();
        let milestones = schedule.names();
        let total_weight: f64 =
            items.iter().map(|item| item.weight).sum::<f64>() * schedule.total_weight();

        if items.is_empty() || total_weight <= 0.0 || timeline.is_empty() {
            debug!(
                target: "app::aggregate",
                perspective = %perspective,
                items = items.len(),
                "no weight to aggregate"
            );
            return ProgressCurve {
                perspective,
                horizon,
                points: vec![CurvePoint::new(horizon, 0.0)],
                last_progress_at: None,
                breakdown: vec![vec![0.0; milestones.len()]],
                milestones,
            };
        }

        let events = self.model.collect_events(items, perspective);
        let event_count = events.len();
        let mut sweep = EventSweep::new(events, milestones.len());
        let mut points = Vec::with_capacity(timeline.len() + 1);
        let mut breakdown = Vec::with_capacity(timeline.len() + 1);
        let mut last_progress_at = None;

        for &date in &timeline.points {
            if sweep.advance_to(date) {
                last_progress_at = Some(date);
            }
            points.push(CurvePoint::new(date, sweep.total));
            breakdown.push(sweep.per_milestone.clone());
        }

        let reaches_horizon = points
            .last()
            .is_some_and(|point: &CurvePoint| point.date >= horizon);
        if !reaches_horizon {
            if sweep.advance_to(horizon) {
                last_progress_at = Some(horizon);
            }
            points.push(CurvePoint::new(horizon, sweep.total));
            breakdown.push(sweep.per_milestone.clone());
        }

        debug!(
            target: "app::aggregate",
            perspective = %perspective,
            points = points.len(),
            events = event_count,
            final_value = sweep.total,
            "curve aggregated"
        );

        ProgressCurve {
            perspective,
            horizon,
            points,
            last_progress_at,
            milestones,
            breakdown,
        }
    }
}

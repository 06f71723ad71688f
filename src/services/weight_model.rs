use chrono::NaiveDate;

use crate::models::register::WorkItem;
use crate::models::schedule::{MilestoneSchedule, Perspective};

/// One milestone crossing, carrying the absolute weight it adds to the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MilestoneEvent {
    pub date: NaiveDate,
    pub item_index: usize,
    pub milestone_index: usize,
    pub weight_delta: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MilestoneWeightModel<'a> {
    schedule: &'a MilestoneSchedule,
}

impl<'a> MilestoneWeightModel<'a> {
    pub fn new(schedule: &'a MilestoneSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &'a MilestoneSchedule {
        self.schedule
    }

    /// Whether the milestone counts for `item` by `as_of`: a date is present,
    /// falls on or before `as_of`, and the milestone's gate admits the item.
    pub fn is_reached(
        &self,
        item: &WorkItem,
        milestone_index: usize,
        as_of: NaiveDate,
        perspective: Perspective,
    ) -> bool {
        self.counted_date(item, milestone_index, perspective)
            .is_some_and(|date| date <= as_of)
    }

    pub fn reached(&self, item: &WorkItem, as_of: NaiveDate, perspective: Perspective) -> Vec<bool> {
        (0..self.schedule.len())
            .map(|index| self.is_reached(item, index, as_of, perspective))
            .collect()
    }

    /// Fraction of the item's weight earned by `as_of`.
    pub fn contribution(&self, item: &WorkItem, as_of: NaiveDate, perspective: Perspective) -> f64 {
        self.schedule
            .milestones
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_reached(item, *index, as_of, perspective))
            .map(|(_, milestone)| milestone.weight)
            .sum()
    }

    pub fn weighted_contribution(
        &self,
        item: &WorkItem,
        as_of: NaiveDate,
        perspective: Perspective,
    ) -> f64 {
        item.weight * self.contribution(item, as_of, perspective)
    }

    pub fn events<'b>(
        &'b self,
        item_index: usize,
        item: &'b WorkItem,
        perspective: Perspective,
    ) -> impl Iterator<Item = MilestoneEvent> + 'b {
        self.schedule
            .milestones
            .iter()
            .enumerate()
            .filter_map(move |(milestone_index, milestone)| {
                self.counted_date(item, milestone_index, perspective)
                    .map(|date| MilestoneEvent {
                        date,
                        item_index,
                        milestone_index,
                        weight_delta: item.weight * milestone.weight,
                    })
            })
    }

    /// Every item's events, ordered by date. Ties keep item then milestone
    /// order.
    pub fn collect_events(&self, items: &[WorkItem], perspective: Perspective) -> Vec<MilestoneEvent> {
        let mut events: Vec<MilestoneEvent> = items
            .iter()
            .enumerate()
            .flat_map(|(index, item)| self.events(index, item, perspective))
            .collect();
        events.sort_by_key(|event| event.date);
        events
    }

    fn counted_date(
        &self,
        item: &WorkItem,
        milestone_index: usize,
        perspective: Perspective,
    ) -> Option<NaiveDate> {
        let milestone = self.schedule.milestones.get(milestone_index)?;
        if !milestone.gate.admits(item, perspective) {
            return None;
        }
        item.date(perspective, milestone_index)
    }
}

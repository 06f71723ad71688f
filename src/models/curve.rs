use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedule::Perspective;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl CurvePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Cumulative completion over time for one perspective.
///
/// `breakdown[i][m]` is the cumulative value contributed by milestone `m` at
/// `points[i]`; the row sums to `points[i].value`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCurve {
    pub perspective: Perspective,
    pub horizon: NaiveDate,
    pub points: Vec<CurvePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_progress_at: Option<NaiveDate>,
    pub milestones: Vec<String>,
    pub breakdown: Vec<Vec<f64>>,
}

impl ProgressCurve {
    pub fn last_value(&self) -> f64 {
        self.points.last().map(|point| point.value).unwrap_or(0.0)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.date)
    }

    /// Index of the last point at or before `date`, clamped to the curve's
    /// domain.
    pub fn index_at(&self, date: NaiveDate) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        let upper = self.points.partition_point(|point| point.date <= date);
        Some(upper.saturating_sub(1))
    }

    pub fn value_at(&self, date: NaiveDate) -> f64 {
        self.index_at(date)
            .map(|index| self.points[index].value)
            .unwrap_or(0.0)
    }

    pub fn is_monotonic(&self) -> bool {
        self.points
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date && pair[0].value <= pair[1].value)
    }

    pub fn scale(&mut self, factor: f64) {
        for point in &mut self.points {
            point.value *= factor;
        }
        for row in &mut self.breakdown {
            for value in row.iter_mut() {
                *value *= factor;
            }
        }
    }
}

/// Linear catch-up from today's actual value toward the expected final value.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryProjection {
    pub points: Vec<CurvePoint>,
    pub recovery_end_date: NaiveDate,
    pub gap: f64,
    pub duration_steps: f64,
    pub slope_per_step: f64,
    pub converged: bool,
}

impl RecoveryProjection {
    pub fn scale(&mut self, factor: f64) {
        for point in &mut self.points {
            point.value *= factor;
        }
        self.gap *= factor;
        self.slope_per_step *= factor;
    }
}

use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use crate::models::config::{ProgressConfig, DEFAULT_MAX_PROJECTION_STEPS, DEFAULT_RECOVERY_FACTOR};
use crate::models::curve::{CurvePoint, ProgressCurve, RecoveryProjection};
use crate::utils::numeric::{approx_eq, safe_ratio};

/// Linear catch-up projection from today's actual value.
///
/// The duration scales with the project span and the delayed share of the
/// expected final value, dampened by the recovery factor:
/// `steps = span_days * gap / expected_final * factor / step_days`, at least
/// one step.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryProjector {
    recovery_factor: f64,
    step_days: i64,
    max_steps: usize,
}

impl Default for RecoveryProjector {
    fn default() -> Self {
        Self::new(DEFAULT_RECOVERY_FACTOR, 7, DEFAULT_MAX_PROJECTION_STEPS)
    }
}

impl RecoveryProjector {
    pub fn new(recovery_factor: f64, step_days: i64, max_steps: usize) -> Self {
        Self {
            recovery_factor,
            step_days: step_days.max(1),
            max_steps: max_steps.max(1),
        }
    }

    pub fn from_config(config: &ProgressConfig) -> Self {
        Self::new(
            config.recovery_factor,
            config.timeline_step.step_days(),
            config.max_projection_steps,
        )
    }

    /// `None` when today's actual value already meets the expected final
    /// value.
    pub fn project(
        &self,
        actual: &ProgressCurve,
        expected: &ProgressCurve,
        today: NaiveDate,
        start_date: NaiveDate,
    ) -> Option<RecoveryProjection> {
        let actual_today = actual.value_at(today);
        let expected_final = expected.last_value();
        let gap = expected_final - actual_today;

        if gap <= 0.0 || approx_eq(actual_today, expected_final) {
            debug!(
                target: "app::recovery",
                actual_today,
                expected_final,
                "no recovery gap"
            );
            return None;
        }

        let span_days = (expected.horizon - start_date).num_days().max(0) as f64;
        let delay_fraction = safe_ratio(gap, expected_final);
        let duration_steps =
            (span_days * delay_fraction * self.recovery_factor / self.step_days as f64).max(1.0);
        let slope = gap / duration_steps;

        let point_limit = (duration_steps.floor() as usize)
            .saturating_add(2)
            .min(self.max_steps);
        let stride = Days::new(self.step_days.unsigned_abs());

        let mut points = vec![CurvePoint::new(today, actual_today)];
        let mut value = actual_today;
        let mut date = today;
        let mut converged = false;
        while points.len() < point_limit {
            let Some(next) = date.checked_add_days(stride) else {
                break;
            };
            date = next;
            value = (value + slope).min(expected_final);
            points.push(CurvePoint::new(date, value));
            if value >= expected_final {
                converged = true;
                break;
            }
        }

        let recovery_end_date = points.last().map(|point| point.date).unwrap_or(today);
        info!(
            target: "app::recovery",
            gap,
            duration_steps,
            slope,
            %recovery_end_date,
            converged,
            "recovery projected"
        );

        Some(RecoveryProjection {
            points,
            recovery_end_date,
            gap,
            duration_steps,
            slope_per_step: slope,
            converged,
        })
    }
}

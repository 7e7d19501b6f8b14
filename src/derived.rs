//! Derived metrics - goal progress and habit streaks.
//!
//! Pure functions over raw facts. Both the local store and any consumer that needs
//! to re-derive values from a snapshot go through here, so the formulas live in
//! exactly one place.

use crate::model::{HabitLog, MetricDirection};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Percentage of the distance from `start` to `target` already travelled.
///
/// Direction-agnostic: the distance from the start is compared with the total
/// distance, clamped to 0-100. A goal whose start equals its target reports 0.
#[must_use]
pub fn compute_goal_progress(current: f64, start: f64, target: f64) -> u8 {
    let total = (target - start).abs();
    if total < f64::EPSILON {
        return 0;
    }
    let percent = ((current - start).abs() / total * 100.0)
        .round()
        .clamp(0.0, 100.0);

    // Clamped to 0..=100 above; NaN saturates to 0
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let progress = percent as u8;
    progress
}

/// Whether `current` satisfies `target` given the expected direction of travel.
///
/// `Maintain` goals are never "reached"; they are held.
#[must_use]
pub fn is_target_reached(current: f64, target: f64, direction: MetricDirection) -> bool {
    match direction {
        MetricDirection::Increase => current >= target,
        MetricDirection::Decrease => current <= target,
        MetricDirection::Maintain => false,
    }
}

/// Length of the run of consecutive completed days ending today, or yesterday when
/// today has not been logged yet. Any missing day ends the run.
#[must_use]
pub fn compute_streak(completed_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if completed_days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|day| completed_days.contains(day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Streak for one habit out of a mixed collection of logs.
pub fn streak_for_habit<'a, I>(logs: I, habit_id: &str, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a HabitLog>,
{
    let completed_days: BTreeSet<NaiveDate> = logs
        .into_iter()
        .filter(|log| log.habit_id == habit_id && log.completed)
        .map(|log| log.date)
        .collect();
    compute_streak(&completed_days, today)
}

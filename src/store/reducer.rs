//! State transitions of the local store.
//!
//! [`reduce`] is total: every command variant has an arm, nothing here can fail,
//! and a command aimed at an entity that does not exist leaves the state alone.

use super::{
    command::Command,
    state::{AppState, arena_from, latest_entry},
};
use crate::{
    derived,
    model::{Goal, Habit, HabitLog, MetricEntry, Snapshot},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::trace;

/// Notifications older than this are dropped when a snapshot is loaded.
pub const NOTIFICATION_RETENTION_DAYS: i64 = 30;

/// Applies one command to the state. `now` drives streak evaluation and the
/// notification retention window.
pub fn reduce(state: &mut AppState, command: Command, now: DateTime<Utc>) {
    let today = now.date_naive();
    trace!(command_type = ?command.command_type(), "reducing command");

    match command {
        Command::AddGoal(goal) | Command::UpdateGoal(goal) => put_goal(state, goal),
        Command::DeleteGoal(target) => {
            state.goals.remove(&target.id);
        }

        Command::AddAction(action) | Command::UpdateAction(action) => {
            state.actions.insert(action.id.clone(), action);
        }
        Command::DeleteAction(target) => {
            state.actions.remove(&target.id);
        }
        Command::ToggleAction(target) => {
            if let Some(action) = state.actions.get_mut(&target.id) {
                action.completed = !action.completed;
            }
        }

        Command::AddHabit(habit) | Command::UpdateHabit(habit) => put_habit(state, habit, today),
        Command::DeleteHabit(target) => {
            state.habits.remove(&target.id);
            state.habit_logs.retain(|_, log| log.habit_id != target.id);
        }
        Command::LogHabit(log) => log_habit(state, log, today),
        Command::DeleteHabitLog(target) => {
            if let Some(log) = state.habit_logs.remove(&target.id) {
                refresh_streak(state, &log.habit_id, today);
            }
        }

        Command::AddCategory(category) | Command::UpdateCategory(category) => {
            state.categories.insert(category.id.clone(), category);
        }
        Command::DeleteCategory(target) => {
            state.categories.remove(&target.id);
        }

        Command::AddMetric(metric) | Command::UpdateMetric(metric) => {
            state.metrics.insert(metric.id.clone(), metric);
        }
        Command::DeleteMetric(target) => {
            state.metrics.remove(&target.id);
            state
                .metric_entries
                .retain(|_, entry| entry.metric_id != target.id);
        }
        Command::AddMetricEntry(entry) => record_metric_entry(state, entry),
        Command::DeleteMetricEntry(target) => {
            state.metric_entries.remove(&target.id);
        }

        Command::AddNotification(notification) => {
            state
                .notifications
                .insert(notification.id.clone(), notification);
        }
        Command::DeleteNotification(target) => {
            state.notifications.remove(&target.id);
        }
        Command::ToggleNotificationRead(target) => {
            if let Some(notification) = state.notifications.get_mut(&target.id) {
                notification.read = !notification.read;
            }
        }

        Command::UpdateProfile(profile) => state.user = Some(profile),
        Command::SetFilter(filter) => state.filter = filter,
        Command::SetLoading(loading) => state.loading = loading,
        Command::LoadSnapshot(snapshot) => load_snapshot(state, *snapshot, now),
    }
}

fn put_goal(state: &mut AppState, mut goal: Goal) {
    goal.refresh_progress();
    state.goals.insert(goal.id.clone(), goal);
}

fn put_habit(state: &mut AppState, mut habit: Habit, today: NaiveDate) {
    habit.streak = derived::streak_for_habit(state.habit_logs.values(), &habit.id, today);
    state.habits.insert(habit.id.clone(), habit);
}

// Overwrites the log for the same (habit, day) in place, keeping its id.
fn log_habit(state: &mut AppState, mut log: HabitLog, today: NaiveDate) {
    if let Some(existing) = state.habit_logs.values().find(|e| e.same_slot(&log)) {
        log.id.clone_from(&existing.id);
    }
    let habit_id = log.habit_id.clone();
    state.habit_logs.insert(log.id.clone(), log);
    refresh_streak(state, &habit_id, today);
}

fn refresh_streak(state: &mut AppState, habit_id: &str, today: NaiveDate) {
    let streak = derived::streak_for_habit(state.habit_logs.values(), habit_id, today);
    if let Some(habit) = state.habits.get_mut(habit_id) {
        habit.streak = streak;
    }
}

// The only path besides goal replacement that moves a goal's progress. Completed
// goals still take the new value but keep their frozen progress.
fn record_metric_entry(state: &mut AppState, entry: MetricEntry) {
    for goal in state
        .goals
        .values_mut()
        .filter(|goal| goal.target_metric_id.as_deref() == Some(entry.metric_id.as_str()))
    {
        goal.metric_current_value = entry.value;
        goal.refresh_progress();
    }
    state.metric_entries.insert(entry.id.clone(), entry);
}

fn load_snapshot(state: &mut AppState, snapshot: Snapshot, now: DateTime<Utc>) {
    let Snapshot {
        user,
        goals,
        actions,
        categories,
        metrics,
        metric_entries,
        habits,
        habit_logs,
        notifications,
    } = snapshot;

    let cutoff = now - Duration::days(NOTIFICATION_RETENTION_DAYS);
    let retained: Vec<_> = notifications
        .into_iter()
        .filter(|notification| notification.created_at >= cutoff)
        .collect();

    state.user = user;
    state.actions = arena_from(actions, |action| &action.id);
    state.categories = arena_from(categories, |category| &category.id);
    state.metrics = arena_from(metrics, |metric| &metric.id);
    state.metric_entries = arena_from(metric_entries, |entry| &entry.id);
    state.habit_logs = arena_from(habit_logs, |log| &log.id);
    state.notifications = arena_from(retained, |notification| &notification.id);
    state.goals = arena_from(goals, |goal| &goal.id);
    state.habits = arena_from(habits, |habit| &habit.id);

    // The server returns whatever was last persisted; re-derive rather than trust it
    for goal in state.goals.values_mut() {
        let Some(metric_id) = goal.target_metric_id.as_deref() else {
            continue;
        };
        if let Some(latest) = latest_entry(&state.metric_entries, metric_id) {
            goal.metric_current_value = latest.value;
        }
        goal.refresh_progress();
    }

    let today = now.date_naive();
    for habit in state.habits.values_mut() {
        habit.streak = derived::streak_for_habit(state.habit_logs.values(), &habit.id, today);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        model::{GoalStatus, MetricDirection},
        store::command::IdPayload,
        test_utils::{
            at_noon, sample_action, sample_goal, sample_habit, sample_habit_log,
            sample_metric_entry, sample_notification,
        },
    };

    fn linked_goal(id: &str, start: f64, target: f64) -> Goal {
        let mut goal = sample_goal(id);
        goal.target_metric_id = Some("weight".to_string());
        goal.metric_start_value = start;
        goal.metric_target_value = target;
        goal.metric_current_value = start;
        goal
    }

    #[test]
    fn test_add_goal_recomputes_progress() {
        let mut state = AppState::default();
        let mut goal = linked_goal("g1", 0.0, 10.0);
        goal.metric_current_value = 4.0;
        goal.progress = 99; // stale value from the caller

        reduce(&mut state, Command::AddGoal(goal), at_noon(1));

        assert_eq!(state.goals["g1"].progress, 40);
    }

    #[test]
    fn test_completed_goal_progress_is_frozen() {
        let mut state = AppState::default();
        let mut goal = linked_goal("g1", 0.0, 10.0);
        goal.status = GoalStatus::Completed;
        goal.progress = 100;
        reduce(&mut state, Command::UpdateGoal(goal), at_noon(1));

        let entry = sample_metric_entry("e1", "weight", 2.0, 1);
        reduce(&mut state, Command::AddMetricEntry(entry), at_noon(1));

        let goal = &state.goals["g1"];
        assert_eq!(goal.progress, 100);
        assert!((goal.metric_current_value - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metric_entry_drives_linked_goal_progress() {
        let mut state = AppState::default();
        let mut goal = linked_goal("g1", 70.0, 60.0);
        goal.metric_direction = MetricDirection::Decrease;
        reduce(&mut state, Command::AddGoal(goal), at_noon(1));
        reduce(&mut state, Command::AddGoal(sample_goal("unlinked")), at_noon(1));

        let entry = sample_metric_entry("e1", "weight", 65.0, 2);
        reduce(&mut state, Command::AddMetricEntry(entry), at_noon(2));

        assert_eq!(state.goals["g1"].progress, 50);
        assert_eq!(state.goals["unlinked"].progress, 0);
        assert_eq!(state.metric_entries.len(), 1);
    }

    #[test]
    fn test_apply_same_create_twice_is_idempotent() {
        let goal = linked_goal("g1", 0.0, 10.0);
        let mut once = AppState::default();
        reduce(&mut once, Command::AddGoal(goal.clone()), at_noon(1));

        let mut twice = AppState::default();
        reduce(&mut twice, Command::AddGoal(goal.clone()), at_noon(1));
        reduce(&mut twice, Command::AddGoal(goal), at_noon(1));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_log_habit_consecutive_days_builds_streak() {
        let mut state = AppState::default();
        reduce(&mut state, Command::AddHabit(sample_habit("h1")), at_noon(1));

        for day in 1..=4 {
            let log = sample_habit_log(&format!("l{day}"), "h1", day, true);
            reduce(&mut state, Command::LogHabit(log), at_noon(4));
        }

        assert_eq!(state.habits["h1"].streak, 4);
    }

    #[test]
    fn test_log_habit_gap_resets_streak() {
        let mut state = AppState::default();
        reduce(&mut state, Command::AddHabit(sample_habit("h1")), at_noon(1));
        for day in [1, 2, 3, 5] {
            let log = sample_habit_log(&format!("l{day}"), "h1", day, true);
            reduce(&mut state, Command::LogHabit(log), at_noon(5));
        }

        assert_eq!(state.habits["h1"].streak, 1);
    }

    #[test]
    fn test_log_habit_same_day_overwrites() {
        let mut state = AppState::default();
        reduce(&mut state, Command::AddHabit(sample_habit("h1")), at_noon(3));
        reduce(
            &mut state,
            Command::LogHabit(sample_habit_log("first", "h1", 3, true)),
            at_noon(3),
        );
        assert_eq!(state.habits["h1"].streak, 1);

        reduce(
            &mut state,
            Command::LogHabit(sample_habit_log("second", "h1", 3, false)),
            at_noon(3),
        );

        assert_eq!(state.habit_logs.len(), 1);
        let log = &state.habit_logs["first"];
        assert!(!log.completed);
        assert_eq!(state.habits["h1"].streak, 0);
    }

    #[test]
    fn test_delete_habit_removes_its_logs() {
        let mut state = AppState::default();
        reduce(&mut state, Command::AddHabit(sample_habit("h1")), at_noon(1));
        reduce(&mut state, Command::AddHabit(sample_habit("h2")), at_noon(1));
        reduce(
            &mut state,
            Command::LogHabit(sample_habit_log("a", "h1", 1, true)),
            at_noon(1),
        );
        reduce(
            &mut state,
            Command::LogHabit(sample_habit_log("b", "h2", 1, true)),
            at_noon(1),
        );

        reduce(&mut state, Command::DeleteHabit(IdPayload::new("h1")), at_noon(1));

        assert!(!state.habits.contains_key("h1"));
        assert_eq!(state.habit_logs.len(), 1);
        assert!(state.habit_logs.contains_key("b"));
    }

    #[test]
    fn test_toggle_action_flips_and_ignores_unknown() {
        let mut state = AppState::default();
        reduce(&mut state, Command::AddAction(sample_action("a1")), at_noon(1));

        reduce(&mut state, Command::ToggleAction(IdPayload::new("a1")), at_noon(1));
        assert!(state.actions["a1"].completed);

        let before = state.clone();
        reduce(&mut state, Command::ToggleAction(IdPayload::new("missing")), at_noon(1));
        assert_eq!(state, before);
    }

    #[test]
    fn test_load_snapshot_rederives_progress_from_latest_entry() {
        let mut goal = linked_goal("g1", 0.0, 100.0);
        goal.metric_current_value = 10.0;
        goal.progress = 10; // what the server had persisted

        let snapshot = Snapshot {
            goals: vec![goal],
            metric_entries: vec![
                sample_metric_entry("old", "weight", 30.0, 1),
                sample_metric_entry("new", "weight", 80.0, 3),
                sample_metric_entry("mid", "weight", 50.0, 2),
            ],
            ..Snapshot::default()
        };

        let mut state = AppState::default();
        reduce(&mut state, Command::LoadSnapshot(Box::new(snapshot)), at_noon(3));

        let goal = &state.goals["g1"];
        assert!((goal.metric_current_value - 80.0).abs() < f64::EPSILON);
        assert_eq!(goal.progress, 80);
    }

    #[test]
    fn test_load_snapshot_drops_stale_notifications_and_rebuilds_streaks() {
        let mut habit = sample_habit("h1");
        habit.streak = 42;
        let snapshot = Snapshot {
            habits: vec![habit],
            habit_logs: vec![
                sample_habit_log("a", "h1", 9, true),
                sample_habit_log("b", "h1", 10, true),
            ],
            notifications: vec![
                sample_notification("fresh", at_noon(5)),
                sample_notification("stale", at_noon(1) - Duration::days(40)),
            ],
            ..Snapshot::default()
        };

        let mut state = AppState::default();
        reduce(&mut state, Command::LoadSnapshot(Box::new(snapshot)), at_noon(10));

        assert_eq!(state.habits["h1"].streak, 2);
        assert!(state.notifications.contains_key("fresh"));
        assert!(!state.notifications.contains_key("stale"));
    }

    #[test]
    fn test_view_commands_touch_only_view_state() {
        let mut state = AppState::default();
        reduce(&mut state, Command::SetLoading(true), at_noon(1));
        assert!(state.loading);
        assert!(state.goals.is_empty());
    }
}

//! The state held by the local store: one id-keyed arena per entity kind.
//!
//! Relationships between kinds stay as plain ids and are resolved by lookup, never
//! by embedding one entity inside another.

use crate::model::{
    Action, Category, EntityId, Goal, GoalStatus, Habit, HabitLog, MetricDefinition,
    MetricEntry, Notification, UserProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Id-keyed collection.
pub type Arena<T> = BTreeMap<EntityId, T>;

/// List filter chosen in the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewFilter {
    /// Only show this life area
    pub area_id: Option<EntityId>,
    /// Only show goals with this status
    pub status: Option<GoalStatus>,
}

impl ViewFilter {
    fn admits(&self, goal: &Goal) -> bool {
        self.area_id
            .as_ref()
            .is_none_or(|area| goal.area_id.as_ref() == Some(area))
            && self.status.is_none_or(|status| goal.status == status)
    }
}

/// Everything the UI reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// The signed-in user's profile
    pub user: Option<UserProfile>,
    /// Goals by id
    pub goals: Arena<Goal>,
    /// Actions by id
    pub actions: Arena<Action>,
    /// Habits by id
    pub habits: Arena<Habit>,
    /// Habit logs by id
    pub habit_logs: Arena<HabitLog>,
    /// Life areas by id
    pub categories: Arena<Category>,
    /// Metric definitions by id
    pub metrics: Arena<MetricDefinition>,
    /// Metric entries by id
    pub metric_entries: Arena<MetricEntry>,
    /// Notifications by id
    pub notifications: Arena<Notification>,
    /// Current list filter
    pub filter: ViewFilter,
    /// Loading indicator
    pub loading: bool,
}

/// Builds an arena from a list, later duplicates replacing earlier ones.
pub fn arena_from<T, F>(items: Vec<T>, id_of: F) -> Arena<T>
where
    F: Fn(&T) -> &EntityId,
{
    items
        .into_iter()
        .map(|item| (id_of(&item).clone(), item))
        .collect()
}

/// Latest entry of a metric by date; ties go to the entry with the greatest id.
pub fn latest_entry<'a>(entries: &'a Arena<MetricEntry>, metric_id: &str) -> Option<&'a MetricEntry> {
    entries
        .values()
        .filter(|entry| entry.metric_id == metric_id)
        .max_by_key(|entry| entry.date)
}

impl AppState {
    /// Goals passing the current filter.
    pub fn visible_goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.values().filter(|goal| self.filter.admits(goal))
    }

    /// Goals whose linked metric has reached its target.
    pub fn goals_with_reached_targets(&self) -> impl Iterator<Item = &Goal> {
        self.goals.values().filter(|goal| goal.target_reached())
    }

    /// Actions attached to a goal.
    pub fn actions_for_goal<'a>(&'a self, goal_id: &'a str) -> impl Iterator<Item = &'a Action> {
        self.actions
            .values()
            .filter(move |action| action.goal_id.as_deref() == Some(goal_id))
    }

    /// Logs recorded for a habit.
    pub fn logs_for_habit<'a>(&'a self, habit_id: &'a str) -> impl Iterator<Item = &'a HabitLog> {
        self.habit_logs
            .values()
            .filter(move |log| log.habit_id == habit_id)
    }

    /// Latest entry of a metric by date.
    #[must_use]
    pub fn latest_entry(&self, metric_id: &str) -> Option<&MetricEntry> {
        latest_entry(&self.metric_entries, metric_id)
    }

    /// Number of notifications not yet read.
    #[must_use]
    pub fn unread_notifications(&self) -> usize {
        self.notifications.values().filter(|n| !n.read).count()
    }
}

//! Conversions between storage rows and client-facing domain types.
//!
//! Rows → domain renames storage columns into the client vocabulary and turns
//! epoch integers back into dates. Domain → rows coerces dates into epoch
//! milliseconds and serializes nested structures into JSON text. Every column is
//! `Set`, so the resulting active models are full-column replacements.

use crate::{
    entities::{
        action, category, goal, habit, habit_log, metric_definition, metric_entry, notification,
        user,
    },
    errors::Result,
    model::{
        Action, Category, FALLBACK_ICON, Goal, GoalStatus, GoalType, Habit, HabitLog,
        MetricDefinition, MetricDirection, MetricEntry, Notification, SubscriptionTier,
        UserProfile,
        dates::{day_to_epoch_millis, epoch_millis_to_day, epoch_millis_to_timestamp},
    },
};
use sea_orm::Set;
use serde::de::DeserializeOwned;
use tracing::warn;

// A damaged blob must not take the whole snapshot down with it.
fn decode_blob<T: DeserializeOwned + Default>(raw: &str, column: &str, row_id: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(row_id, column, "Discarding unreadable JSON column: {e}");
        T::default()
    })
}

impl From<user::Model> for UserProfile {
    fn from(row: user::Model) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            subscription_tier: SubscriptionTier::parse(&row.subscription_tier),
        }
    }
}

impl From<category::Model> for Category {
    fn from(row: category::Model) -> Self {
        Self {
            id: row.id,
            title: row.title,
            icon: row
                .icon
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| FALLBACK_ICON.to_string()),
            color: row.color,
            sort_order: row.sort_order,
        }
    }
}

/// Full-column row for a category.
#[must_use]
pub fn category_row(category: &Category, user_id: &str, created_at: i64) -> category::ActiveModel {
    category::ActiveModel {
        id: Set(category.id.clone()),
        user_id: Set(user_id.to_string()),
        title: Set(category.title.clone()),
        icon: Set(Some(category.icon.clone())),
        color: Set(category.color.clone()),
        sort_order: Set(category.sort_order),
        created_at: Set(created_at),
    }
}

impl From<metric_definition::Model> for MetricDefinition {
    fn from(row: metric_definition::Model) -> Self {
        Self {
            id: row.id,
            area_id: row.category_id,
            name: row.name,
            unit: row.unit,
        }
    }
}

/// Full-column row for a metric definition.
#[must_use]
pub fn metric_row(metric: &MetricDefinition, user_id: &str) -> metric_definition::ActiveModel {
    metric_definition::ActiveModel {
        id: Set(metric.id.clone()),
        user_id: Set(user_id.to_string()),
        category_id: Set(metric.area_id.clone()),
        name: Set(metric.name.clone()),
        unit: Set(metric.unit.clone()),
    }
}

impl From<metric_entry::Model> for MetricEntry {
    fn from(row: metric_entry::Model) -> Self {
        Self {
            id: row.id,
            metric_id: row.metric_id,
            value: row.value,
            date: epoch_millis_to_day(row.date),
            note: row.note,
        }
    }
}

/// Full-column row for a metric entry.
#[must_use]
pub fn metric_entry_row(entry: &MetricEntry, user_id: &str) -> metric_entry::ActiveModel {
    metric_entry::ActiveModel {
        id: Set(entry.id.clone()),
        user_id: Set(user_id.to_string()),
        metric_id: Set(entry.metric_id.clone()),
        value: Set(entry.value),
        date: Set(day_to_epoch_millis(entry.date)),
        note: Set(entry.note.clone()),
    }
}

impl From<goal::Model> for Goal {
    fn from(row: goal::Model) -> Self {
        let sub_goals = decode_blob(&row.sub_goals, "sub_goals", &row.id);
        Self {
            sub_goals,
            area_id: row.area_id,
            title: row.title,
            description: row.description,
            status: GoalStatus::parse(&row.status),
            goal_type: GoalType::parse(&row.goal_type),
            target_metric_id: row.target_metric_id,
            metric_start_value: row.metric_start_value,
            metric_target_value: row.metric_target_value,
            metric_current_value: row.metric_current_value,
            metric_direction: MetricDirection::parse(&row.metric_direction),
            progress: u8::try_from(row.progress.clamp(0, 100)).unwrap_or_default(),
            deadline: row.deadline.map(epoch_millis_to_day),
            created_at: epoch_millis_to_timestamp(row.created_at),
            id: row.id,
        }
    }
}

/// Full-column row for a goal.
pub fn goal_row(goal: &Goal, user_id: &str) -> Result<goal::ActiveModel> {
    Ok(goal::ActiveModel {
        id: Set(goal.id.clone()),
        user_id: Set(user_id.to_string()),
        area_id: Set(goal.area_id.clone()),
        title: Set(goal.title.clone()),
        description: Set(goal.description.clone()),
        status: Set(goal.status.as_str().to_string()),
        goal_type: Set(goal.goal_type.as_str().to_string()),
        target_metric_id: Set(goal.target_metric_id.clone()),
        metric_start_value: Set(goal.metric_start_value),
        metric_target_value: Set(goal.metric_target_value),
        metric_current_value: Set(goal.metric_current_value),
        metric_direction: Set(goal.metric_direction.as_str().to_string()),
        progress: Set(i32::from(goal.progress)),
        sub_goals: Set(serde_json::to_string(&goal.sub_goals)?),
        deadline: Set(goal.deadline.map(day_to_epoch_millis)),
        created_at: Set(goal.created_at.timestamp_millis()),
    })
}

impl From<action::Model> for Action {
    fn from(row: action::Model) -> Self {
        Self {
            id: row.id,
            goal_id: row.goal_id,
            title: row.title,
            completed: row.completed,
            due_date: row.due_date.map(epoch_millis_to_day),
            created_at: epoch_millis_to_timestamp(row.created_at),
        }
    }
}

/// Full-column row for an action.
#[must_use]
pub fn action_row(action: &Action, user_id: &str) -> action::ActiveModel {
    action::ActiveModel {
        id: Set(action.id.clone()),
        user_id: Set(user_id.to_string()),
        goal_id: Set(action.goal_id.clone()),
        title: Set(action.title.clone()),
        completed: Set(action.completed),
        due_date: Set(action.due_date.map(day_to_epoch_millis)),
        created_at: Set(action.created_at.timestamp_millis()),
    }
}

impl From<habit::Model> for Habit {
    fn from(row: habit::Model) -> Self {
        let active_days = decode_blob(&row.active_days, "active_days", &row.id);
        Self {
            active_days,
            area_id: row.area_id,
            title: row.title,
            streak: u32::try_from(row.streak).unwrap_or_default(),
            created_at: epoch_millis_to_timestamp(row.created_at),
            id: row.id,
        }
    }
}

/// Full-column row for a habit.
pub fn habit_row(habit: &Habit, user_id: &str) -> Result<habit::ActiveModel> {
    Ok(habit::ActiveModel {
        id: Set(habit.id.clone()),
        user_id: Set(user_id.to_string()),
        area_id: Set(habit.area_id.clone()),
        title: Set(habit.title.clone()),
        active_days: Set(serde_json::to_string(&habit.active_days)?),
        streak: Set(i32::try_from(habit.streak).unwrap_or(i32::MAX)),
        created_at: Set(habit.created_at.timestamp_millis()),
    })
}

impl From<habit_log::Model> for HabitLog {
    fn from(row: habit_log::Model) -> Self {
        Self {
            id: row.id,
            habit_id: row.habit_id,
            date: epoch_millis_to_day(row.date),
            completed: row.completed,
        }
    }
}

/// Full-column row for a habit log.
#[must_use]
pub fn habit_log_row(log: &HabitLog, user_id: &str) -> habit_log::ActiveModel {
    habit_log::ActiveModel {
        id: Set(log.id.clone()),
        user_id: Set(user_id.to_string()),
        habit_id: Set(log.habit_id.clone()),
        date: Set(day_to_epoch_millis(log.date)),
        completed: Set(log.completed),
    }
}

impl From<notification::Model> for Notification {
    fn from(row: notification::Model) -> Self {
        Self {
            id: row.id,
            title: row.title,
            message: row.message,
            read: row.read,
            created_at: epoch_millis_to_timestamp(row.created_at),
        }
    }
}

/// Full-column row for a notification.
#[must_use]
pub fn notification_row(
    notification: &Notification,
    user_id: &str,
) -> notification::ActiveModel {
    notification::ActiveModel {
        id: Set(notification.id.clone()),
        user_id: Set(user_id.to_string()),
        title: Set(notification.title.clone()),
        message: Set(notification.message.clone()),
        read: Set(notification.read),
        created_at: Set(notification.created_at.timestamp_millis()),
    }
}

//! Shared test utilities for `Momentum`.
//!
//! This module provides common helper functions for setting up test databases
//! and building domain values with sensible defaults. Sample dates all fall in
//! May 2024 so tests can talk about "day 3" instead of full dates.

use crate::{
    entities::{goal, user},
    errors::Result,
    model::{Action, Goal, Habit, HabitLog, MetricEntry, Notification},
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all persistence tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a user row with an `@example.com` address.
pub async fn create_test_user(db: &DatabaseConnection, id: &str) -> Result<user::Model> {
    let row = user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(format!("{id}@example.com")),
        name: Set(format!("Test {id}")),
        subscription_tier: Set("free".to_string()),
        created_at: Set(0),
    }
    .insert(db)
    .await?;
    Ok(row)
}

/// Sets up a database that already holds one user.
pub async fn setup_with_user(id: &str) -> Result<(DatabaseConnection, user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, id).await?;
    Ok((db, user))
}

/// A goal row with every column set, for direct inserts.
#[must_use]
pub fn goal_row(id: &str, user_id: &str) -> goal::ActiveModel {
    goal::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        area_id: Set(None),
        title: Set(format!("Goal {id}")),
        description: Set(None),
        status: Set("active".to_string()),
        goal_type: Set("tactical".to_string()),
        target_metric_id: Set(None),
        metric_start_value: Set(0.0),
        metric_target_value: Set(0.0),
        metric_current_value: Set(0.0),
        metric_direction: Set("increase".to_string()),
        progress: Set(0),
        sub_goals: Set("[]".to_string()),
        deadline: Set(None),
        created_at: Set(0),
    }
}

/// A day in May 2024.
///
/// # Panics
/// If `day` is not between 1 and 31.
#[must_use]
pub fn may(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap_or_else(|| panic!("May has no day {day}"))
}

/// Noon UTC on a day in May 2024.
#[must_use]
pub fn at_noon(day: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&may(day).and_hms_opt(12, 0, 0).unwrap_or_default())
}

/// A plain active goal with no metric link.
#[must_use]
pub fn sample_goal(id: &str) -> Goal {
    Goal {
        id: id.to_string(),
        area_id: None,
        title: format!("Goal {id}"),
        description: None,
        status: crate::model::GoalStatus::Active,
        goal_type: crate::model::GoalType::Tactical,
        target_metric_id: None,
        metric_start_value: 0.0,
        metric_target_value: 0.0,
        metric_current_value: 0.0,
        metric_direction: crate::model::MetricDirection::Increase,
        progress: 0,
        sub_goals: Vec::new(),
        deadline: None,
        created_at: at_noon(1),
    }
}

/// An open action attached to no goal.
#[must_use]
pub fn sample_action(id: &str) -> Action {
    Action {
        id: id.to_string(),
        goal_id: None,
        title: format!("Action {id}"),
        completed: false,
        due_date: None,
        created_at: at_noon(1),
    }
}

/// A daily habit with no streak.
#[must_use]
pub fn sample_habit(id: &str) -> Habit {
    Habit {
        id: id.to_string(),
        area_id: None,
        title: format!("Habit {id}"),
        active_days: vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ],
        streak: 0,
        created_at: at_noon(1),
    }
}

/// A habit log on a day in May 2024.
#[must_use]
pub fn sample_habit_log(id: &str, habit_id: &str, day: u32, completed: bool) -> HabitLog {
    HabitLog {
        id: id.to_string(),
        habit_id: habit_id.to_string(),
        date: may(day),
        completed,
    }
}

/// A metric entry on a day in May 2024.
#[must_use]
pub fn sample_metric_entry(id: &str, metric_id: &str, value: f64, day: u32) -> MetricEntry {
    MetricEntry {
        id: id.to_string(),
        metric_id: metric_id.to_string(),
        value,
        date: may(day),
        note: None,
    }
}

/// An unread notification created at the given instant.
#[must_use]
pub fn sample_notification(id: &str, created_at: DateTime<Utc>) -> Notification {
    Notification {
        id: id.to_string(),
        title: format!("Notice {id}"),
        message: "Something happened".to_string(),
        read: false,
        created_at,
    }
}

//! Fetch-all-and-heal: the single read path a client uses to load its state.

use crate::{
    config::catalog::Catalog,
    entities::{
        Action, Category, Goal, Habit, HabitLog, MetricDefinition, MetricEntry, Notification,
        action, category, goal, habit, habit_log, metric_definition, metric_entry, notification,
    },
    errors::Result,
    model::{self, Snapshot},
    remote::{seeder, user::ensure_user},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument};

fn into_domain<R, D: From<R>>(rows: Vec<R>) -> Vec<D> {
    rows.into_iter().map(D::from).collect()
}

/// Loads everything the user owns, repairing the account on the way.
///
/// Recreates a missing user root, reads every collection in parallel, then tops
/// up missing catalog categories and metrics. Always returns the complete set
/// after healing.
///
/// # Errors
/// Returns a database error if any read or healing write fails.
#[instrument(skip(db, catalog))]
pub async fn fetch_all_and_heal(
    db: &DatabaseConnection,
    user_id: &str,
    catalog: &Catalog,
) -> Result<Snapshot> {
    let root = ensure_user(db, user_id).await?;

    let (goals, actions, categories, metrics, metric_entries, habits, habit_logs, notifications) = tokio::try_join!(
        Goal::find()
            .filter(goal::Column::UserId.eq(user_id))
            .order_by_asc(goal::Column::CreatedAt)
            .all(db),
        Action::find()
            .filter(action::Column::UserId.eq(user_id))
            .order_by_asc(action::Column::CreatedAt)
            .all(db),
        Category::find()
            .filter(category::Column::UserId.eq(user_id))
            .order_by_asc(category::Column::SortOrder)
            .all(db),
        MetricDefinition::find()
            .filter(metric_definition::Column::UserId.eq(user_id))
            .all(db),
        MetricEntry::find()
            .filter(metric_entry::Column::UserId.eq(user_id))
            .order_by_asc(metric_entry::Column::Date)
            .all(db),
        Habit::find()
            .filter(habit::Column::UserId.eq(user_id))
            .order_by_asc(habit::Column::CreatedAt)
            .all(db),
        HabitLog::find()
            .filter(habit_log::Column::UserId.eq(user_id))
            .order_by_asc(habit_log::Column::Date)
            .all(db),
        Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(db),
    )?;

    let mut categories: Vec<model::Category> = into_domain(categories);
    let mut metrics: Vec<model::MetricDefinition> = into_domain(metrics);
    let report =
        seeder::heal_defaults(db, user_id, catalog, &mut categories, &mut metrics).await?;

    debug!(
        user_id,
        resurrected = root.resurrected,
        categories_added = report.categories_added,
        metrics_added = report.metrics_added,
        goals = goals.len(),
        habits = habits.len(),
        "Snapshot assembled"
    );

    Ok(Snapshot {
        user: Some(root.user.into()),
        goals: into_domain(goals),
        actions: into_domain(actions),
        categories,
        metrics,
        metric_entries: into_domain(metric_entries),
        habits: into_domain(habits),
        habit_logs: into_domain(habit_logs),
        notifications: into_domain(notifications),
    })
}

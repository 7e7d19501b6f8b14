//! Command application against the persistent store.
//!
//! Every command for one user runs inside a transaction together with the
//! bookkeeping row for its `commandId`, so a redelivered command is acknowledged
//! without being applied twice.

use crate::{
    entities::{
        Action, AppliedCommand, HabitLog, Notification, User, action, applied_command, category,
        goal, habit, habit_log, metric_definition, metric_entry, notification, user,
    },
    errors::Result,
    model::{HabitLog as HabitLogRecord, UserProfile},
    remote::records,
    store::Command,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic,
    IntoActiveModel, Iterable, QueryFilter, Set, TransactionTrait,
    sea_query::{Alias, Expr, OnConflict},
};
use tracing::{debug, info, instrument};

/// Outcome of one apply call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The command changed (or confirmed) persisted state
    Persisted,
    /// The `commandId` was seen before; nothing ran
    Duplicate,
    /// View-only command; nothing to persist
    Ignored,
}

/// Insert-or-replace by `id`, limited to rows the user owns.
///
/// A conflicting row owned by someone else is left untouched.
async fn upsert_owned<A, C>(db: &C, row: A, user_id: &str) -> Result<()>
where
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let replace = OnConflict::column(Alias::new("id"))
        .update_columns(
            <A::Entity as EntityTrait>::Column::iter().filter(|column| column.as_str() != "id"),
        )
        .action_and_where(Expr::col(Alias::new("user_id")).eq(user_id))
        .to_owned();
    <A::Entity as EntityTrait>::insert(row)
        .on_conflict(replace)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn delete_owned<E, C>(db: &C, user_id: &str, id: &str) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let removed = E::delete_many()
        .filter(Expr::col(Alias::new("id")).eq(id))
        .filter(Expr::col(Alias::new("user_id")).eq(user_id))
        .exec(db)
        .await?
        .rows_affected;
    if removed == 0 {
        debug!(id, "Delete target already gone");
    }
    Ok(())
}

async fn toggle_action<C: ConnectionTrait>(db: &C, user_id: &str, id: &str) -> Result<()> {
    let Some(row) = Action::find_by_id(id)
        .filter(action::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        debug!(id, "Toggle target not found");
        return Ok(());
    };
    let completed = !row.completed;
    let mut active: action::ActiveModel = row.into();
    active.completed = Set(completed);
    active.update(db).await?;
    Ok(())
}

async fn toggle_notification<C: ConnectionTrait>(db: &C, user_id: &str, id: &str) -> Result<()> {
    let Some(row) = Notification::find_by_id(id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        debug!(id, "Toggle target not found");
        return Ok(());
    };
    let read = !row.read;
    let mut active: notification::ActiveModel = row.into();
    active.read = Set(read);
    active.update(db).await?;
    Ok(())
}

/// One log per (habit, day): an existing slot keeps its id and takes the new flag.
async fn log_habit<C: ConnectionTrait>(db: &C, user_id: &str, log: &HabitLogRecord) -> Result<()> {
    let slot = HabitLog::find()
        .filter(habit_log::Column::UserId.eq(user_id))
        .filter(habit_log::Column::HabitId.eq(&log.habit_id))
        .filter(habit_log::Column::Date.eq(crate::model::dates::day_to_epoch_millis(log.date)))
        .one(db)
        .await?;

    match slot {
        Some(existing) => {
            let mut active: habit_log::ActiveModel = existing.into();
            active.completed = Set(log.completed);
            active.update(db).await?;
        }
        None => upsert_owned(db, records::habit_log_row(log, user_id), user_id).await?,
    }
    Ok(())
}

/// The session's own root row; the id always comes from the session, never the payload.
async fn update_profile<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    profile: &UserProfile,
) -> Result<()> {
    let row = user::ActiveModel {
        id: Set(user_id.to_string()),
        email: Set(profile.email.clone()),
        name: Set(profile.name.clone()),
        subscription_tier: Set(profile.subscription_tier.as_str().to_string()),
        created_at: Set(Utc::now().timestamp_millis()),
    };
    User::insert(row)
        .on_conflict(
            OnConflict::column(user::Column::Id)
                .update_columns([
                    user::Column::Email,
                    user::Column::Name,
                    user::Column::SubscriptionTier,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn persist<C: ConnectionTrait>(db: &C, user_id: &str, command: Command) -> Result<Applied> {
    match command {
        Command::AddGoal(goal) | Command::UpdateGoal(goal) => {
            upsert_owned(db, records::goal_row(&goal, user_id)?, user_id).await?;
        }
        Command::DeleteGoal(target) => {
            delete_owned::<goal::Entity, _>(db, user_id, &target.id).await?;
        }

        Command::AddAction(action) | Command::UpdateAction(action) => {
            upsert_owned(db, records::action_row(&action, user_id), user_id).await?;
        }
        Command::DeleteAction(target) => {
            delete_owned::<action::Entity, _>(db, user_id, &target.id).await?;
        }
        Command::ToggleAction(target) => toggle_action(db, user_id, &target.id).await?,

        Command::AddHabit(habit) | Command::UpdateHabit(habit) => {
            upsert_owned(db, records::habit_row(&habit, user_id)?, user_id).await?;
        }
        Command::DeleteHabit(target) => {
            delete_owned::<habit::Entity, _>(db, user_id, &target.id).await?;
        }
        Command::LogHabit(log) => log_habit(db, user_id, &log).await?,
        Command::DeleteHabitLog(target) => {
            delete_owned::<habit_log::Entity, _>(db, user_id, &target.id).await?;
        }

        Command::AddCategory(category) | Command::UpdateCategory(category) => {
            let row = records::category_row(&category, user_id, Utc::now().timestamp_millis());
            upsert_owned(db, row, user_id).await?;
        }
        Command::DeleteCategory(target) => {
            delete_owned::<category::Entity, _>(db, user_id, &target.id).await?;
        }

        Command::AddMetric(metric) | Command::UpdateMetric(metric) => {
            upsert_owned(db, records::metric_row(&metric, user_id), user_id).await?;
        }
        Command::DeleteMetric(target) => {
            delete_owned::<metric_definition::Entity, _>(db, user_id, &target.id).await?;
        }
        Command::AddMetricEntry(entry) => {
            upsert_owned(db, records::metric_entry_row(&entry, user_id), user_id).await?;
        }
        Command::DeleteMetricEntry(target) => {
            delete_owned::<metric_entry::Entity, _>(db, user_id, &target.id).await?;
        }

        Command::AddNotification(notification) => {
            let row = records::notification_row(&notification, user_id);
            upsert_owned(db, row, user_id).await?;
        }
        Command::DeleteNotification(target) => {
            delete_owned::<notification::Entity, _>(db, user_id, &target.id).await?;
        }
        Command::ToggleNotificationRead(target) => {
            toggle_notification(db, user_id, &target.id).await?;
        }

        Command::UpdateProfile(profile) => update_profile(db, user_id, &profile).await?,

        Command::SetFilter(_) | Command::SetLoading(_) | Command::LoadSnapshot(_) => {
            return Ok(Applied::Ignored);
        }
    }
    Ok(Applied::Persisted)
}

/// Applies one command for `user_id`.
///
/// When `command_id` is given and was already recorded for this user, the
/// command is skipped and [`Applied::Duplicate`] is returned.
///
/// # Errors
/// Returns a database error if the command cannot be persisted, or a
/// serialization error if a nested field cannot be encoded.
#[instrument(skip(db, command), fields(command_type = %command.command_type().as_wire()))]
pub async fn apply_command(
    db: &DatabaseConnection,
    user_id: &str,
    command: Command,
    command_id: Option<&str>,
) -> Result<Applied> {
    let command_type = command.command_type().as_wire();
    let txn = db.begin().await?;

    if let Some(command_id) = command_id {
        let seen = AppliedCommand::find_by_id(command_id)
            .filter(applied_command::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;
        if seen.is_some() {
            info!(command_id, "Skipping redelivered command");
            txn.rollback().await?;
            return Ok(Applied::Duplicate);
        }
    }

    let outcome = persist(&txn, user_id, command).await?;

    if let (Applied::Persisted, Some(command_id)) = (outcome, command_id) {
        applied_command::ActiveModel {
            id: Set(command_id.to_string()),
            user_id: Set(user_id.to_string()),
            command_type: Set(command_type),
            applied_at: Set(Utc::now().timestamp_millis()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    debug!(?outcome, "Command applied");
    Ok(outcome)
}

/// Drops command-id records older than `retention`. Returns how many were removed.
///
/// # Errors
/// Returns a database error if the delete fails.
pub async fn prune_applied_commands(db: &DatabaseConnection, retention: Duration) -> Result<u64> {
    let cutoff = (Utc::now() - retention).timestamp_millis();
    let result = AppliedCommand::delete_many()
        .filter(applied_command::Column::AppliedAt.lt(cutoff))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        info!(removed = result.rows_affected, "Pruned applied command records");
    }
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        entities::{Goal, MetricDefinition, MetricEntry},
        model::{MetricDefinition as Metric, SubscriptionTier},
        store::IdPayload,
        test_utils::{
            create_test_user, sample_action, sample_goal, sample_habit, sample_habit_log,
            sample_metric_entry, sample_notification, at_noon, setup_with_user,
        },
    };
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_add_then_update_is_an_upsert() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        let mut goal = sample_goal("g1");

        apply_command(&db, "u1", Command::AddGoal(goal.clone()), None).await?;
        goal.title = "Renamed".to_string();
        apply_command(&db, "u1", Command::AddGoal(goal.clone()), None).await?;

        let rows = Goal::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Renamed");
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_never_takes_over_another_users_row() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        create_test_user(&db, "u2").await?;
        apply_command(&db, "u1", Command::AddGoal(sample_goal("g1")), None).await?;

        let mut hijack = sample_goal("g1");
        hijack.title = "Mine now".to_string();
        apply_command(&db, "u2", Command::UpdateGoal(hijack), None).await?;

        let row = Goal::find_by_id("g1").one(&db).await?.unwrap();
        assert_eq!(row.user_id, "u1");
        assert_eq!(row.title, "Goal g1");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_scoped_and_idempotent() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        create_test_user(&db, "u2").await?;
        apply_command(&db, "u1", Command::AddGoal(sample_goal("g1")), None).await?;

        apply_command(&db, "u2", Command::DeleteGoal(IdPayload::new("g1")), None).await?;
        assert_eq!(Goal::find().count(&db).await?, 1);

        apply_command(&db, "u1", Command::DeleteGoal(IdPayload::new("g1")), None).await?;
        apply_command(&db, "u1", Command::DeleteGoal(IdPayload::new("g1")), None).await?;
        assert_eq!(Goal::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_flips_stored_flag() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        apply_command(&db, "u1", Command::AddAction(sample_action("a1")), None).await?;

        apply_command(&db, "u1", Command::ToggleAction(IdPayload::new("a1")), None).await?;
        assert!(Action::find_by_id("a1").one(&db).await?.unwrap().completed);

        apply_command(&db, "u1", Command::ToggleAction(IdPayload::new("a1")), None).await?;
        assert!(!Action::find_by_id("a1").one(&db).await?.unwrap().completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_redelivered_toggle_applies_once() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        let notice = sample_notification("n1", at_noon(1));
        apply_command(&db, "u1", Command::AddNotification(notice), None).await?;

        let toggle = Command::ToggleNotificationRead(IdPayload::new("n1"));
        let first = apply_command(&db, "u1", toggle.clone(), Some("cmd-1")).await?;
        let second = apply_command(&db, "u1", toggle, Some("cmd-1")).await?;

        assert_eq!(first, Applied::Persisted);
        assert_eq!(second, Applied::Duplicate);
        assert!(Notification::find_by_id("n1").one(&db).await?.unwrap().read);
        Ok(())
    }

    #[tokio::test]
    async fn test_log_habit_keeps_one_row_per_day() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        apply_command(&db, "u1", Command::AddHabit(sample_habit("h1")), None).await?;

        let first = sample_habit_log("l1", "h1", 3, true);
        apply_command(&db, "u1", Command::LogHabit(first), None).await?;
        let second = sample_habit_log("l2", "h1", 3, false);
        apply_command(&db, "u1", Command::LogHabit(second), None).await?;

        let rows = HabitLog::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "l1");
        assert!(!rows[0].completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_parent_cascades() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        apply_command(&db, "u1", Command::AddHabit(sample_habit("h1")), None).await?;
        let log = sample_habit_log("l1", "h1", 1, true);
        apply_command(&db, "u1", Command::LogHabit(log), None).await?;
        let metric = Metric {
            id: "m1".to_string(),
            area_id: None,
            name: "Weight".to_string(),
            unit: "kg".to_string(),
        };
        apply_command(&db, "u1", Command::AddMetric(metric), None).await?;
        let entry = sample_metric_entry("e1", "m1", 70.0, 1);
        apply_command(&db, "u1", Command::AddMetricEntry(entry), None).await?;

        apply_command(&db, "u1", Command::DeleteHabit(IdPayload::new("h1")), None).await?;
        apply_command(&db, "u1", Command::DeleteMetric(IdPayload::new("m1")), None).await?;

        assert_eq!(HabitLog::find().count(&db).await?, 0);
        assert_eq!(MetricDefinition::find().count(&db).await?, 0);
        assert_eq!(MetricEntry::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_uses_session_identity() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        let profile = UserProfile {
            id: "someone-else".to_string(),
            email: "new@example.com".to_string(),
            name: "New Name".to_string(),
            subscription_tier: SubscriptionTier::Pro,
        };

        apply_command(&db, "u1", Command::UpdateProfile(profile), None).await?;

        let row = User::find_by_id("u1").one(&db).await?.unwrap();
        assert_eq!(row.name, "New Name");
        assert_eq!(row.subscription_tier, "pro");
        assert_eq!(row.created_at, 0);
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_view_commands_are_ignored() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        let outcome = apply_command(&db, "u1", Command::SetLoading(true), Some("c1")).await?;
        assert_eq!(outcome, Applied::Ignored);
        assert_eq!(AppliedCommand::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_prune_drops_old_records() -> Result<()> {
        let (db, _) = setup_with_user("u1").await?;
        applied_command::ActiveModel {
            id: Set("old".to_string()),
            user_id: Set("u1".to_string()),
            command_type: Set("ADD_GOAL".to_string()),
            applied_at: Set(0),
        }
        .insert(&db)
        .await?;
        apply_command(&db, "u1", Command::AddGoal(sample_goal("g1")), Some("new")).await?;

        let removed = prune_applied_commands(&db, Duration::days(7)).await?;

        assert_eq!(removed, 1);
        assert_eq!(AppliedCommand::find().count(&db).await?, 1);
        Ok(())
    }
}

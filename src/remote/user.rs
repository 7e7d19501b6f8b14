//! Aggregate-root resurrection.
//!
//! A session can outlive its user row (manual cleanup, a restore from an older
//! backup). Every per-user table references `users`, so without a root nothing
//! can be written. The fetch path recreates the root with placeholder fields.

use crate::{
    entities::{User, user},
    errors::Result,
    model::SubscriptionTier,
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, EntityTrait, Set, sea_query::OnConflict};
use tracing::{debug, info};

/// Display name given to a recreated user.
pub const PLACEHOLDER_NAME: &str = "Restored User";

/// Placeholder contact address for a recreated user.
#[must_use]
pub fn placeholder_email(user_id: &str) -> String {
    format!("{user_id}@restored.local")
}

/// Root row for a session, and whether it had to be recreated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredUser {
    /// The user row as stored
    pub user: user::Model,
    /// `true` when the row was missing and has just been inserted
    pub resurrected: bool,
}

/// Makes sure the user row for `user_id` exists, inserting a placeholder if not.
///
/// Concurrent callers may both see the row missing; the insert ignores the
/// conflict and the row is re-read either way.
///
/// # Errors
/// Returns a database error if the lookup or insert fails.
pub async fn ensure_user<C>(db: &C, user_id: &str) -> Result<EnsuredUser>
where
    C: ConnectionTrait,
{
    if let Some(existing) = User::find_by_id(user_id).one(db).await? {
        debug!(user_id, "User root present");
        return Ok(EnsuredUser {
            user: existing,
            resurrected: false,
        });
    }

    let placeholder = user::ActiveModel {
        id: Set(user_id.to_string()),
        email: Set(placeholder_email(user_id)),
        name: Set(PLACEHOLDER_NAME.to_string()),
        subscription_tier: Set(SubscriptionTier::Free.as_str().to_string()),
        created_at: Set(Utc::now().timestamp_millis()),
    };
    User::insert(placeholder)
        .on_conflict(OnConflict::column(user::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("user {user_id}")))?;
    info!(user_id, "Recreated missing user root for an authenticated session");

    Ok(EnsuredUser {
        user,
        resurrected: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{setup_test_db, setup_with_user};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_existing_user_is_left_alone() -> Result<()> {
        let (db, original) = setup_with_user("alice").await?;

        let ensured = ensure_user(&db, "alice").await?;

        assert!(!ensured.resurrected);
        assert_eq!(ensured.user, original);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_user_is_recreated_with_placeholders() -> Result<()> {
        let db = setup_test_db().await?;

        let ensured = ensure_user(&db, "ghost").await?;

        assert!(ensured.resurrected);
        assert_eq!(ensured.user.email, "ghost@restored.local");
        assert_eq!(ensured.user.name, PLACEHOLDER_NAME);
        assert_eq!(ensured.user.subscription_tier, "free");

        let again = ensure_user(&db, "ghost").await?;
        assert!(!again.resurrected);
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }
}

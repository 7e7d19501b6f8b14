//! Applied command entity - ids of commands already persisted.
//!
//! Lets the command-apply path acknowledge a redelivered command without running
//! it a second time, which matters for toggles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Applied command database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applied_commands")]
pub struct Model {
    /// Per-dispatch command id chosen by the client
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Wire tag, kept for diagnostics
    pub command_type: String,
    /// When the command was applied, epoch milliseconds
    pub applied_at: i64,
}

/// Each record belongs to one user
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

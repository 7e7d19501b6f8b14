//! Action entity - tasks, optionally attached to a goal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Action database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "actions")]
pub struct Model {
    /// Client-generated id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Goal served by this action
    pub goal_id: Option<String>,
    /// Task text
    pub title: String,
    /// Done flag; flipped by read-modify-write toggles
    pub completed: bool,
    /// Optional due day, epoch milliseconds
    pub due_date: Option<i64>,
    /// Creation instant, epoch milliseconds
    pub created_at: i64,
}

/// Each action belongs to one user
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

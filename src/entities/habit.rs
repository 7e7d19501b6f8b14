//! Habit entity - recurring behaviours.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Habit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    /// Client-generated id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Life area (category) id
    pub area_id: Option<String>,
    /// Habit name
    pub title: String,
    /// Scheduled weekdays as a JSON array, e.g. `["Mon","Wed"]`
    #[sea_orm(column_type = "Text")]
    pub active_days: String,
    /// Last streak the client computed
    pub streak: i32,
    /// Creation instant, epoch milliseconds
    pub created_at: i64,
}

/// Relationships of a habit
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
    /// Daily logs
    #[sea_orm(has_many = "super::habit_log::Entity")]
    Logs,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::habit_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Habit log entity - one row per habit and calendar day.
//!
//! `(habit_id, date)` carries a unique index created alongside the tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Habit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habit_logs")]
pub struct Model {
    /// Client-generated id of the first log for this slot
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Logged habit
    pub habit_id: String,
    /// Calendar day as midnight UTC, epoch milliseconds
    pub date: i64,
    /// Done that day
    pub completed: bool,
}

/// Relationships of a habit log
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
    /// Logged habit; logs go when the habit goes
    #[sea_orm(
        belongs_to = "super::habit::Entity",
        from = "Column::HabitId",
        to = "super::habit::Column::Id",
        on_delete = "Cascade"
    )]
    Habit,
}

impl Related<super::habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Category entity - a user's life areas (Health, Career, ...).
//!
//! `title` is the natural key the seeder compares against the default catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Client- or seeder-generated id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display title, unique per user by convention
    pub title: String,
    /// Icon; exposed to clients as both `icon` and `emoji`
    pub icon: Option<String>,
    /// Optional accent colour
    pub color: Option<String>,
    /// Display position
    pub sort_order: i32,
    /// Creation instant, epoch milliseconds
    pub created_at: i64,
}

/// Each category belongs to one user
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning user; rows go when the user goes
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

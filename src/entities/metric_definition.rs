//! Metric definition entity - something a user measures, e.g. weight in kg.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metric definition database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metric_definitions")]
pub struct Model {
    /// Client- or seeder-generated id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Category the metric belongs to; `(category_id, name)` is the seeder's natural key
    pub category_id: Option<String>,
    /// Display name
    pub name: String,
    /// Unit label
    pub unit: String,
}

/// Relationships of a metric definition
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
    /// Recorded measurements
    #[sea_orm(has_many = "super::metric_entry::Entity")]
    Entries,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::metric_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

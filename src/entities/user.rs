//! User entity - the aggregate root every per-user row references.
//!
//! Deleting a user cascades to all of their rows. A missing root for a still-valid
//! session is recreated on the next fetch-all-and-heal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Id issued by the auth service
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Contact address
    pub email: String,
    /// Display name
    pub name: String,
    /// `"free"` or `"pro"`
    pub subscription_tier: String,
    /// Creation instant, epoch milliseconds
    pub created_at: i64,
}

/// One user owns every per-user table
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many goals
    #[sea_orm(has_many = "super::goal::Entity")]
    Goals,
    /// One user has many actions
    #[sea_orm(has_many = "super::action::Entity")]
    Actions,
    /// One user has many categories
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
    /// One user has many metric definitions
    #[sea_orm(has_many = "super::metric_definition::Entity")]
    MetricDefinitions,
    /// One user has many habits
    #[sea_orm(has_many = "super::habit::Entity")]
    Habits,
    /// One user has many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl Related<super::habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habits.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Metric entry entity - one measurement on one day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metric entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metric_entries")]
pub struct Model {
    /// Client-generated id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Measured metric
    pub metric_id: String,
    /// Measured value
    pub value: f64,
    /// Calendar day as midnight UTC, epoch milliseconds
    pub date: i64,
    /// Optional remark
    pub note: Option<String>,
}

/// Relationships of a metric entry
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
    /// Measured metric; entries go when the definition goes
    #[sea_orm(
        belongs_to = "super::metric_definition::Entity",
        from = "Column::MetricId",
        to = "super::metric_definition::Column::Id",
        on_delete = "Cascade"
    )]
    MetricDefinition,
}

impl Related<super::metric_definition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricDefinition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

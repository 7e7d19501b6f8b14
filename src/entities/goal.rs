//! Goal entity - goals with an optional metric linkage.
//!
//! `sub_goals` holds the checklist as a JSON array; `progress` is whatever the
//! client last computed and is re-derived by clients on load.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Goal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    /// Client-generated id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Life area (category) id
    pub area_id: Option<String>,
    /// Short title
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// Lifecycle state, e.g. `"active"` or `"completed"`
    pub status: String,
    /// `"vision"`, `"strategic"` or `"tactical"`
    pub goal_type: String,
    /// Linked metric definition id
    pub target_metric_id: Option<String>,
    /// Metric value when the goal was set
    pub metric_start_value: f64,
    /// Metric value that counts as done
    pub metric_target_value: f64,
    /// Latest known metric value
    pub metric_current_value: f64,
    /// `"increase"`, `"decrease"` or `"maintain"`
    pub metric_direction: String,
    /// Completion percentage
    pub progress: i32,
    /// Serialized checklist
    #[sea_orm(column_type = "Text")]
    pub sub_goals: String,
    /// Optional due day, epoch milliseconds
    pub deadline: Option<i64>,
    /// Creation instant, epoch milliseconds
    pub created_at: i64,
}

/// Each goal belongs to one user
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

//! Client-facing domain types.
//!
//! These are the shapes the local store holds and the wire carries. The server
//! converts its storage rows into these before answering, so field names here are
//! the client vocabulary (camelCase), not the column names.

/// Flexible date codecs and epoch conversions
pub mod dates;
/// Goals, sub-goals and actions
pub mod goal;
/// Habits and their daily logs
pub mod habit;
/// Metric definitions and entries
pub mod metric;

pub use goal::{Action, Goal, GoalStatus, GoalType, MetricDirection, SubGoal};
pub use habit::{Habit, HabitLog};
pub use metric::{MetricDefinition, MetricEntry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

/// Client-generated unique identifier.
pub type EntityId = String;

/// Icon shown for categories that never had one set.
pub const FALLBACK_ICON: &str = "🎯";

fn fallback_icon() -> String {
    FALLBACK_ICON.to_string()
}

/// Billing tier of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    /// Default tier
    #[default]
    Free,
    /// Paid tier
    Pro,
}

impl SubscriptionTier {
    /// Storage spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    /// Unknown spellings fall back to [`SubscriptionTier::Free`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == "pro" { Self::Pro } else { Self::Free }
    }
}

/// The aggregate root as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Id issued by the auth service
    pub id: EntityId,
    /// Contact address
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Billing tier
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
}

/// A life area grouping goals, habits and metrics.
///
/// Serialises its icon twice, as `icon` and as the `emoji` alias older clients
/// read. Deserialisation only looks at `icon`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Client-generated id
    pub id: EntityId,
    /// Natural key used by the seeder
    pub title: String,
    /// Display icon
    #[serde(default = "fallback_icon")]
    pub icon: String,
    /// Optional accent colour
    #[serde(default)]
    pub color: Option<String>,
    /// Display position
    #[serde(rename = "order", default)]
    pub sort_order: i32,
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Category", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("icon", &self.icon)?;
        state.serialize_field("emoji", &self.icon)?;
        state.serialize_field("color", &self.color)?;
        state.serialize_field("order", &self.sort_order)?;
        state.end()
    }
}

/// An in-app notice for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Client-generated id
    pub id: EntityId,
    /// Headline
    pub title: String,
    /// Body text
    #[serde(default)]
    pub message: String,
    /// Seen flag, flipped by the toggle command
    #[serde(default)]
    pub read: bool,
    /// Creation instant; drives the retention window
    #[serde(default = "Utc::now", with = "dates::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Everything the server holds for one user, as returned by fetch-all-and-heal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// The aggregate root
    pub user: Option<UserProfile>,
    /// All goals
    pub goals: Vec<Goal>,
    /// All actions
    pub actions: Vec<Action>,
    /// All life areas
    pub categories: Vec<Category>,
    /// All metric definitions
    pub metrics: Vec<MetricDefinition>,
    /// All metric entries
    pub metric_entries: Vec<MetricEntry>,
    /// All habits
    pub habits: Vec<Habit>,
    /// All habit logs
    pub habit_logs: Vec<HabitLog>,
    /// All notifications
    pub notifications: Vec<Notification>,
}

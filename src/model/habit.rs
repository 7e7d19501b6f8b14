use super::{EntityId, dates};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A recurring behaviour whose streak is derived from its logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Client-generated id
    pub id: EntityId,
    /// Owning life area (category)
    #[serde(default)]
    pub area_id: Option<EntityId>,
    /// Habit name
    pub title: String,
    /// Weekdays the habit is scheduled on; stored as a serialized blob
    #[serde(default)]
    pub active_days: Vec<Weekday>,
    /// Consecutive completed days ending today or yesterday (derived)
    #[serde(default)]
    pub streak: u32,
    /// Creation instant
    #[serde(default = "Utc::now", with = "dates::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Completion record for one habit on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    /// Client-generated id
    pub id: EntityId,
    /// Habit being logged
    pub habit_id: EntityId,
    /// Calendar day
    #[serde(with = "dates::calendar_day")]
    pub date: NaiveDate,
    /// Whether the habit was done that day
    #[serde(default)]
    pub completed: bool,
}

impl HabitLog {
    /// Natural key: at most one log per habit and day.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.habit_id == other.habit_id && self.date == other.date
    }
}

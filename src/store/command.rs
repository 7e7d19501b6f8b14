//! The closed command vocabulary shared by the local store and the remote store.
//!
//! On the wire a command is `{"commandType": "ADD_GOAL", "payload": {...}}`, which
//! is exactly serde's adjacently tagged representation of [`Command`].

use crate::{
    errors::{Error, Result},
    model::{
        Action, Category, EntityId, Goal, Habit, HabitLog, MetricDefinition, MetricEntry,
        Notification, Snapshot, UserProfile,
    },
    store::state::ViewFilter,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of delete and toggle commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdPayload {
    /// Target entity
    pub id: EntityId,
}

impl IdPayload {
    /// Wraps an id.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self { id: id.into() }
    }
}

/// Every state transition the application knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "commandType",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum Command {
    /// Create a goal
    AddGoal(Goal),
    /// Replace a goal wholesale
    UpdateGoal(Goal),
    /// Remove a goal
    DeleteGoal(IdPayload),

    /// Create an action
    AddAction(Action),
    /// Replace an action wholesale
    UpdateAction(Action),
    /// Remove an action
    DeleteAction(IdPayload),
    /// Flip an action's `completed` flag
    ToggleAction(IdPayload),

    /// Create a habit
    AddHabit(Habit),
    /// Replace a habit wholesale
    UpdateHabit(Habit),
    /// Remove a habit and its logs
    DeleteHabit(IdPayload),
    /// Record (or overwrite) a habit's log for one day
    LogHabit(HabitLog),
    /// Remove a single habit log
    DeleteHabitLog(IdPayload),

    /// Create a life area
    AddCategory(Category),
    /// Replace a life area wholesale
    UpdateCategory(Category),
    /// Remove a life area
    DeleteCategory(IdPayload),

    /// Create a metric definition
    AddMetric(MetricDefinition),
    /// Replace a metric definition wholesale
    UpdateMetric(MetricDefinition),
    /// Remove a metric definition and its entries
    DeleteMetric(IdPayload),
    /// Record a measurement
    AddMetricEntry(MetricEntry),
    /// Remove a measurement
    DeleteMetricEntry(IdPayload),

    /// Create a notification
    AddNotification(Notification),
    /// Remove a notification
    DeleteNotification(IdPayload),
    /// Flip a notification's `read` flag
    ToggleNotificationRead(IdPayload),

    /// Replace the user's own profile
    UpdateProfile(UserProfile),

    /// Change the list filter (view only)
    SetFilter(ViewFilter),
    /// Show or hide the loading indicator (view only)
    SetLoading(bool),
    /// Replace all collections with a server snapshot (view only)
    LoadSnapshot(Box<Snapshot>),
}

/// The bare `commandType` tag, used to route incoming requests before their payload
/// is decoded. Unknown tags decode to [`CommandType::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum CommandType {
    AddGoal,
    UpdateGoal,
    DeleteGoal,
    AddAction,
    UpdateAction,
    DeleteAction,
    ToggleAction,
    AddHabit,
    UpdateHabit,
    DeleteHabit,
    LogHabit,
    DeleteHabitLog,
    AddCategory,
    UpdateCategory,
    DeleteCategory,
    AddMetric,
    UpdateMetric,
    DeleteMetric,
    AddMetricEntry,
    DeleteMetricEntry,
    AddNotification,
    DeleteNotification,
    ToggleNotificationRead,
    UpdateProfile,
    SetFilter,
    SetLoading,
    LoadSnapshot,
    #[serde(other)]
    Unrecognized,
}

impl CommandType {
    /// Wire spelling, e.g. `"ADD_GOAL"`.
    #[must_use]
    pub fn as_wire(self) -> String {
        match serde_json::to_value(self) {
            Ok(Value::String(tag)) => tag,
            _ => "UNRECOGNIZED".to_string(),
        }
    }
}

impl Command {
    /// Tag of this command.
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        match self {
            Self::AddGoal(_) => CommandType::AddGoal,
            Self::UpdateGoal(_) => CommandType::UpdateGoal,
            Self::DeleteGoal(_) => CommandType::DeleteGoal,
            Self::AddAction(_) => CommandType::AddAction,
            Self::UpdateAction(_) => CommandType::UpdateAction,
            Self::DeleteAction(_) => CommandType::DeleteAction,
            Self::ToggleAction(_) => CommandType::ToggleAction,
            Self::AddHabit(_) => CommandType::AddHabit,
            Self::UpdateHabit(_) => CommandType::UpdateHabit,
            Self::DeleteHabit(_) => CommandType::DeleteHabit,
            Self::LogHabit(_) => CommandType::LogHabit,
            Self::DeleteHabitLog(_) => CommandType::DeleteHabitLog,
            Self::AddCategory(_) => CommandType::AddCategory,
            Self::UpdateCategory(_) => CommandType::UpdateCategory,
            Self::DeleteCategory(_) => CommandType::DeleteCategory,
            Self::AddMetric(_) => CommandType::AddMetric,
            Self::UpdateMetric(_) => CommandType::UpdateMetric,
            Self::DeleteMetric(_) => CommandType::DeleteMetric,
            Self::AddMetricEntry(_) => CommandType::AddMetricEntry,
            Self::DeleteMetricEntry(_) => CommandType::DeleteMetricEntry,
            Self::AddNotification(_) => CommandType::AddNotification,
            Self::DeleteNotification(_) => CommandType::DeleteNotification,
            Self::ToggleNotificationRead(_) => CommandType::ToggleNotificationRead,
            Self::UpdateProfile(_) => CommandType::UpdateProfile,
            Self::SetFilter(_) => CommandType::SetFilter,
            Self::SetLoading(_) => CommandType::SetLoading,
            Self::LoadSnapshot(_) => CommandType::LoadSnapshot,
        }
    }

    /// Whether the command is forwarded to the remote store. View-only commands
    /// (filters, loading flag, snapshot load) never leave the client.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        !matches!(
            self,
            Self::SetFilter(_) | Self::SetLoading(_) | Self::LoadSnapshot(_)
        )
    }

    /// Id of the entity the command targets, if it targets one.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::AddGoal(goal) | Self::UpdateGoal(goal) => Some(&goal.id),
            Self::AddAction(action) | Self::UpdateAction(action) => Some(&action.id),
            Self::AddHabit(habit) | Self::UpdateHabit(habit) => Some(&habit.id),
            Self::LogHabit(log) => Some(&log.habit_id),
            Self::AddCategory(category) | Self::UpdateCategory(category) => Some(&category.id),
            Self::AddMetric(metric) | Self::UpdateMetric(metric) => Some(&metric.id),
            Self::AddMetricEntry(entry) => Some(&entry.id),
            Self::AddNotification(notification) => Some(&notification.id),
            Self::UpdateProfile(profile) => Some(&profile.id),
            Self::DeleteGoal(target)
            | Self::DeleteAction(target)
            | Self::ToggleAction(target)
            | Self::DeleteHabit(target)
            | Self::DeleteHabitLog(target)
            | Self::DeleteCategory(target)
            | Self::DeleteMetric(target)
            | Self::DeleteMetricEntry(target)
            | Self::DeleteNotification(target)
            | Self::ToggleNotificationRead(target) => Some(&target.id),
            Self::SetFilter(_) | Self::SetLoading(_) | Self::LoadSnapshot(_) => None,
        }
    }

    /// Coalescing key for the outbound queue: command type plus target entity.
    ///
    /// Habit logs are keyed by habit and day, matching their natural key.
    #[must_use]
    pub fn idempotency_key(&self) -> Option<String> {
        if !self.is_synced() {
            return None;
        }
        let kind = self.command_type().as_wire();
        match self {
            Self::LogHabit(log) => Some(format!("{kind}:{}:{}", log.habit_id, log.date)),
            other => other.entity_id().map(|id| format!("{kind}:{id}")),
        }
    }

    /// Serialises into the request body sent to the remote store.
    pub fn to_wire(&self, command_id: &str) -> Result<Value> {
        let mut body = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut body {
            fields.insert(
                "commandId".to_string(),
                Value::String(command_id.to_string()),
            );
        }
        Ok(body)
    }
}

/// Routing header of an incoming command request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandHeader {
    /// Tag, possibly unrecognised
    pub command_type: CommandType,
    /// Per-dispatch id used to drop redelivered commands
    #[serde(default)]
    pub command_id: Option<String>,
}

/// A decoded incoming request.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A known command with a well-formed payload
    Known {
        /// The decoded command
        command: Command,
        /// Per-dispatch id, when the sender supplied one
        command_id: Option<String>,
    },
    /// A tag outside the vocabulary; accepted and ignored
    Unrecognized(String),
}

impl Incoming {
    /// Decodes a request body. Unknown tags are not an error; a known tag with a
    /// payload that does not fit its variant is.
    pub fn decode(body: Value) -> Result<Self> {
        let header = CommandHeader::deserialize(&body).map_err(|e| Error::InvalidPayload {
            message: format!("missing or malformed commandType: {e}"),
        })?;

        if header.command_type == CommandType::Unrecognized {
            let raw = body
                .get("commandType")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Ok(Self::Unrecognized(raw));
        }

        let command = Command::deserialize(&body).map_err(|e| Error::InvalidPayload {
            message: format!("{}: {e}", header.command_type.as_wire()),
        })?;
        Ok(Self::Known {
            command,
            command_id: header.command_id,
        })
    }
}

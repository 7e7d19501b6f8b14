//! Goals, their sub-goal checklist, and the actions (tasks) that serve them.

use super::{EntityId, dates};
use crate::derived;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Being worked on
    #[default]
    Active,
    /// Temporarily on hold
    Paused,
    /// Target met
    Achieved,
    /// Deadline passed without meeting the target
    NotAchieved,
    /// Given up
    Abandoned,
    /// Closed by the user; progress is frozen at 100
    Completed,
}

impl GoalStatus {
    /// Storage spelling, identical to the wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Achieved => "achieved",
            Self::NotAchieved => "not_achieved",
            Self::Abandoned => "abandoned",
            Self::Completed => "completed",
        }
    }

    /// Unknown spellings fall back to [`GoalStatus::Active`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "paused" => Self::Paused,
            "achieved" => Self::Achieved,
            "not_achieved" => Self::NotAchieved,
            "abandoned" => Self::Abandoned,
            "completed" => Self::Completed,
            _ => Self::Active,
        }
    }
}

/// Planning horizon of a goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// Long-range aspiration
    Vision,
    /// Multi-month objective
    Strategic,
    /// Short-term, concrete target
    #[default]
    Tactical,
}

impl GoalType {
    /// Storage spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vision => "vision",
            Self::Strategic => "strategic",
            Self::Tactical => "tactical",
        }
    }

    /// Unknown spellings fall back to [`GoalType::Tactical`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "vision" => Self::Vision,
            "strategic" => Self::Strategic,
            _ => Self::Tactical,
        }
    }
}

/// Which way the linked metric is expected to move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    /// Target is above the start value
    #[default]
    Increase,
    /// Target is below the start value
    Decrease,
    /// Hold the value steady
    Maintain,
}

impl MetricDirection {
    /// Storage spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Maintain => "maintain",
        }
    }

    /// Unknown spellings fall back to [`MetricDirection::Increase`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "decrease" => Self::Decrease,
            "maintain" => Self::Maintain,
            _ => Self::Increase,
        }
    }
}

/// One item of a goal's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGoal {
    /// Client-generated id
    pub id: EntityId,
    /// Checklist text
    pub title: String,
    /// Ticked off
    #[serde(default)]
    pub completed: bool,
}

/// A goal, optionally tracking a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Client-generated id
    pub id: EntityId,
    /// Owning life area (category)
    #[serde(default)]
    pub area_id: Option<EntityId>,
    /// Short title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Lifecycle state
    #[serde(default)]
    pub status: GoalStatus,
    /// Planning horizon
    #[serde(rename = "type", default)]
    pub goal_type: GoalType,
    /// Metric definition whose entries drive `progress`
    #[serde(default)]
    pub target_metric_id: Option<EntityId>,
    /// Metric value when the goal was set
    #[serde(default)]
    pub metric_start_value: f64,
    /// Metric value that counts as done
    #[serde(default)]
    pub metric_target_value: f64,
    /// Latest known metric value
    #[serde(default)]
    pub metric_current_value: f64,
    /// Expected direction of travel
    #[serde(default)]
    pub metric_direction: MetricDirection,
    /// Completion percentage (0-100), derived while a metric is linked
    #[serde(default)]
    pub progress: u8,
    /// Ordered checklist, stored as a serialized blob
    #[serde(default)]
    pub sub_goals: Vec<SubGoal>,
    /// Optional due day
    #[serde(default, with = "dates::calendar_day_opt")]
    pub deadline: Option<NaiveDate>,
    /// Creation instant
    #[serde(default = "Utc::now", with = "dates::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Whether `progress` is currently a function of the linked metric.
    ///
    /// Completed goals keep their frozen progress even when linked.
    #[must_use]
    pub fn tracks_metric(&self) -> bool {
        self.target_metric_id.is_some() && self.status != GoalStatus::Completed
    }

    /// Recomputes `progress` from the metric fields when the goal tracks a metric.
    pub fn refresh_progress(&mut self) {
        if self.tracks_metric() {
            self.progress = derived::compute_goal_progress(
                self.metric_current_value,
                self.metric_start_value,
                self.metric_target_value,
            );
        }
    }

    /// Whether the current metric value satisfies the target in the goal's direction.
    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.target_metric_id.is_some()
            && derived::is_target_reached(
                self.metric_current_value,
                self.metric_target_value,
                self.metric_direction,
            )
    }
}

/// A task, optionally attached to a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Client-generated id
    pub id: EntityId,
    /// Goal this action contributes to
    #[serde(default)]
    pub goal_id: Option<EntityId>,
    /// Task text
    pub title: String,
    /// Done flag, flipped by the toggle command
    #[serde(default)]
    pub completed: bool,
    /// Optional due day
    #[serde(default, with = "dates::calendar_day_opt")]
    pub due_date: Option<NaiveDate>,
    /// Creation instant
    #[serde(default = "Utc::now", with = "dates::timestamp")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_goal_decodes_client_payload() {
        let goal: Goal = serde_json::from_str(
            r#"{
                "id": "g1",
                "areaId": "health",
                "title": "Lose weight",
                "status": "active",
                "type": "strategic",
                "targetMetricId": "weight",
                "metricStartValue": 70,
                "metricTargetValue": 60,
                "metricCurrentValue": 65,
                "metricDirection": "decrease",
                "subGoals": [{"id": "s1", "title": "Join a gym"}],
                "createdAt": 1704067200000
            }"#,
        )
        .unwrap();

        assert_eq!(goal.goal_type, GoalType::Strategic);
        assert_eq!(goal.metric_direction, MetricDirection::Decrease);
        assert!(!goal.sub_goals[0].completed);
        assert_eq!(goal.progress, 0);
        assert!(goal.tracks_metric());
    }

    #[test]
    fn test_refresh_progress_skips_completed_goals() {
        let mut goal: Goal = serde_json::from_str(
            r#"{"id":"g","title":"t","status":"completed","targetMetricId":"m",
                "metricStartValue":0,"metricTargetValue":10,"metricCurrentValue":1,"progress":100}"#,
        )
        .unwrap();
        goal.refresh_progress();
        assert_eq!(goal.progress, 100);

        goal.status = GoalStatus::Active;
        goal.refresh_progress();
        assert_eq!(goal.progress, 10);
    }

    #[test]
    fn test_status_spellings_round_trip() {
        for status in [
            GoalStatus::Active,
            GoalStatus::Paused,
            GoalStatus::Achieved,
            GoalStatus::NotAchieved,
            GoalStatus::Abandoned,
            GoalStatus::Completed,
        ] {
            assert_eq!(GoalStatus::parse(status.as_str()), status);
        }
        assert_eq!(GoalStatus::parse("bogus"), GoalStatus::Active);
    }
}

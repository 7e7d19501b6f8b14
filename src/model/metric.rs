use super::{EntityId, dates};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Something measurable, e.g. body weight in kg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
    /// Client-generated id
    pub id: EntityId,
    /// Owning life area (category)
    #[serde(default)]
    pub area_id: Option<EntityId>,
    /// Display name, unique per area
    pub name: String,
    /// Unit label
    #[serde(default)]
    pub unit: String,
}

/// One measurement of a metric on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricEntry {
    /// Client-generated id
    pub id: EntityId,
    /// Metric definition measured
    pub metric_id: EntityId,
    /// Measured value
    pub value: f64,
    /// Calendar day of the measurement
    #[serde(with = "dates::calendar_day")]
    pub date: NaiveDate,
    /// Optional remark
    #[serde(default)]
    pub note: Option<String>,
}

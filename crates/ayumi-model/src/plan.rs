use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumString;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, ToSchema, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(deny_unknown_fields)]
pub enum PlanStatus {
    #[default]
    Assigned,
    Scheduled,
    Archived,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, ToSchema, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(deny_unknown_fields)]
pub enum PlanType {
    #[default]
    Assign,
    Suggested,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, ToSchema, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(deny_unknown_fields)]
pub enum PlanEntityType {
    Lo,
    Award,
}

/// Action label recorded with a plan revision and carried in event context.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, ToSchema, Deserialize, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PlanAction {
    Assigned,
    Reassigned,
    AutoReassigned,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigner_id: Option<Uuid>,
    pub portal_id: Uuid,
    pub entity_type: PlanEntityType,
    pub entity_id: Uuid,
    pub status: PlanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub plan_type: PlanType,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlanReference {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub source_type: String,
    pub source_id: Uuid,
    pub active: bool,
}

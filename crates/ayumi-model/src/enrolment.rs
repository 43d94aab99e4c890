use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::EnumString;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, ToSchema, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(deny_unknown_fields)]
pub enum EnrolmentStatus {
    #[default]
    NotStarted,
    InProgress,
    Pending,
    Completed,
    Expired,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, ToSchema, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(deny_unknown_fields)]
pub enum PassState {
    #[default]
    Unset,
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, Deserialize)]
pub struct Enrolment {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<Uuid>,
    pub lo_id: Uuid,
    pub taken_portal_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_enrolment_id: Option<Uuid>,
    pub status: EnrolmentStatus,
    pub pass: PassState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EnrolmentRevision {
    pub id: Uuid,
    pub enrolment_id: Uuid,
    pub status: EnrolmentStatus,
    pub pass: PassState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created: DateTime<Utc>,
}

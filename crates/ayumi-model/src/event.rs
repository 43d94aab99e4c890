use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Topics the engines publish on. Delivery is at-least-once and
/// fire-and-forget; consumers deduplicate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, ToSchema, Deserialize)]
pub enum EventTopic {
    #[serde(rename = "PLAN_CREATE")]
    PlanCreate,
    #[serde(rename = "PLAN_UPDATE")]
    PlanUpdate,
    #[serde(rename = "PLAN_DELETE")]
    PlanDelete,
    #[serde(rename = "ENROLMENT_UPDATE")]
    EnrolmentUpdate,
    #[serde(rename = "ENROLMENT_DELETE")]
    EnrolmentDelete,
    #[serde(rename = "GROUP_ASSIGN_CREATE")]
    GroupAssignCreate,
    #[serde(rename = "GROUP_ASSIGN_DELETE")]
    GroupAssignDelete,
    #[serde(rename = "DO_ENROLMENT_PLAN_CREATE")]
    DoEnrolmentPlanCreate,
    #[serde(rename = "RO_DELETE")]
    RoDelete,
}

/// The action that triggered an event, carried in its `_context`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, ToSchema, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventAction {
    Assigned,
    Reassigned,
    AutoReassigned,
    Completed,
    Update,
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema, Deserialize)]
pub struct EventContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<EventAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    /// Free-form note bag supplied with the triggering request.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

/// One message per affected entity per logical operation. `before`/`after`
/// carry the persisted field diff; `embedded_original` snapshots a superseded
/// entity on creation events that replace one.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, Deserialize)]
pub struct EventMessage {
    pub topic: EventTopic,
    pub entity_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub after: Option<Value>,
    #[serde(rename = "_context")]
    pub context: EventContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub embedded_original: Option<Value>,
}

impl EventMessage {
    #[must_use]
    pub fn new(topic: EventTopic, entity_id: Uuid) -> Self {
        Self {
            topic,
            entity_id,
            before: None,
            after: None,
            context: EventContext::default(),
            embedded_original: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(EventTopic::PlanCreate).unwrap(), "PLAN_CREATE");
        assert_eq!(
            serde_json::to_value(EventTopic::DoEnrolmentPlanCreate).unwrap(),
            "DO_ENROLMENT_PLAN_CREATE"
        );
        assert_eq!(
            serde_json::to_value(EventAction::AutoReassigned).unwrap(),
            "auto-reassigned"
        );
    }

    #[test]
    fn test_context_key_and_sparse_fields() {
        let mut message = EventMessage::new(EventTopic::EnrolmentUpdate, Uuid::new_v4());
        message.context.action = Some(EventAction::Completed);

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["_context"]["action"], "completed");
        // Unset optional fields stay off the wire entirely.
        assert!(value.get("before").is_none());
        assert!(value["_context"].get("notify").is_none());
    }
}

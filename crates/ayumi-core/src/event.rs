use async_trait::async_trait;
use ayumi_entity::{enrolment::Model as Enrolment, plan::Model as Plan};
use ayumi_model::enrolment::{EnrolmentStatus, PassState};
use ayumi_model::event::EventMessage;
use ayumi_model::plan::PlanStatus;
use ayumi_model_tools::convert::IntoModel;
use chrono::NaiveDateTime;
use serde_json::{Value, json};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Message could not be serialized")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Outbound side of the engines. Delivery is at-least-once and
/// fire-and-forget; a failed emit is logged by the caller, never surfaced.
/// Implementations must not be handed messages before the transaction that
/// produced them has committed — the engines guarantee that.
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, message: EventMessage) -> Result<(), EmitError>;
}

/// Collects messages in memory, in emission order.
#[derive(Default)]
pub struct RecordingEmitter {
    messages: Mutex<Vec<EventMessage>>,
}

impl RecordingEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<EventMessage> {
        self.messages.lock().expect("emitter lock poisoned").clone()
    }
}

#[async_trait]
impl EventEmitter for RecordingEmitter {
    async fn emit(&self, message: EventMessage) -> Result<(), EmitError> {
        self.messages.lock().expect("emitter lock poisoned").push(message);
        Ok(())
    }
}

fn date_json(date: Option<NaiveDateTime>) -> Value {
    date.map_or(Value::Null, |d| json!(d.and_utc()))
}

/// The diffable fields of an enrolment, as they go out on the wire.
#[must_use]
pub fn enrolment_state(enrolment: &Enrolment) -> Value {
    let status: EnrolmentStatus = enrolment.status.into_model();
    let pass: PassState = enrolment.pass.into_model();
    json!({
        "status": status,
        "pass": pass,
        "result": enrolment.result,
        "due_date": date_json(enrolment.due_date),
    })
}

/// The diffable fields of a plan.
#[must_use]
pub fn plan_state(plan: &Plan) -> Value {
    let status: PlanStatus = plan.status.into_model();
    json!({
        "status": status,
        "assigner_id": plan.assigner_id,
        "due_date": date_json(plan.due_date),
    })
}

/// Full snapshot of a plan for `embedded_original` on supersession events.
#[must_use]
pub fn plan_snapshot(plan: &Plan) -> Value {
    let status: PlanStatus = plan.status.into_model();
    json!({
        "id": plan.id,
        "user_id": plan.user_id,
        "assigner_id": plan.assigner_id,
        "portal_id": plan.portal_id,
        "entity_id": plan.entity_id,
        "status": status,
        "due_date": date_json(plan.due_date),
    })
}

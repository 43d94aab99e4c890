pub mod error;

use crate::authorize::{Authorizer, ManageTarget};
use crate::event::{EventEmitter, plan_snapshot, plan_state};
use crate::tree::TreeReader;
use ayumi_db::enrolment;
use ayumi_db::group;
use ayumi_db::plan::{Mutation, NewPlan, Query};
use ayumi_db::user;
use ayumi_db::util::FlattenTransactionResultExt;
use ayumi_entity::enrolment::Model as Enrolment;
use ayumi_entity::plan::{EntityType, Model as Plan, PlanType, Status, reference::SourceType, revision::Action};
use ayumi_model::event::{EventAction, EventContext, EventMessage, EventTopic};
use ayumi_utils::date::{DueDateInput, parse_due_date};
use chrono::{NaiveDateTime, Utc};
use error::ReconcileError;
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde_json::Value;
use std::sync::Arc;
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// API version of the assignment surface. Version 2 requires a due date and
/// skips the enrolment revision write while the enrolment has not started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct AssignOptions {
    /// Carried in event context only; notification delivery happens
    /// downstream.
    #[builder(default = true)]
    pub notify: bool,
    /// Provenance of a bulk action, recorded as a plan reference.
    #[builder(default)]
    pub source: Option<(SourceType, Uuid)>,
    /// Free-form note bag attached to the emitted events.
    #[builder(default)]
    pub data: Option<Value>,
    #[builder(default)]
    pub version: ApiVersion,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct AssignRequest {
    pub user_id: Uuid,
    pub portal_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub due_date: Option<DueDateInput>,
    pub assigner_id: Option<Uuid>,
    pub status: Status,
    pub options: AssignOptions,
}

/// Key for the automated reassignment path.
#[derive(Debug, Clone, Copy)]
pub struct LoKey {
    pub lo_id: Uuid,
    pub user_id: Uuid,
    pub portal_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct ReassignRequest {
    /// Exactly one plan id; more than one is rejected outright.
    pub plan_ids: Vec<Uuid>,
    pub lo_key: Option<LoKey>,
    pub due_date: DueDateInput,
    /// Effective revision timestamp; past and future are both valid. Defaults
    /// to now.
    pub reassign_date: Option<DueDateInput>,
    pub assigner_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct GroupAssignRequest {
    pub group_id: Uuid,
    pub portal_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub due_date: Option<DueDateInput>,
    pub assigner_id: Option<Uuid>,
    /// Leave the group owner out of the fan-out.
    pub exclude_self: bool,
    pub notify: bool,
}

/// Keeps the single active plan per (user, portal, entity) tuple in step with
/// assignment and due-date operations, and manages reassignment lineage.
pub struct Reconciler {
    tree: Arc<dyn TreeReader>,
    emitter: Arc<dyn EventEmitter>,
    authorizer: Arc<dyn Authorizer>,
}

impl Reconciler {
    #[must_use]
    pub fn new(tree: Arc<dyn TreeReader>, emitter: Arc<dyn EventEmitter>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            tree,
            emitter,
            authorizer,
        }
    }

    async fn emit_all(&self, messages: Vec<EventMessage>) {
        for message in messages {
            if let Err(error) = self.emitter.emit(message).await {
                tracing::warn!(error = &error as &dyn std::error::Error, "failed to emit plan event");
            }
        }
    }

    /// Resolve an optional assigner: absence is a distinct not-found error, a
    /// deactivated account a business-rule conflict.
    async fn check_assigner<C: ConnectionTrait>(&self, conn: &C, assigner_id: Option<Uuid>) -> Result<(), ReconcileError> {
        let Some(assigner_id) = assigner_id else {
            return Ok(());
        };
        let assigner = user::Query::load(conn, assigner_id)
            .await?
            .ok_or(ReconcileError::NotFound("assigner"))?;
        if !assigner.active {
            return Err(ReconcileError::Conflict("assigner account is deactivated".to_owned()));
        }
        Ok(())
    }

    /// Create or update the single active plan for a (user, portal, entity)
    /// tuple. An existing plan is updated in place, never duplicated.
    pub async fn assign<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        req: AssignRequest,
        actor: Option<Uuid>,
    ) -> Result<Plan, ReconcileError> {
        // Shape validation first; every failure is reported.
        let mut failures = Vec::new();
        let due_date = match &req.due_date {
            None => {
                if req.options.version == ApiVersion::V2 {
                    failures.push("due date is required".to_owned());
                }
                None
            }
            Some(input) => match parse_due_date(input) {
                Ok(date) => Some(date.naive_utc()),
                Err(error) => {
                    failures.push(format!("due date is invalid: {error}"));
                    None
                }
            },
        };
        if !failures.is_empty() {
            return Err(ReconcileError::Validation(failures));
        }

        // Existence of the targets.
        let target_user = user::Query::load(conn, req.user_id)
            .await?
            .ok_or(ReconcileError::NotFound("user"))?;
        if req.entity_type == EntityType::Lo && self.tree.lo_type(req.entity_id).await?.is_none() {
            return Err(ReconcileError::NotFound("learning object"));
        }

        // Permission.
        if !self
            .authorizer
            .can_manage(
                actor,
                ManageTarget::Assignment {
                    user_id: req.user_id,
                    entity_id: req.entity_id,
                },
            )
            .await
        {
            return Err(ReconcileError::Permission);
        }

        // Business rules.
        if !target_user.active {
            return Err(ReconcileError::Conflict("account is deactivated".to_owned()));
        }
        if req.entity_type == EntityType::Lo && !self.tree.is_published(req.entity_id).await? {
            return Err(ReconcileError::Conflict(
                "learning object is not assignable".to_owned(),
            ));
        }
        if let Some(due) = due_date {
            if due < Utc::now().naive_utc() {
                return Err(ReconcileError::Conflict("due date must not be in the past".to_owned()));
            }
        }
        self.check_assigner(conn, req.assigner_id).await?;

        let (plan, events) = conn
            .transaction(|txn| {
                Box::pin(async move { apply_assign(txn, &req, due_date, actor).await })
            })
            .await
            .flatten_res()?;

        self.emit_all(events).await;
        Ok(plan)
    }

    /// Replace the resolved plan with a brand-new one, archiving the old as a
    /// revision. Enrolments that already started survive with their plan link
    /// moved; unstarted ones are deleted with the old plan.
    pub async fn reassign<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        req: ReassignRequest,
        actor: Option<Uuid>,
    ) -> Result<Plan, ReconcileError> {
        let mut failures = Vec::new();
        if req.plan_ids.len() > 1 {
            failures.push("Only support a single plan for now".to_owned());
        }
        if req.plan_ids.is_empty() == req.lo_key.is_none() {
            failures.push("exactly one of plan_ids or lo_id must be supplied".to_owned());
        }
        let due_date = match parse_due_date(&req.due_date) {
            Ok(date) => Some(date.naive_utc()),
            Err(error) => {
                failures.push(format!("due date is invalid: {error}"));
                None
            }
        };
        let reassign_date = match &req.reassign_date {
            None => Some(Utc::now().naive_utc()),
            Some(input) => match parse_due_date(input) {
                Ok(date) => Some(date.naive_utc()),
                Err(error) => {
                    failures.push(format!("reassign date is invalid: {error}"));
                    None
                }
            },
        };
        let (due_date, reassign_date) = match (due_date, reassign_date, failures.is_empty()) {
            (Some(due), Some(at), true) => (due, at),
            _ => return Err(ReconcileError::Validation(failures)),
        };

        // Existence: resolve the plan from whichever key was supplied.
        let (old, action) = if let Some(plan_id) = req.plan_ids.first() {
            let plan = Query::load(conn, *plan_id)
                .await?
                .ok_or(ReconcileError::NotFound("plan"))?;
            (plan, Action::Reassigned)
        } else if let Some(key) = req.lo_key {
            let plan = Query::find_active(conn, key.user_id, key.portal_id, EntityType::Lo, key.lo_id)
                .await?
                .ok_or(ReconcileError::NotFound("plan"))?;
            (plan, Action::AutoReassigned)
        } else {
            return Err(ReconcileError::Validation(vec![
                "exactly one of plan_ids or lo_id must be supplied".to_owned(),
            ]));
        };

        // Permission.
        if !self.authorizer.can_manage(actor, ManageTarget::Plan(old.id)).await {
            return Err(ReconcileError::Permission);
        }

        // Business rules. The scheduled auto path may backfill past due
        // dates; the explicit path may not.
        if action == Action::Reassigned && due_date < Utc::now().naive_utc() {
            return Err(ReconcileError::Conflict("due date must not be in the past".to_owned()));
        }
        if reassign_date > due_date {
            return Err(ReconcileError::Conflict(
                "reassign date must not be later than due date".to_owned(),
            ));
        }
        self.check_assigner(conn, req.assigner_id).await?;

        let assigner_id = req.assigner_id;
        let (plan, events) = conn
            .transaction(|txn| {
                Box::pin(async move {
                    apply_reassign(txn, old, due_date, reassign_date, assigner_id, action, actor).await
                })
            })
            .await
            .flatten_res()?;

        self.emit_all(events).await;
        Ok(plan)
    }

    /// Delete a plan, unlinking dependent enrolments and clearing their
    /// mirrored due dates. References are soft-deleted.
    pub async fn archive<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        plan_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), ReconcileError> {
        let plan = Query::load(conn, plan_id)
            .await?
            .ok_or(ReconcileError::NotFound("plan"))?;
        if !self.authorizer.can_manage(actor, ManageTarget::Plan(plan_id)).await {
            return Err(ReconcileError::Permission);
        }

        let events = conn
            .transaction(|txn| Box::pin(async move { apply_archive(txn, plan, actor).await }))
            .await
            .flatten_res()?;

        self.emit_all(events).await;
        Ok(())
    }

    /// Delete every plan a group assignment produced. Per-plan deletion is
    /// best-effort; the group-level event follows once all were attempted.
    pub async fn archive_group<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        group_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), ReconcileError> {
        group::Query::load(conn, group_id)
            .await?
            .ok_or(ReconcileError::NotFound("group"))?;
        if !self.authorizer.can_manage(actor, ManageTarget::Group(group_id)).await {
            return Err(ReconcileError::Permission);
        }

        let plans = Query::find_by_source(conn, SourceType::Group, group_id).await?;
        for plan in plans {
            let plan_id = plan.id;
            let res = conn
                .transaction(|txn| Box::pin(async move { apply_archive(txn, plan, actor).await }))
                .await
                .flatten_res();
            match res {
                Ok(events) => self.emit_all(events).await,
                Err(error) => {
                    tracing::warn!(error = &error as &dyn std::error::Error, %plan_id, %group_id, "failed to delete group plan");
                }
            }
        }

        let mut message = EventMessage::new(EventTopic::GroupAssignDelete, group_id);
        message.context = EventContext {
            action: Some(EventAction::Delete),
            group_id: Some(group_id),
            actor_id: actor,
            ..Default::default()
        };
        self.emit_all(vec![message]).await;
        Ok(())
    }

    /// Fan an assignment out to every member of a group. One member failing
    /// does not undo the others; the group-level event is emitted only after
    /// every member was attempted.
    pub async fn assign_group<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        req: GroupAssignRequest,
        actor: Option<Uuid>,
    ) -> Result<(), ReconcileError> {
        let group = group::Query::load(conn, req.group_id)
            .await?
            .ok_or(ReconcileError::NotFound("group"))?;
        if !self.authorizer.can_manage(actor, ManageTarget::Group(req.group_id)).await {
            return Err(ReconcileError::Permission);
        }

        let mut members = group::Query::member_ids(conn, req.group_id).await?;
        if !req.exclude_self && !members.contains(&group.owner_id) {
            members.push(group.owner_id);
        }
        if req.exclude_self {
            members.retain(|id| *id != group.owner_id);
        }

        for member in members {
            let assign_req = AssignRequest {
                user_id: member,
                portal_id: req.portal_id,
                entity_type: req.entity_type,
                entity_id: req.entity_id,
                due_date: req.due_date.clone(),
                assigner_id: req.assigner_id,
                status: Status::Assigned,
                options: AssignOptions::builder()
                    .notify(req.notify)
                    .source(Some((SourceType::Group, req.group_id)))
                    .build(),
            };
            match self.assign(conn, assign_req, actor).await {
                Ok(plan) => {
                    let mut message = EventMessage::new(EventTopic::DoEnrolmentPlanCreate, plan.id);
                    message.after = Some(plan_state(&plan));
                    message.context = EventContext {
                        action: Some(EventAction::Assigned),
                        notify: Some(req.notify),
                        group_id: Some(req.group_id),
                        actor_id: actor,
                        ..Default::default()
                    };
                    self.emit_all(vec![message]).await;
                }
                Err(error) => {
                    tracing::warn!(error = &error as &dyn std::error::Error, %member, group_id = %req.group_id, "failed to assign group member");
                }
            }
        }

        let mut message = EventMessage::new(EventTopic::GroupAssignCreate, req.entity_id);
        message.after = Some(serde_json::json!({
            "entity_id": req.entity_id,
            "due_date": req.due_date.as_ref().and_then(|d| parse_due_date(d).ok()),
        }));
        message.context = EventContext {
            action: Some(EventAction::Assigned),
            notify: Some(req.notify),
            group_id: Some(req.group_id),
            actor_id: actor,
            ..Default::default()
        };
        self.emit_all(vec![message]).await;
        Ok(())
    }

    /// Due-date edit driven from the enrolment side. The first edit creates a
    /// scheduled plan; later edits update that same plan in place.
    pub async fn set_due_date<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        enrolment_id: Uuid,
        due_date: DueDateInput,
        actor: Option<Uuid>,
    ) -> Result<Plan, ReconcileError> {
        let due = parse_due_date(&due_date)
            .map_err(|error| ReconcileError::Validation(vec![format!("due date is invalid: {error}")]))?
            .naive_utc();

        let enrolment = enrolment::Query::load(conn, enrolment_id)
            .await?
            .ok_or(ReconcileError::NotFound("enrolment"))?;
        if !self
            .authorizer
            .can_manage(actor, ManageTarget::Enrolment(enrolment_id))
            .await
        {
            return Err(ReconcileError::Permission);
        }
        if due < Utc::now().naive_utc() {
            return Err(ReconcileError::Conflict("due date must not be in the past".to_owned()));
        }

        let (plan, events) = conn
            .transaction(|txn| Box::pin(async move { apply_set_due_date(txn, enrolment, due, actor).await }))
            .await
            .flatten_res()?;

        self.emit_all(events).await;
        Ok(plan)
    }
}

/// Whether an enrolment carries progress that must survive reassignment.
fn has_started(enrolment: &Enrolment) -> bool {
    enrolment.status.started() || enrolment.start_date.is_some()
}

async fn apply_assign<C: ConnectionTrait + TransactionTrait>(
    txn: &C,
    req: &AssignRequest,
    due_date: Option<NaiveDateTime>,
    actor: Option<Uuid>,
) -> Result<(Plan, Vec<EventMessage>), ReconcileError> {
    let mut events = Vec::new();

    let existing = Query::find_active(txn, req.user_id, req.portal_id, req.entity_type, req.entity_id).await?;
    let plan = match existing {
        Some(current) => {
            let mut updated = current.clone();
            updated.due_date = due_date;
            updated.assigner_id = req.assigner_id;
            // A human acting on a system suggestion confirms it.
            updated.status = req.status;
            updated.plan_type = PlanType::Assign;
            let updated = Mutation::update(txn, updated).await?;

            let mut message = EventMessage::new(EventTopic::PlanUpdate, updated.id);
            message.before = Some(plan_state(&current));
            message.after = Some(plan_state(&updated));
            if current.assigner_id != updated.assigner_id {
                message.embedded_original = Some(plan_snapshot(&current));
            }
            message.context = EventContext {
                action: Some(EventAction::Assigned),
                notify: Some(req.options.notify),
                group_id: group_of(&req.options),
                actor_id: actor,
                data: req.options.data.clone(),
            };
            events.push(message);
            updated
        }
        None => {
            let created = Mutation::create(
                txn,
                NewPlan {
                    user_id: req.user_id,
                    assigner_id: req.assigner_id,
                    portal_id: req.portal_id,
                    entity_type: req.entity_type,
                    entity_id: req.entity_id,
                    status: req.status,
                    due_date,
                    plan_type: PlanType::Assign,
                },
            )
            .await?;

            let mut message = EventMessage::new(EventTopic::PlanCreate, created.id);
            message.after = Some(plan_state(&created));
            message.context = EventContext {
                action: Some(EventAction::Assigned),
                notify: Some(req.options.notify),
                group_id: group_of(&req.options),
                actor_id: actor,
                data: req.options.data.clone(),
            };
            events.push(message);
            created
        }
    };

    if let Some((source_type, source_id)) = req.options.source {
        if Query::find_reference(txn, plan.id, source_type, source_id).await?.is_none() {
            Mutation::link_reference(txn, plan.id, source_type, source_id).await?;
        }
    }

    // Mirror the due date onto an existing enrolment for the slot and link it
    // to the governing plan.
    if req.entity_type == EntityType::Lo {
        if let Some(enr) =
            enrolment::Query::load_by_user_lo_portal(txn, req.user_id, req.entity_id, req.portal_id).await?
        {
            enrolment::Mutation::link_plan(txn, enr.id, plan.id).await?;
            let mut mirrored = enr.clone();
            mirrored.due_date = due_date;
            if req.options.version == ApiVersion::V2 && !has_started(&enr) {
                enrolment::Mutation::save_row(txn, mirrored).await?;
            } else {
                enrolment::Mutation::save(txn, mirrored, actor, None).await?;
            }
        }
    }

    Ok((plan, events))
}

fn group_of(options: &AssignOptions) -> Option<Uuid> {
    options
        .source
        .and_then(|(source_type, id)| (source_type == SourceType::Group).then_some(id))
}

async fn apply_reassign<C: ConnectionTrait + TransactionTrait>(
    txn: &C,
    old: Plan,
    due_date: NaiveDateTime,
    reassign_date: NaiveDateTime,
    assigner_id: Option<Uuid>,
    action: Action,
    actor: Option<Uuid>,
) -> Result<(Plan, Vec<EventMessage>), ReconcileError> {
    let mut events = Vec::new();
    let context_action = match action {
        Action::Reassigned => EventAction::Reassigned,
        Action::AutoReassigned => EventAction::AutoReassigned,
        Action::Assigned => EventAction::Assigned,
    };

    let linked = enrolment::Query::linked_to_plan(txn, old.id).await?;

    let mut delete_message = EventMessage::new(EventTopic::PlanDelete, old.id);
    delete_message.before = Some(plan_state(&old));
    delete_message.context = EventContext {
        action: Some(context_action),
        actor_id: actor,
        ..Default::default()
    };
    events.push(delete_message);

    let mut survivors = Vec::new();
    for enr in linked {
        let mut message = EventMessage::new(EventTopic::EnrolmentDelete, enr.id);
        message.context = EventContext {
            action: Some(context_action),
            actor_id: actor,
            ..Default::default()
        };
        events.push(message);

        if has_started(&enr) {
            survivors.push(enr);
        } else {
            enrolment::Mutation::delete(txn, enr, true, actor).await?;
        }
    }
    enrolment::Mutation::unlink_all_for_plan(txn, old.id).await?;

    let old_snapshot = plan_snapshot(&old);
    let new_plan = Mutation::archive_and_recreate(
        txn,
        old.clone(),
        NewPlan {
            user_id: old.user_id,
            assigner_id,
            portal_id: old.portal_id,
            entity_type: old.entity_type,
            entity_id: old.entity_id,
            status: Status::Assigned,
            due_date: Some(due_date),
            plan_type: PlanType::Assign,
        },
        action,
        reassign_date,
    )
    .await?;

    for enr in survivors {
        enrolment::Mutation::link_plan(txn, enr.id, new_plan.id).await?;
        let mut mirrored = enr;
        mirrored.due_date = Some(due_date);
        enrolment::Mutation::save_row(txn, mirrored).await?;
    }

    let mut create_message = EventMessage::new(EventTopic::PlanCreate, new_plan.id);
    create_message.after = Some(plan_state(&new_plan));
    create_message.embedded_original = Some(old_snapshot);
    create_message.context = EventContext {
        action: Some(context_action),
        actor_id: actor,
        ..Default::default()
    };
    events.push(create_message);

    Ok((new_plan, events))
}

async fn apply_archive<C: ConnectionTrait + TransactionTrait>(
    txn: &C,
    plan: Plan,
    actor: Option<Uuid>,
) -> Result<Vec<EventMessage>, ReconcileError> {
    let linked = enrolment::Query::linked_to_plan(txn, plan.id).await?;
    for enr in &linked {
        enrolment::Mutation::set_due_date(txn, enr.id, None).await?;
    }
    enrolment::Mutation::unlink_all_for_plan(txn, plan.id).await?;
    Mutation::delete(txn, plan.id).await?;

    let mut delete_message = EventMessage::new(EventTopic::PlanDelete, plan.id);
    delete_message.before = Some(plan_state(&plan));
    delete_message.context = EventContext {
        action: Some(EventAction::Delete),
        actor_id: actor,
        ..Default::default()
    };
    let mut ro_message = EventMessage::new(EventTopic::RoDelete, plan.id);
    ro_message.context = EventContext {
        action: Some(EventAction::Delete),
        actor_id: actor,
        ..Default::default()
    };
    Ok(vec![delete_message, ro_message])
}

async fn apply_set_due_date<C: ConnectionTrait + TransactionTrait>(
    txn: &C,
    enrolment: Enrolment,
    due: NaiveDateTime,
    actor: Option<Uuid>,
) -> Result<(Plan, Vec<EventMessage>), ReconcileError> {
    let mut events = Vec::new();

    let existing = Query::find_active(txn, enrolment.user_id, enrolment.taken_portal_id, EntityType::Lo, enrolment.lo_id)
        .await?;
    let plan = match existing {
        Some(current) => {
            let mut updated = current.clone();
            updated.due_date = Some(due);
            let updated = Mutation::update(txn, updated).await?;

            let mut message = EventMessage::new(EventTopic::PlanUpdate, updated.id);
            message.before = Some(plan_state(&current));
            message.after = Some(plan_state(&updated));
            message.context = EventContext {
                action: Some(EventAction::Update),
                actor_id: actor,
                ..Default::default()
            };
            events.push(message);
            updated
        }
        None => {
            let created = Mutation::create(
                txn,
                NewPlan {
                    user_id: enrolment.user_id,
                    assigner_id: actor,
                    portal_id: enrolment.taken_portal_id,
                    entity_type: EntityType::Lo,
                    entity_id: enrolment.lo_id,
                    status: Status::Scheduled,
                    due_date: Some(due),
                    plan_type: PlanType::Suggested,
                },
            )
            .await?;

            let mut message = EventMessage::new(EventTopic::PlanCreate, created.id);
            message.after = Some(plan_state(&created));
            message.context = EventContext {
                action: Some(EventAction::Update),
                actor_id: actor,
                ..Default::default()
            };
            events.push(message);
            created
        }
    };

    enrolment::Mutation::link_plan(txn, enrolment.id, plan.id).await?;
    let mut mirrored = enrolment;
    mirrored.due_date = Some(due);
    enrolment::Mutation::save(txn, mirrored, actor, None).await?;

    Ok((plan, events))
}

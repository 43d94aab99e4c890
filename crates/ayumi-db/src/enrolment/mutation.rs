use crate::enrolment::query;
use crate::util::FlattenTransactionResultExt;
use ayumi_entity::enrolment::{
    self, Entity as EnrolmentEntity, Model as Enrolment, Pass, Status,
    plan_link::{self, Entity as PlanLinkEntity},
    revision,
};
use chrono::{NaiveDateTime, Utc};
use sea_orm::prelude::*;
use sea_orm::{ActiveValue, IntoActiveValue, TransactionTrait, sea_query};
use uuid::Uuid;

fn slot_on_conflict() -> sea_query::OnConflict {
    sea_query::OnConflict::columns([
        enrolment::Column::UserId,
        enrolment::Column::LoId,
        enrolment::Column::TakenPortalId,
    ])
}

#[derive(Debug, Clone)]
pub struct NewEnrolment {
    pub user_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub lo_id: Uuid,
    pub taken_portal_id: Uuid,
    pub parent_enrolment_id: Option<Uuid>,
    pub status: Status,
}

fn revision_of(enrolment: &Enrolment, actor_id: Option<Uuid>, note: Option<String>) -> revision::ActiveModel {
    revision::ActiveModel {
        id: Uuid::new_v4().into_active_value(),
        enrolment_id: enrolment.id.into_active_value(),
        user_id: enrolment.user_id.into_active_value(),
        lo_id: enrolment.lo_id.into_active_value(),
        taken_portal_id: enrolment.taken_portal_id.into_active_value(),
        parent_enrolment_id: enrolment.parent_enrolment_id.into_active_value(),
        status: ActiveValue::Set(enrolment.status),
        pass: ActiveValue::Set(enrolment.pass),
        result: enrolment.result.into_active_value(),
        start_date: ActiveValue::Set(enrolment.start_date),
        end_date: ActiveValue::Set(enrolment.end_date),
        due_date: ActiveValue::Set(enrolment.due_date),
        actor_id: actor_id.into_active_value(),
        note: note.into_active_value(),
        created: ActiveValue::Set(Utc::now().naive_utc()),
    }
}

fn full_active_model(enrolment: &Enrolment) -> enrolment::ActiveModel {
    enrolment::ActiveModel {
        id: ActiveValue::Unchanged(enrolment.id),
        user_id: ActiveValue::Set(enrolment.user_id),
        profile_id: ActiveValue::Set(enrolment.profile_id),
        lo_id: ActiveValue::Set(enrolment.lo_id),
        taken_portal_id: ActiveValue::Set(enrolment.taken_portal_id),
        parent_enrolment_id: ActiveValue::Set(enrolment.parent_enrolment_id),
        status: ActiveValue::Set(enrolment.status),
        pass: ActiveValue::Set(enrolment.pass),
        result: ActiveValue::Set(enrolment.result),
        start_date: ActiveValue::Set(enrolment.start_date),
        end_date: ActiveValue::Set(enrolment.end_date),
        due_date: ActiveValue::Set(enrolment.due_date),
        data: ActiveValue::Set(enrolment.data.clone()),
    }
}

pub struct Mutation;

impl Mutation {
    /// Create the enrolment for a (user, lo, portal) slot. The slot is
    /// unique; a concurrent or repeated create returns the existing row.
    pub async fn create<C: ConnectionTrait + TransactionTrait>(
        conn: &C,
        new: NewEnrolment,
    ) -> Result<Enrolment, DbErr> {
        let id = Uuid::new_v4();
        let val = enrolment::ActiveModel {
            id: id.into_active_value(),
            user_id: new.user_id.into_active_value(),
            profile_id: new.profile_id.into_active_value(),
            lo_id: new.lo_id.into_active_value(),
            taken_portal_id: new.taken_portal_id.into_active_value(),
            parent_enrolment_id: new.parent_enrolment_id.into_active_value(),
            status: ActiveValue::Set(new.status),
            pass: ActiveValue::Set(Pass::Unset),
            data: ActiveValue::Set(serde_json::json!({})),
            ..Default::default()
        };

        tracing::trace!(%id, user_id = %new.user_id, lo_id = %new.lo_id, "inserting enrolment");
        conn.transaction(|conn| {
            Box::pin(async move {
                let mut on_conflict = slot_on_conflict();
                on_conflict.do_nothing();
                EnrolmentEntity::insert(val)
                    .on_conflict(on_conflict)
                    .do_nothing()
                    .exec(conn)
                    .await
            })
        })
        .await
        .flatten_res()?;

        query::Query::load_by_user_lo_portal(conn, new.user_id, new.lo_id, new.taken_portal_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Enrolment not found after insertion".to_owned()))
    }

    /// Persist every field of the enrolment and append a revision snapshot of
    /// the written state. Row update and revision insert commit together.
    pub async fn save<C: ConnectionTrait + TransactionTrait>(
        conn: &C,
        enrolment: Enrolment,
        actor_id: Option<Uuid>,
        note: Option<String>,
    ) -> Result<Enrolment, DbErr> {
        conn.transaction(|txn| {
            Box::pin(async move {
                let written = full_active_model(&enrolment).update(txn).await?;
                revision_of(&written, actor_id, note).insert(txn).await?;
                Ok(written)
            })
        })
        .await
        .flatten_res()
    }

    /// Persist the row without a revision. Used by the version-2 assignment
    /// path for enrolments that have not started yet.
    pub async fn save_row<C: ConnectionTrait>(conn: &C, enrolment: Enrolment) -> Result<Enrolment, DbErr> {
        full_active_model(&enrolment).update(conn).await
    }

    /// Remove an enrolment together with its subtree and plan links. A soft
    /// delete first appends closing revisions so the audit trail survives
    /// the rows.
    pub async fn delete<C: ConnectionTrait + TransactionTrait>(
        conn: &C,
        enrolment: Enrolment,
        hard: bool,
        actor_id: Option<Uuid>,
    ) -> Result<(), DbErr> {
        tracing::debug!(id = %enrolment.id, hard, "deleting enrolment");
        conn.transaction(|txn| {
            Box::pin(async move {
                // Pre-order collection; parents precede their descendants.
                let mut ordered = Vec::new();
                let mut stack = vec![enrolment];
                while let Some(node) = stack.pop() {
                    stack.extend(query::Query::load_children(txn, node.id).await?);
                    ordered.push(node);
                }
                for node in ordered.iter().rev() {
                    PlanLinkEntity::delete_many()
                        .filter(plan_link::Column::EnrolmentId.eq(node.id))
                        .exec(txn)
                        .await?;
                    if !hard {
                        revision_of(node, actor_id, Some("deleted".to_owned()))
                            .insert(txn)
                            .await?;
                    }
                    EnrolmentEntity::delete_by_id(node.id).exec(txn).await?;
                }
                Ok(())
            })
        })
        .await
        .flatten_res()
    }

    pub async fn link_plan<C: ConnectionTrait>(conn: &C, enrolment_id: Uuid, plan_id: Uuid) -> Result<(), DbErr> {
        let val = plan_link::ActiveModel {
            enrolment_id: enrolment_id.into_active_value(),
            plan_id: plan_id.into_active_value(),
        };
        let mut on_conflict =
            sea_query::OnConflict::columns([plan_link::Column::EnrolmentId, plan_link::Column::PlanId]);
        on_conflict.do_nothing();
        PlanLinkEntity::insert(val)
            .on_conflict(on_conflict)
            .do_nothing()
            .exec(conn)
            .await
            .map(|_| ())
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn std::error::Error, %enrolment_id, %plan_id, "failed to link enrolment to plan");
            })
    }

    pub async fn unlink_plan<C: ConnectionTrait>(conn: &C, enrolment_id: Uuid, plan_id: Uuid) -> Result<(), DbErr> {
        PlanLinkEntity::delete_many()
            .filter(plan_link::Column::EnrolmentId.eq(enrolment_id))
            .filter(plan_link::Column::PlanId.eq(plan_id))
            .exec(conn)
            .await
            .map(|_| ())
    }

    pub async fn unlink_all_for_plan<C: ConnectionTrait>(conn: &C, plan_id: Uuid) -> Result<(), DbErr> {
        PlanLinkEntity::delete_many()
            .filter(plan_link::Column::PlanId.eq(plan_id))
            .exec(conn)
            .await
            .map(|_| ())
    }

    /// Mirror the due date of the governing plan onto the enrolment row.
    pub async fn set_due_date<C: ConnectionTrait>(
        conn: &C,
        enrolment_id: Uuid,
        due_date: Option<NaiveDateTime>,
    ) -> Result<(), DbErr> {
        let data = enrolment::ActiveModel {
            due_date: ActiveValue::Set(due_date),
            ..Default::default()
        };
        EnrolmentEntity::update_many()
            .set(data)
            .filter(enrolment::Column::Id.eq(enrolment_id))
            .exec(conn)
            .await
            .map(|_| ())
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn std::error::Error, %enrolment_id, "failed to set due date");
            })
    }
}

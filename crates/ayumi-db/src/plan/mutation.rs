use crate::util::FlattenTransactionResultExt;
use ayumi_entity::plan::{
    self, Entity as PlanEntity, EntityType, Model as Plan, PlanType, Status,
    reference::{self, Entity as ReferenceEntity, Model as Reference, RefStatus, SourceType},
    revision,
};
use chrono::{NaiveDateTime, Utc};
use sea_orm::prelude::*;
use sea_orm::{ActiveValue, IntoActiveValue, TransactionTrait};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewPlan {
    pub user_id: Uuid,
    pub assigner_id: Option<Uuid>,
    pub portal_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub status: Status,
    pub due_date: Option<NaiveDateTime>,
    pub plan_type: PlanType,
}

fn active_model_for(id: Uuid, new: &NewPlan) -> plan::ActiveModel {
    plan::ActiveModel {
        id: id.into_active_value(),
        user_id: new.user_id.into_active_value(),
        assigner_id: new.assigner_id.into_active_value(),
        portal_id: new.portal_id.into_active_value(),
        entity_type: ActiveValue::Set(new.entity_type),
        entity_id: new.entity_id.into_active_value(),
        status: ActiveValue::Set(new.status),
        due_date: ActiveValue::Set(new.due_date),
        created: ActiveValue::Set(Utc::now().naive_utc()),
        plan_type: ActiveValue::Set(new.plan_type),
    }
}

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, new: NewPlan) -> Result<Plan, DbErr> {
        let id = Uuid::new_v4();
        tracing::trace!(%id, user_id = %new.user_id, entity_id = %new.entity_id, "inserting plan");
        active_model_for(id, &new).insert(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn std::error::Error, %id, "failed to insert plan");
        })
    }

    /// Update the mutable fields of an existing plan in place.
    pub async fn update<C: ConnectionTrait>(conn: &C, plan: Plan) -> Result<Plan, DbErr> {
        let val = plan::ActiveModel {
            id: ActiveValue::Unchanged(plan.id),
            user_id: ActiveValue::Set(plan.user_id),
            assigner_id: ActiveValue::Set(plan.assigner_id),
            portal_id: ActiveValue::Set(plan.portal_id),
            entity_type: ActiveValue::Set(plan.entity_type),
            entity_id: ActiveValue::Set(plan.entity_id),
            status: ActiveValue::Set(plan.status),
            due_date: ActiveValue::Set(plan.due_date),
            created: ActiveValue::Set(plan.created),
            plan_type: ActiveValue::Set(plan.plan_type),
        };
        val.update(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn std::error::Error, id = %plan.id, "failed to update plan");
        })
    }

    /// Replace a plan with a fresh row. The superseded plan is written to the
    /// revision table keyed by the new plan's id, its original assigner
    /// preserved, then removed. All three writes commit together.
    pub async fn archive_and_recreate<C: ConnectionTrait + TransactionTrait>(
        conn: &C,
        old: Plan,
        new: NewPlan,
        action: revision::Action,
        at: NaiveDateTime,
    ) -> Result<Plan, DbErr> {
        let new_id = Uuid::new_v4();
        tracing::debug!(old_id = %old.id, %new_id, ?action, "reassigning plan");
        conn.transaction(|txn| {
            Box::pin(async move {
                let created = active_model_for(new_id, &new).insert(txn).await?;
                revision::ActiveModel {
                    id: Uuid::new_v4().into_active_value(),
                    plan_id: new_id.into_active_value(),
                    superseded_plan_id: old.id.into_active_value(),
                    user_id: old.user_id.into_active_value(),
                    assigner_id: old.assigner_id.into_active_value(),
                    portal_id: old.portal_id.into_active_value(),
                    entity_type: ActiveValue::Set(old.entity_type),
                    entity_id: old.entity_id.into_active_value(),
                    status: ActiveValue::Set(old.status),
                    due_date: ActiveValue::Set(old.due_date),
                    plan_type: ActiveValue::Set(old.plan_type),
                    action: ActiveValue::Set(action),
                    created: ActiveValue::Set(at),
                }
                .insert(txn)
                .await?;
                PlanEntity::delete_by_id(old.id).exec(txn).await?;
                Ok(created)
            })
        })
        .await
        .flatten_res()
    }

    /// Delete a plan row. Linked references are flipped to deleted, never
    /// removed.
    pub async fn delete<C: ConnectionTrait + TransactionTrait>(conn: &C, plan_id: Uuid) -> Result<(), DbErr> {
        tracing::debug!(%plan_id, "deleting plan");
        conn.transaction(|txn| {
            Box::pin(async move {
                ReferenceEntity::update_many()
                    .set(reference::ActiveModel {
                        ref_status: ActiveValue::Set(RefStatus::Deleted),
                        ..Default::default()
                    })
                    .filter(reference::Column::PlanId.eq(plan_id))
                    .exec(txn)
                    .await?;
                PlanEntity::delete_by_id(plan_id).exec(txn).await?;
                Ok(())
            })
        })
        .await
        .flatten_res()
    }

    pub async fn link_reference<C: ConnectionTrait>(
        conn: &C,
        plan_id: Uuid,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Reference, DbErr> {
        let val = reference::ActiveModel {
            id: Uuid::new_v4().into_active_value(),
            plan_id: plan_id.into_active_value(),
            source_type: ActiveValue::Set(source_type),
            source_id: source_id.into_active_value(),
            ref_status: ActiveValue::Set(RefStatus::Active),
        };
        val.insert(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn std::error::Error, %plan_id, %source_id, "failed to link plan reference");
        })
    }
}

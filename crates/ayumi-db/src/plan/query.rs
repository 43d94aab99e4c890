use ayumi_entity::plan::{
    self, Entity as PlanEntity, EntityType, Model as Plan,
    reference::{self, Entity as ReferenceEntity, Model as Reference, RefStatus, SourceType},
    revision::{self, Entity as RevisionEntity, Model as Revision},
};
use sea_orm::prelude::*;
use sea_orm::QueryOrder;
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Plan>, DbErr> {
        let res = PlanEntity::find_by_id(id).one(conn).await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %id, "failed to load plan");
        })
    }

    /// The single non-archived plan for a (user, portal, entity) tuple.
    pub async fn find_active<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        portal_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Option<Plan>, DbErr> {
        let res = PlanEntity::find()
            .filter(plan::Column::UserId.eq(user_id))
            .filter(plan::Column::PortalId.eq(portal_id))
            .filter(plan::Column::EntityType.eq(entity_type))
            .filter(plan::Column::EntityId.eq(entity_id))
            .filter(plan::Column::Status.ne(plan::Status::Archived))
            .one(conn)
            .await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %user_id, %portal_id, %entity_id, "failed to find active plan");
        })
    }

    pub async fn load_revisions<C: ConnectionTrait>(conn: &C, plan_id: Uuid) -> Result<Vec<Revision>, DbErr> {
        let res = RevisionEntity::find()
            .filter(revision::Column::PlanId.eq(plan_id))
            .order_by_asc(revision::Column::Created)
            .all(conn)
            .await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %plan_id, "failed to load plan revisions");
        })
    }

    pub async fn find_reference<C: ConnectionTrait>(
        conn: &C,
        plan_id: Uuid,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Option<Reference>, DbErr> {
        let res = ReferenceEntity::find()
            .filter(reference::Column::PlanId.eq(plan_id))
            .filter(reference::Column::SourceType.eq(source_type))
            .filter(reference::Column::SourceId.eq(source_id))
            .one(conn)
            .await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %plan_id, %source_id, "failed to find plan reference");
        })
    }

    /// Plans created by a bulk source that still carry an active reference.
    pub async fn find_by_source<C: ConnectionTrait>(
        conn: &C,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Vec<Plan>, DbErr> {
        let refs = ReferenceEntity::find()
            .filter(reference::Column::SourceType.eq(source_type))
            .filter(reference::Column::SourceId.eq(source_id))
            .filter(reference::Column::RefStatus.eq(RefStatus::Active))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %source_id, "failed to load plan references");
            })?;
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = refs.into_iter().map(|r| r.plan_id).collect();
        let res = PlanEntity::find().filter(plan::Column::Id.is_in(ids)).all(conn).await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %source_id, "failed to load plans for source");
        })
    }
}

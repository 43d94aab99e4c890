use ayumi_entity::enrolment::{
    self, Entity as EnrolmentEntity, Model as Enrolment,
    plan_link::{self, Entity as PlanLinkEntity},
    revision::{self, Entity as RevisionEntity, Model as Revision},
};
use sea_orm::prelude::*;
use sea_orm::QueryOrder;
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Enrolment>, DbErr> {
        let res = EnrolmentEntity::find_by_id(id).one(conn).await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %id, "failed to load enrolment");
        })
    }

    pub async fn load_by_user_lo_portal<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        lo_id: Uuid,
        portal_id: Uuid,
    ) -> Result<Option<Enrolment>, DbErr> {
        let res = EnrolmentEntity::find()
            .filter(enrolment::Column::UserId.eq(user_id))
            .filter(enrolment::Column::LoId.eq(lo_id))
            .filter(enrolment::Column::TakenPortalId.eq(portal_id))
            .one(conn)
            .await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %user_id, %lo_id, %portal_id, "failed to load enrolment by slot");
        })
    }

    pub async fn load_children<C: ConnectionTrait>(
        conn: &C,
        parent_enrolment_id: Uuid,
    ) -> Result<Vec<Enrolment>, DbErr> {
        let res = EnrolmentEntity::find()
            .filter(enrolment::Column::ParentEnrolmentId.eq(parent_enrolment_id))
            .all(conn)
            .await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %parent_enrolment_id, "failed to load child enrolments");
        })
    }

    pub async fn load_revisions<C: ConnectionTrait>(
        conn: &C,
        enrolment_id: Uuid,
    ) -> Result<Vec<Revision>, DbErr> {
        let res = RevisionEntity::find()
            .filter(revision::Column::EnrolmentId.eq(enrolment_id))
            .order_by_asc(revision::Column::Created)
            .all(conn)
            .await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %enrolment_id, "failed to load enrolment revisions");
        })
    }

    pub async fn found_link<C: ConnectionTrait>(
        conn: &C,
        plan_id: Uuid,
        enrolment_id: Uuid,
    ) -> Result<bool, DbErr> {
        let res = PlanLinkEntity::find()
            .filter(plan_link::Column::PlanId.eq(plan_id))
            .filter(plan_link::Column::EnrolmentId.eq(enrolment_id))
            .one(conn)
            .await;
        res.map(|link| link.is_some()).inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %plan_id, %enrolment_id, "failed to look up enrolment plan link");
        })
    }

    pub async fn linked_to_plan<C: ConnectionTrait>(conn: &C, plan_id: Uuid) -> Result<Vec<Enrolment>, DbErr> {
        let links = PlanLinkEntity::find()
            .filter(plan_link::Column::PlanId.eq(plan_id))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %plan_id, "failed to load plan links");
            })?;
        if links.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = links.into_iter().map(|link| link.enrolment_id).collect();
        let res = EnrolmentEntity::find()
            .filter(enrolment::Column::Id.is_in(ids))
            .all(conn)
            .await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %plan_id, "failed to load linked enrolments");
        })
    }
}

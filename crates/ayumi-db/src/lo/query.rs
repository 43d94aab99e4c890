use ayumi_entity::lo::{
    self, Entity as LoEntity, LoType, Model as Lo, PublishStatus,
    edge::{self, EdgeKind, Entity as EdgeEntity},
};
use sea_orm::prelude::*;
use sea_orm::QueryOrder;
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

/// An immediate child of a learning object, in tree order, with the elective
/// flag of its containing edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildLo {
    pub id: Uuid,
    pub lo_type: LoType,
    pub elective: bool,
}

pub struct Query;

impl Query {
    pub async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Lo>, DbErr> {
        let res = LoEntity::find_by_id(id).one(conn).await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %id, "failed to load learning object");
        })
    }

    /// Ordered immediate children over `contains` edges.
    pub async fn children<C: ConnectionTrait>(conn: &C, parent_id: Uuid) -> Result<Vec<ChildLo>, DbErr> {
        let edges = EdgeEntity::find()
            .filter(edge::Column::ParentId.eq(parent_id))
            .filter(edge::Column::Kind.eq(EdgeKind::Contains))
            .order_by_asc(edge::Column::Ordering)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %parent_id, "failed to load child edges");
            })?;
        if edges.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = edges.iter().map(|e| e.child_id).collect();
        let los: HashMap<Uuid, Lo> = LoEntity::find()
            .filter(lo::Column::Id.is_in(ids))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %parent_id, "failed to load child learning objects");
            })?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(edges
            .into_iter()
            .filter_map(|edge| {
                los.get(&edge.child_id).map(|lo| ChildLo {
                    id: lo.id,
                    lo_type: lo.lo_type,
                    elective: edge.elective,
                })
            })
            .collect())
    }

    /// Learning objects that declared a `depends_on` edge onto `lo_id`.
    pub async fn dependants<C: ConnectionTrait>(conn: &C, lo_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let res = EdgeEntity::find()
            .filter(edge::Column::ChildId.eq(lo_id))
            .filter(edge::Column::Kind.eq(EdgeKind::DependsOn))
            .order_by_asc(edge::Column::Ordering)
            .all(conn)
            .await;
        res.map(|edges| edges.into_iter().map(|e| e.parent_id).collect())
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %lo_id, "failed to load dependants");
            })
    }

    pub async fn elective_minimum<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<i32>, DbErr> {
        Self::load(conn, id).await.map(|lo| lo.and_then(|lo| lo.elective_number))
    }

    pub async fn is_published<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, DbErr> {
        Self::load(conn, id)
            .await
            .map(|lo| lo.is_some_and(|lo| lo.publish_status == PublishStatus::Published))
    }
}

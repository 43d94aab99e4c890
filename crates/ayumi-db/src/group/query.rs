use ayumi_entity::group::{
    Entity as GroupEntity, Model as Group,
    member::{self, Entity as MemberEntity},
};
use sea_orm::prelude::*;
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Group>, DbErr> {
        let res = GroupEntity::find_by_id(id).one(conn).await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %id, "failed to load group");
        })
    }

    pub async fn member_ids<C: ConnectionTrait>(conn: &C, group_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let res = MemberEntity::find()
            .filter(member::Column::GroupId.eq(group_id))
            .all(conn)
            .await;
        res.map(|members| members.into_iter().map(|m| m.user_id).collect())
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %group_id, "failed to load group members");
            })
    }
}

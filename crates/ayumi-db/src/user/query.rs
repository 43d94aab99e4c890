use ayumi_entity::user::{Entity as UserEntity, Model as User};
use sea_orm::prelude::*;
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<User>, DbErr> {
        let res = UserEntity::find_by_id(id).one(conn).await;
        res.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %id, "failed to load user");
        })
    }
}

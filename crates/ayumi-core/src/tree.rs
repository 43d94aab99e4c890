use async_trait::async_trait;
use ayumi_db::lo::{ChildLo, Query};
use ayumi_entity::lo::LoType;
use sea_orm::{DatabaseConnection, DbErr};
use uuid::Uuid;

/// Read-only view of the learning object hierarchy. The engines only ever
/// consult it; content mutation happens elsewhere.
#[async_trait]
pub trait TreeReader: Send + Sync {
    /// Ordered immediate children with their elective flags.
    async fn children(&self, lo_id: Uuid) -> Result<Vec<ChildLo>, DbErr>;

    /// Explicit elective quorum, when one is configured on the LO.
    async fn elective_minimum(&self, lo_id: Uuid) -> Result<Option<i32>, DbErr>;

    async fn lo_type(&self, lo_id: Uuid) -> Result<Option<LoType>, DbErr>;

    async fn is_published(&self, lo_id: Uuid) -> Result<bool, DbErr>;

    /// LOs that declared a dependency edge onto the given LO.
    async fn dependants(&self, lo_id: Uuid) -> Result<Vec<Uuid>, DbErr>;
}

pub struct DbTreeReader {
    conn: DatabaseConnection,
}

impl DbTreeReader {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TreeReader for DbTreeReader {
    async fn children(&self, lo_id: Uuid) -> Result<Vec<ChildLo>, DbErr> {
        Query::children(&self.conn, lo_id).await
    }

    async fn elective_minimum(&self, lo_id: Uuid) -> Result<Option<i32>, DbErr> {
        Query::elective_minimum(&self.conn, lo_id).await
    }

    async fn lo_type(&self, lo_id: Uuid) -> Result<Option<LoType>, DbErr> {
        Query::load(&self.conn, lo_id).await.map(|lo| lo.map(|lo| lo.lo_type))
    }

    async fn is_published(&self, lo_id: Uuid) -> Result<bool, DbErr> {
        Query::is_published(&self.conn, lo_id).await
    }

    async fn dependants(&self, lo_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        Query::dependants(&self.conn, lo_id).await
    }
}

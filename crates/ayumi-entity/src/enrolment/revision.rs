use sea_orm::entity::prelude::*;

use super::{Pass, Status};

/// Append-only snapshot of an enrolment at the point of a mutation. Rows are
/// never updated or deleted once written.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrolment_revisions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub enrolment_id: Uuid,
    pub user_id: Uuid,
    pub lo_id: Uuid,
    pub taken_portal_id: Uuid,
    pub parent_enrolment_id: Option<Uuid>,
    pub status: Status,
    pub pass: Pass,
    pub result: Option<f64>,
    pub start_date: Option<DateTime>,
    pub end_date: Option<DateTime>,
    pub due_date: Option<DateTime>,
    pub actor_id: Option<Uuid>,
    pub note: Option<String>,
    pub created: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Entity",
        from = "Column::EnrolmentId",
        to = "super::Column::Id"
    )]
    Enrolment,
}

impl Related<super::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrolment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

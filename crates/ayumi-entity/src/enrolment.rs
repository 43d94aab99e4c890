pub mod plan_link;
pub mod revision;

use sea_orm::entity::prelude::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enrolment_status_enum")]
pub enum Status {
    #[sea_orm(string_value = "not_started")]
    NotStarted,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl Status {
    #[must_use]
    pub fn started(&self) -> bool {
        match self {
            Self::InProgress | Self::Completed | Self::Expired => true,
            Self::NotStarted | Self::Pending => false,
        }
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Pass is tracked separately from status: an enrolment can be completed
/// without having passed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i16", db_type = "Integer")]
pub enum Pass {
    Unset = 0,
    Passed = 1,
    Failed = 2,
}

impl Pass {
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrolments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub lo_id: Uuid,
    pub taken_portal_id: Uuid,
    /// NULL marks the root of a per-user enrolment tree.
    pub parent_enrolment_id: Option<Uuid>,
    pub status: Status,
    pub pass: Pass,
    pub result: Option<f64>,
    pub start_date: Option<DateTime>,
    pub end_date: Option<DateTime>,
    /// Mirror of the linked plan's due date for read convenience.
    pub due_date: Option<DateTime>,
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::lo::Entity",
        from = "Column::LoId",
        to = "super::lo::Column::Id"
    )]
    Lo,
    #[sea_orm(has_many = "revision::Entity")]
    Revision,
    #[sea_orm(has_many = "plan_link::Entity")]
    PlanLink,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::lo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lo.def()
    }
}

impl Related<revision::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revision.def()
    }
}

impl Related<plan_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

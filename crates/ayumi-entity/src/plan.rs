pub mod reference;
pub mod revision;

use sea_orm::entity::prelude::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_status_enum")]
pub enum Status {
    /// A human assigner confirmed the plan.
    #[sea_orm(string_value = "assigned")]
    Assigned,
    /// System-suggested due date, not yet confirmed by an assigner.
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl Status {
    #[must_use]
    pub fn active(&self) -> bool {
        match self {
            Self::Assigned | Self::Scheduled => true,
            Self::Archived => false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_type_enum")]
pub enum PlanType {
    #[sea_orm(string_value = "assign")]
    Assign,
    #[sea_orm(string_value = "suggested")]
    Suggested,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_entity_type_enum")]
pub enum EntityType {
    #[sea_orm(string_value = "lo")]
    Lo,
    #[sea_orm(string_value = "award")]
    Award,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// NULL means self-directed / created by the system.
    pub assigner_id: Option<Uuid>,
    pub portal_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub status: Status,
    pub due_date: Option<DateTime>,
    pub created: DateTime,
    pub plan_type: PlanType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "reference::Entity")]
    Reference,
    #[sea_orm(has_many = "crate::enrolment::plan_link::Entity")]
    EnrolmentLink,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reference.def()
    }
}

impl Related<crate::enrolment::plan_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnrolmentLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

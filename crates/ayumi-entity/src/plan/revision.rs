use sea_orm::entity::prelude::*;

use super::{EntityType, PlanType, Status};

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_action_enum")]
pub enum Action {
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "reassigned")]
    Reassigned,
    #[sea_orm(string_value = "auto-reassigned")]
    AutoReassigned,
}

/// Append-only snapshot of a plan superseded by a reassignment, keyed by the
/// plan that replaced it. The `assigner_id` is the original assigner.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plan_revisions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plan_id: Uuid,
    pub superseded_plan_id: Uuid,
    pub user_id: Uuid,
    pub assigner_id: Option<Uuid>,
    pub portal_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub status: Status,
    pub due_date: Option<DateTime>,
    pub plan_type: PlanType,
    pub action: Action,
    /// Effective timestamp of the supersession; may lie in the past or the
    /// future relative to the wall clock of the request.
    pub created: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Entity",
        from = "Column::PlanId",
        to = "super::Column::Id"
    )]
    Plan,
}

impl Related<super::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

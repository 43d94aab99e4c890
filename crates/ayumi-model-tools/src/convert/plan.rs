use chrono::NaiveDateTime;
use ayumi_entity::plan::{
    EntityType as EntityTypeDb, Model as PlanModel, PlanType as PlanTypeDb, Status as StatusDb,
    reference::{Model as ReferenceModel, RefStatus},
    revision::Action as ActionDb,
};
use ayumi_model::plan::{Plan, PlanAction, PlanEntityType, PlanReference, PlanStatus, PlanType};

use crate::convert::{FromDbModel, FromModel, IntoModel};

impl FromDbModel<StatusDb> for PlanStatus {
    fn from_db_model(model: StatusDb) -> Self {
        match model {
            StatusDb::Assigned => Self::Assigned,
            StatusDb::Scheduled => Self::Scheduled,
            StatusDb::Archived => Self::Archived,
        }
    }
}

impl FromModel<PlanStatus> for StatusDb {
    fn from_model(model: PlanStatus) -> Self {
        match model {
            PlanStatus::Assigned => Self::Assigned,
            PlanStatus::Scheduled => Self::Scheduled,
            PlanStatus::Archived => Self::Archived,
        }
    }
}

impl FromDbModel<PlanTypeDb> for PlanType {
    fn from_db_model(model: PlanTypeDb) -> Self {
        match model {
            PlanTypeDb::Assign => Self::Assign,
            PlanTypeDb::Suggested => Self::Suggested,
        }
    }
}

impl FromDbModel<EntityTypeDb> for PlanEntityType {
    fn from_db_model(model: EntityTypeDb) -> Self {
        match model {
            EntityTypeDb::Lo => Self::Lo,
            EntityTypeDb::Award => Self::Award,
        }
    }
}

impl FromModel<PlanEntityType> for EntityTypeDb {
    fn from_model(model: PlanEntityType) -> Self {
        match model {
            PlanEntityType::Lo => Self::Lo,
            PlanEntityType::Award => Self::Award,
        }
    }
}

impl FromDbModel<ActionDb> for PlanAction {
    fn from_db_model(model: ActionDb) -> Self {
        match model {
            ActionDb::Assigned => Self::Assigned,
            ActionDb::Reassigned => Self::Reassigned,
            ActionDb::AutoReassigned => Self::AutoReassigned,
        }
    }
}

impl FromDbModel<PlanModel> for Plan {
    fn from_db_model(model: PlanModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            assigner_id: model.assigner_id,
            portal_id: model.portal_id,
            entity_type: model.entity_type.into_model(),
            entity_id: model.entity_id,
            status: model.status.into_model(),
            due_date: model.due_date.as_ref().map(NaiveDateTime::and_utc),
            created: model.created.and_utc(),
            plan_type: model.plan_type.into_model(),
        }
    }
}

impl FromDbModel<ReferenceModel> for PlanReference {
    fn from_db_model(model: ReferenceModel) -> Self {
        Self {
            id: model.id,
            plan_id: model.plan_id,
            source_type: "group".to_owned(),
            source_id: model.source_id,
            active: model.ref_status == RefStatus::Active,
        }
    }
}

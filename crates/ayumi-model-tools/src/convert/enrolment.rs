use chrono::NaiveDateTime;
use ayumi_entity::enrolment::{
    Model as EnrolmentModel, Pass as PassDb, Status as StatusDb, revision::Model as RevisionModel,
};
use ayumi_model::enrolment::{Enrolment, EnrolmentRevision, EnrolmentStatus, PassState};

use crate::convert::{FromDbModel, FromModel, IntoModel};

impl FromDbModel<StatusDb> for EnrolmentStatus {
    fn from_db_model(model: StatusDb) -> Self {
        match model {
            StatusDb::NotStarted => Self::NotStarted,
            StatusDb::InProgress => Self::InProgress,
            StatusDb::Pending => Self::Pending,
            StatusDb::Completed => Self::Completed,
            StatusDb::Expired => Self::Expired,
        }
    }
}

impl FromModel<EnrolmentStatus> for StatusDb {
    fn from_model(model: EnrolmentStatus) -> Self {
        match model {
            EnrolmentStatus::NotStarted => Self::NotStarted,
            EnrolmentStatus::InProgress => Self::InProgress,
            EnrolmentStatus::Pending => Self::Pending,
            EnrolmentStatus::Completed => Self::Completed,
            EnrolmentStatus::Expired => Self::Expired,
        }
    }
}

impl FromDbModel<PassDb> for PassState {
    fn from_db_model(model: PassDb) -> Self {
        match model {
            PassDb::Unset => Self::Unset,
            PassDb::Passed => Self::Passed,
            PassDb::Failed => Self::Failed,
        }
    }
}

impl FromModel<PassState> for PassDb {
    fn from_model(model: PassState) -> Self {
        match model {
            PassState::Unset => Self::Unset,
            PassState::Passed => Self::Passed,
            PassState::Failed => Self::Failed,
        }
    }
}

impl FromDbModel<EnrolmentModel> for Enrolment {
    fn from_db_model(model: EnrolmentModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            profile_id: model.profile_id,
            lo_id: model.lo_id,
            taken_portal_id: model.taken_portal_id,
            parent_enrolment_id: model.parent_enrolment_id,
            status: model.status.into_model(),
            pass: model.pass.into_model(),
            result: model.result,
            start_date: model.start_date.as_ref().map(NaiveDateTime::and_utc),
            end_date: model.end_date.as_ref().map(NaiveDateTime::and_utc),
            due_date: model.due_date.as_ref().map(NaiveDateTime::and_utc),
            data: model.data,
        }
    }
}

impl FromDbModel<RevisionModel> for EnrolmentRevision {
    fn from_db_model(model: RevisionModel) -> Self {
        Self {
            id: model.id,
            enrolment_id: model.enrolment_id,
            status: model.status.into_model(),
            pass: model.pass.into_model(),
            result: model.result,
            actor_id: model.actor_id,
            note: model.note,
            created: model.created.and_utc(),
        }
    }
}

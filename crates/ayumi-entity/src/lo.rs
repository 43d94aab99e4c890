pub mod edge;

use sea_orm::entity::prelude::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lo_type_enum")]
pub enum LoType {
    #[sea_orm(string_value = "pathway")]
    Pathway,
    #[sea_orm(string_value = "course")]
    Course,
    #[sea_orm(string_value = "module")]
    Module,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "resource")]
    Resource,
    #[sea_orm(string_value = "question")]
    Question,
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "event")]
    Event,
    #[sea_orm(string_value = "lti")]
    Lti,
    #[sea_orm(string_value = "interactive")]
    Interactive,
    #[sea_orm(string_value = "quiz")]
    Quiz,
    #[sea_orm(string_value = "assignment")]
    Assignment,
    #[sea_orm(string_value = "award")]
    Award,
}

impl LoType {
    /// Containers aggregate their children's enrolment state; leaves are
    /// driven by direct updates only.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Pathway | Self::Course | Self::Module)
    }

    /// Item types whose tree output gets decorated with registration data
    /// from the external progress service.
    #[must_use]
    pub fn supports_registrations(&self) -> bool {
        matches!(self, Self::Event | Self::Lti)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "publish_status_enum")]
pub enum PublishStatus {
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "unpublished")]
    Unpublished,
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "learning_objects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lo_type: LoType,
    pub title: String,
    pub publish_status: PublishStatus,
    /// Minimum number of electives required for completion. NULL means every
    /// elective child is required.
    pub elective_number: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "edge::Entity")]
    Edge,
    #[sea_orm(has_many = "super::enrolment::Entity")]
    Enrolment,
}

impl Related<edge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Edge.def()
    }
}

impl Related<super::enrolment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrolment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lo_edge_kind_enum")]
pub enum EdgeKind {
    /// Tree edge: parent contains child.
    #[sea_orm(string_value = "contains")]
    Contains,
    /// Module-level dependency declaration between siblings.
    #[sea_orm(string_value = "depends_on")]
    DependsOn,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lo_edges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parent_id: Uuid,
    pub child_id: Uuid,
    pub kind: EdgeKind,
    pub elective: bool,
    pub ordering: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Entity",
        from = "Column::ParentId",
        to = "super::Column::Id"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "super::Entity",
        from = "Column::ChildId",
        to = "super::Column::Id"
    )]
    Child,
}

impl Related<super::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use ayumi_entity::lo::{self, Entity as Lo, LoType, PublishStatus, edge};
use ayumi_entity::user::{Entity as User, Model as UserModel};
use sea_orm::{DatabaseConnection, EntityTrait, IntoActiveModel};
use uuid::Uuid;

#[allow(dead_code)]
pub async fn create_test_user(db: &DatabaseConnection) -> UserModel {
    let user = UserModel {
        id: Uuid::new_v4(),
        name: Some("test".to_owned()),
        active: true,
    };
    User::insert(user.clone().into_active_model()).exec(db).await.unwrap();
    user
}

#[allow(dead_code)]
pub async fn create_lo(db: &DatabaseConnection, lo_type: LoType, elective_number: Option<i32>) -> lo::Model {
    let model = lo::Model {
        id: Uuid::new_v4(),
        lo_type,
        title: "test lo".to_owned(),
        publish_status: PublishStatus::Published,
        elective_number,
    };
    Lo::insert(model.clone().into_active_model()).exec(db).await.unwrap();
    model
}

#[allow(dead_code)]
pub async fn contains(db: &DatabaseConnection, parent: Uuid, child: Uuid, elective: bool, ordering: i32) {
    let model = edge::Model {
        id: Uuid::new_v4(),
        parent_id: parent,
        child_id: child,
        kind: edge::EdgeKind::Contains,
        elective,
        ordering,
    };
    edge::Entity::insert(model.into_active_model()).exec(db).await.unwrap();
}

#[allow(dead_code)]
pub async fn depends_on(db: &DatabaseConnection, parent: Uuid, child: Uuid) {
    let model = edge::Model {
        id: Uuid::new_v4(),
        parent_id: parent,
        child_id: child,
        kind: edge::EdgeKind::DependsOn,
        elective: false,
        ordering: 0,
    };
    edge::Entity::insert(model.into_active_model()).exec(db).await.unwrap();
}


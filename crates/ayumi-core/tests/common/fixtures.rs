use ayumi_db::enrolment::{Mutation, NewEnrolment};
use ayumi_entity::enrolment::{Model as Enrolment, Status};
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
pub async fn create_deactivated_user(db: &DatabaseConnection) -> UserModel {
    let user = UserModel {
        id: Uuid::new_v4(),
        name: Some("gone".to_owned()),
        active: false,
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

#[allow(dead_code)]
pub async fn enrol(
    db: &DatabaseConnection,
    user_id: Uuid,
    lo_id: Uuid,
    portal_id: Uuid,
    parent: Option<Uuid>,
) -> Enrolment {
    Mutation::create(
        db,
        NewEnrolment {
            user_id,
            profile_id: None,
            lo_id,
            taken_portal_id: portal_id,
            parent_enrolment_id: parent,
            status: Status::NotStarted,
        },
    )
    .await
    .unwrap()
}

/// The standard test tree: a course with two mandatory items and a module of
/// two electives with a quorum of one, mirrored by a full enrolment tree.
#[allow(dead_code)]
pub struct CourseFixture {
    pub portal: Uuid,
    pub user: UserModel,
    pub course: lo::Model,
    pub resource: lo::Model,
    pub video: lo::Model,
    pub module: lo::Model,
    pub question: lo::Model,
    pub text: lo::Model,
    pub course_enr: Enrolment,
    pub resource_enr: Enrolment,
    pub video_enr: Enrolment,
    pub module_enr: Enrolment,
    pub question_enr: Enrolment,
    pub text_enr: Enrolment,
}

#[allow(dead_code)]
pub async fn course_fixture(db: &DatabaseConnection) -> CourseFixture {
    let portal = Uuid::new_v4();
    let user = create_test_user(db).await;

    let course = create_lo(db, LoType::Course, None).await;
    let resource = create_lo(db, LoType::Resource, None).await;
    let video = create_lo(db, LoType::Video, None).await;
    let module = create_lo(db, LoType::Module, Some(1)).await;
    let question = create_lo(db, LoType::Question, None).await;
    let text = create_lo(db, LoType::Text, None).await;

    contains(db, course.id, resource.id, false, 0).await;
    contains(db, course.id, video.id, false, 1).await;
    contains(db, course.id, module.id, false, 2).await;
    contains(db, module.id, question.id, true, 0).await;
    contains(db, module.id, text.id, true, 1).await;

    let course_enr = enrol(db, user.id, course.id, portal, None).await;
    let resource_enr = enrol(db, user.id, resource.id, portal, Some(course_enr.id)).await;
    let video_enr = enrol(db, user.id, video.id, portal, Some(course_enr.id)).await;
    let module_enr = enrol(db, user.id, module.id, portal, Some(course_enr.id)).await;
    let question_enr = enrol(db, user.id, question.id, portal, Some(module_enr.id)).await;
    let text_enr = enrol(db, user.id, text.id, portal, Some(module_enr.id)).await;

    CourseFixture {
        portal,
        user,
        course,
        resource,
        video,
        module,
        question,
        text,
        course_enr,
        resource_enr,
        video_enr,
        module_enr,
        question_enr,
        text_enr,
    }
}

mod common;

use crate::common::fixtures::{create_lo, create_test_user};
use crate::common::setup_schema;

use ayumi_db::plan::{Mutation, NewPlan, Query};
use ayumi_entity::plan::{EntityType, PlanType, Status, reference::RefStatus, reference::SourceType, revision::Action};
use chrono::{Duration, Utc};
use sea_orm::Database;
use test_log::test;
use uuid::Uuid;

fn new_plan(user_id: Uuid, portal_id: Uuid, entity_id: Uuid, assigner_id: Option<Uuid>) -> NewPlan {
    NewPlan {
        user_id,
        assigner_id,
        portal_id,
        entity_type: EntityType::Lo,
        entity_id,
        status: Status::Assigned,
        due_date: Some((Utc::now() + Duration::days(7)).naive_utc()),
        plan_type: PlanType::Assign,
    }
}

#[test(tokio::test)]
async fn test_find_active_excludes_archived() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let user = create_test_user(conn).await;
    let course = create_lo(conn, ayumi_entity::lo::LoType::Course, None).await;
    let portal = Uuid::new_v4();

    let mut plan = Mutation::create(conn, new_plan(user.id, portal, course.id, None)).await.unwrap();
    let found = Query::find_active(conn, user.id, portal, EntityType::Lo, course.id)
        .await
        .unwrap();
    assert_eq!(found.as_ref().map(|p| p.id), Some(plan.id));

    plan.status = Status::Archived;
    Mutation::update(conn, plan).await.unwrap();
    let found = Query::find_active(conn, user.id, portal, EntityType::Lo, course.id)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[test(tokio::test)]
async fn test_archive_and_recreate_preserves_lineage() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let user = create_test_user(conn).await;
    let assigner = create_test_user(conn).await;
    let course = create_lo(conn, ayumi_entity::lo::LoType::Course, None).await;
    let portal = Uuid::new_v4();

    let old = Mutation::create(conn, new_plan(user.id, portal, course.id, Some(assigner.id)))
        .await
        .unwrap();
    let old_id = old.id;

    let reassign_date = Utc::now().naive_utc();
    let new = Mutation::archive_and_recreate(
        conn,
        old,
        new_plan(user.id, portal, course.id, None),
        Action::Reassigned,
        reassign_date,
    )
    .await
    .unwrap();

    assert_ne!(new.id, old_id);
    assert!(Query::load(conn, old_id).await.unwrap().is_none());

    let revisions = Query::load_revisions(conn, new.id).await.unwrap();
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].superseded_plan_id, old_id);
    assert_eq!(revisions[0].assigner_id, Some(assigner.id));
    assert_eq!(revisions[0].action, Action::Reassigned);
    assert_eq!(revisions[0].created, reassign_date);
}

#[test(tokio::test)]
async fn test_delete_soft_deletes_references() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let user = create_test_user(conn).await;
    let course = create_lo(conn, ayumi_entity::lo::LoType::Course, None).await;
    let portal = Uuid::new_v4();
    let group_id = Uuid::new_v4();

    let plan = Mutation::create(conn, new_plan(user.id, portal, course.id, None)).await.unwrap();
    Mutation::link_reference(conn, plan.id, SourceType::Group, group_id)
        .await
        .unwrap();

    Mutation::delete(conn, plan.id).await.unwrap();

    assert!(Query::load(conn, plan.id).await.unwrap().is_none());
    let reference = Query::find_reference(conn, plan.id, SourceType::Group, group_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reference.ref_status, RefStatus::Deleted);

    // deleted references no longer resolve the plan by source
    let by_source = Query::find_by_source(conn, SourceType::Group, group_id).await.unwrap();
    assert!(by_source.is_empty());
}

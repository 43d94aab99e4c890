mod common;

use crate::common::fixtures::{course_fixture, create_lo, depends_on, enrol};
use crate::common::{propagator, setup_schema};

use ayumi_core::Propagator;
use ayumi_core::authorize::DenyAll;
use ayumi_core::event::RecordingEmitter;
use ayumi_core::propagation::error::PropagationError;
use ayumi_core::tree::DbTreeReader;
use ayumi_db::enrolment::Query;
use ayumi_entity::enrolment::{Pass, Status};
use ayumi_entity::lo::LoType;
use ayumi_model::event::EventTopic;
use sea_orm::{ConnectionTrait, Database};
use std::sync::Arc;
use test_log::test;
use uuid::Uuid;

#[test(tokio::test)]
async fn test_scenario_passed_electives() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;
    let (propagator, emitter) = propagator(conn);

    // Complete the first mandatory item: the course starts, nothing
    // completes.
    propagator
        .set_status(conn, fx.resource_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::InProgress);
    let module = Query::load(conn, fx.module_enr.id).await.unwrap().unwrap();
    assert_eq!(module.status, Status::NotStarted);

    // Second mandatory item: still in progress, the module quorum is unmet.
    propagator
        .set_status(conn, fx.video_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::InProgress);

    // One passed elective satisfies the quorum of one: module and course
    // flip to completed and passed in the same walk.
    propagator
        .set_status(conn, fx.text_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();

    let module = Query::load(conn, fx.module_enr.id).await.unwrap().unwrap();
    assert_eq!(module.status, Status::Completed);
    assert_eq!(module.pass, Pass::Passed);
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::Completed);
    assert_eq!(course.pass, Pass::Passed);

    // Child events precede parent events within the final walk.
    let events = emitter.messages();
    let last_three: Vec<Uuid> = events[events.len() - 3..].iter().map(|m| m.entity_id).collect();
    assert_eq!(last_three, vec![fx.text_enr.id, fx.module_enr.id, fx.course_enr.id]);
    assert!(events.iter().all(|m| m.topic == EventTopic::EnrolmentUpdate));
}

#[test(tokio::test)]
async fn test_scenario_failed_mandatory() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;
    let (propagator, _emitter) = propagator(conn);

    propagator
        .set_status(conn, fx.resource_enr.id, Status::Completed, Pass::Failed, Some(0.0), None)
        .await
        .unwrap();
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::InProgress);
    assert_eq!(course.pass, Pass::Unset);

    propagator
        .set_status(conn, fx.video_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();
    propagator
        .set_status(conn, fx.question_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();

    // Completion quorum is met everywhere, but the failed mandatory item
    // poisons the pass flag upward.
    let module = Query::load(conn, fx.module_enr.id).await.unwrap().unwrap();
    assert_eq!(module.status, Status::Completed);
    assert_eq!(module.pass, Pass::Passed);
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::Completed);
    assert_eq!(course.pass, Pass::Failed);
}

#[test(tokio::test)]
async fn test_completed_but_failed_elective_completes_without_pass() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;
    let (propagator, _emitter) = propagator(conn);

    propagator
        .set_status(conn, fx.resource_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();
    propagator
        .set_status(conn, fx.video_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();
    // The elective completes but fails: completion quorum satisfied, pass
    // quorum not.
    propagator
        .set_status(conn, fx.text_enr.id, Status::Completed, Pass::Failed, Some(0.2), None)
        .await
        .unwrap();

    let module = Query::load(conn, fx.module_enr.id).await.unwrap().unwrap();
    assert_eq!(module.status, Status::Completed);
    assert_eq!(module.pass, Pass::Failed);
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::Completed);
    assert_eq!(course.pass, Pass::Failed);
}

#[test(tokio::test)]
async fn test_recalculate_without_drift_is_a_noop() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;
    let (propagator, emitter) = propagator(conn);

    propagator
        .set_status(conn, fx.resource_enr.id, Status::Completed, Pass::Passed, Some(1.0), None)
        .await
        .unwrap();

    let before_events = emitter.messages().len();
    let before_revisions = Query::load_revisions(conn, fx.course_enr.id).await.unwrap().len();

    propagator.recalculate(conn, fx.course_enr.id, None).await.unwrap();

    assert_eq!(emitter.messages().len(), before_events);
    assert_eq!(
        Query::load_revisions(conn, fx.course_enr.id).await.unwrap().len(),
        before_revisions
    );
}

#[test(tokio::test)]
async fn test_recalculate_repairs_drift() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;
    let (propagator, _emitter) = propagator(conn);

    // Complete every child of the module directly, without propagation.
    for id in [fx.question_enr.id, fx.text_enr.id] {
        let mut enr = Query::load(conn, id).await.unwrap().unwrap();
        enr.status = Status::Completed;
        enr.pass = Pass::Passed;
        ayumi_db::enrolment::Mutation::save_row(conn, enr).await.unwrap();
    }

    propagator.recalculate(conn, fx.module_enr.id, None).await.unwrap();

    let module = Query::load(conn, fx.module_enr.id).await.unwrap().unwrap();
    assert_eq!(module.status, Status::Completed);
    assert_eq!(module.pass, Pass::Passed);
    // The repaired module also moves the course off not-started.
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::InProgress);
}

#[test(tokio::test)]
async fn test_permission_denied_is_a_hard_stop() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;

    let emitter = Arc::new(RecordingEmitter::new());
    let propagator = Propagator::new(
        Arc::new(DbTreeReader::new(conn.clone())),
        emitter.clone(),
        Arc::new(DenyAll),
    );

    let err = propagator
        .set_status(conn, fx.resource_enr.id, Status::Completed, Pass::Passed, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PropagationError::Permission));

    let leaf = Query::load(conn, fx.resource_enr.id).await.unwrap().unwrap();
    assert_eq!(leaf.status, Status::NotStarted);
    assert!(emitter.messages().is_empty());
}

#[test(tokio::test)]
async fn test_walk_rolls_back_and_stays_silent_on_write_failure() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;
    let (propagator, emitter) = propagator(conn);

    // Break the revision table so the write phase fails mid-walk.
    conn.execute_unprepared("DROP TABLE enrolment_revisions").await.unwrap();

    propagator
        .set_status(conn, fx.resource_enr.id, Status::Completed, Pass::Passed, None, None)
        .await
        .unwrap_err();

    // Nothing committed, including the originating leaf write, and nothing
    // was emitted.
    let leaf = Query::load(conn, fx.resource_enr.id).await.unwrap().unwrap();
    assert_eq!(leaf.status, Status::NotStarted);
    let course = Query::load(conn, fx.course_enr.id).await.unwrap().unwrap();
    assert_eq!(course.status, Status::NotStarted);
    assert!(emitter.messages().is_empty());
}

#[test(tokio::test)]
async fn test_dependency_edges_notify_dependants() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let fx = course_fixture(conn).await;
    let (propagator, emitter) = propagator(conn);

    // A sibling module depends on the elective module.
    let follow_up = create_lo(conn, LoType::Module, None).await;
    depends_on(conn, follow_up.id, fx.module.id).await;
    let follow_up_enr = enrol(conn, fx.user.id, follow_up.id, fx.portal, Some(fx.course_enr.id)).await;

    propagator
        .set_status(conn, fx.text_enr.id, Status::Completed, Pass::Passed, None, None)
        .await
        .unwrap();

    let events = emitter.messages();
    let dependant_positions: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, m)| m.entity_id == follow_up_enr.id)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(dependant_positions.len(), 1);
    // The dependant notification follows the ancestor chain of the walk.
    let module_position = events.iter().position(|m| m.entity_id == fx.module_enr.id).unwrap();
    assert!(dependant_positions[0] > module_position);
}

#[test(tokio::test)]
async fn test_missing_enrolment_is_not_found() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();
    let (propagator, _emitter) = propagator(conn);

    let err = propagator
        .set_status(conn, Uuid::new_v4(), Status::Completed, Pass::Passed, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PropagationError::EnrolmentNotFound));
}

mod common;

use crate::common::fixtures::{contains, create_lo, depends_on};
use crate::common::setup_schema;

use ayumi_db::lo::Query;
use ayumi_entity::lo::LoType;
use sea_orm::Database;
use test_log::test;

#[test(tokio::test)]
async fn test_children_ordered_with_elective_flags() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();

    let module = create_lo(conn, LoType::Module, Some(1)).await;
    let video = create_lo(conn, LoType::Video, None).await;
    let question = create_lo(conn, LoType::Question, None).await;
    let text = create_lo(conn, LoType::Text, None).await;

    contains(conn, module.id, question.id, true, 1).await;
    contains(conn, module.id, video.id, false, 0).await;
    contains(conn, module.id, text.id, true, 2).await;

    let children = Query::children(conn, module.id).await.unwrap();
    assert_eq!(
        children.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![video.id, question.id, text.id]
    );
    assert_eq!(
        children.iter().map(|c| c.elective).collect::<Vec<_>>(),
        vec![false, true, true]
    );

    assert_eq!(Query::elective_minimum(conn, module.id).await.unwrap(), Some(1));
    assert!(Query::is_published(conn, module.id).await.unwrap());
}

#[test(tokio::test)]
async fn test_dependants() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();

    let base = create_lo(conn, LoType::Module, None).await;
    let consumer = create_lo(conn, LoType::Module, None).await;
    depends_on(conn, consumer.id, base.id).await;

    assert_eq!(Query::dependants(conn, base.id).await.unwrap(), vec![consumer.id]);
    assert!(Query::dependants(conn, consumer.id).await.unwrap().is_empty());
}

pub mod fixtures;

use ayumi_core::authorize::AllowAll;
use ayumi_core::event::RecordingEmitter;
use ayumi_core::tree::DbTreeReader;
use ayumi_core::{Propagator, Reconciler};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbConn, DbErr};
use std::sync::Arc;

pub async fn setup_schema(db: &DbConn) -> Result<(), DbErr> {
    let migration = match db.get_database_backend() {
        sea_orm::DatabaseBackend::Postgres => include_str!("postgres.sql"),
        sea_orm::DatabaseBackend::Sqlite => include_str!("sqlite.sql"),
        #[allow(clippy::unimplemented)]
        sea_orm::DatabaseBackend::MySql => unimplemented!(),
    };

    db.execute_unprepared(migration).await?;
    Ok(())
}

#[allow(dead_code)]
pub fn propagator(conn: &DatabaseConnection) -> (Propagator, Arc<RecordingEmitter>) {
    let emitter = Arc::new(RecordingEmitter::new());
    let propagator = Propagator::new(
        Arc::new(DbTreeReader::new(conn.clone())),
        emitter.clone(),
        Arc::new(AllowAll),
    );
    (propagator, emitter)
}

#[allow(dead_code)]
pub fn reconciler(conn: &DatabaseConnection) -> (Reconciler, Arc<RecordingEmitter>) {
    let emitter = Arc::new(RecordingEmitter::new());
    let reconciler = Reconciler::new(
        Arc::new(DbTreeReader::new(conn.clone())),
        emitter.clone(),
        Arc::new(AllowAll),
    );
    (reconciler, emitter)
}

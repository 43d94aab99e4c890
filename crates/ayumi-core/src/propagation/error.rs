use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Enrolment not found")]
    EnrolmentNotFound,

    #[error("Operation not permitted")]
    Permission,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Malformed input. Every failed assertion is reported together.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Operation not permitted")]
    Permission,

    /// A business rule rejected an otherwise well-formed request.
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

use thiserror::Error;

use crate::item::ItemId;

pub type Result<T> = std::result::Result<T, JobError>;

/// Errors raised by job and inventory operations.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("unknown item {0}")]
    UnknownItem(ItemId),

    #[error("a job needs at least one target item")]
    EmptyJob,

    #[error("no job is active")]
    NoActiveJob,

    #[error("a job is already in progress")]
    JobInProgress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

use pickar_job::JobError;
use pickar_nav::NavError;
use thiserror::Error;

use crate::session::Mode;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors raised while driving a session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error("operation needs {expected:?} mode")]
    WrongMode { expected: Mode },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

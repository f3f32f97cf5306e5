use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("judge role required")]
    Forbidden,

    #[error("score must be between 1 and 10, got {0}")]
    InvalidScore(i64),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("submission {0} not found")]
    NotFound(Uuid),

    #[error("invalid pagination cursor '{0}'")]
    InvalidCursor(String),

    #[error("document store failure: {0}")]
    Store(String),
}

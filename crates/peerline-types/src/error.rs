use thiserror::Error;

/// Errors surfaced by chat session operations.
///
/// Every variant is a per-request outcome; none of them leave a session or
/// message partially committed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("session or message not found")]
    NotFound,

    #[error("session is closed")]
    SessionClosed,

    #[error("message content is empty")]
    EmptyContent,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("session already assigned to another advocate")]
    AlreadyAssigned,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in peerline-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other.to_string()),
        }
    }
}

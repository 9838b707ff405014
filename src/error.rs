use thiserror::Error;

#[derive(Debug, Error)]
pub enum FridgeDbError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Failed to initialize schema with `{sql}`: {source}")]
    InitializationError {
        sql: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Statement misuse on {command}: {source}")]
    Misuse {
        command: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Worker error: {0}")]
    WorkerError(String),
}

pub(crate) fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}

/// Validation failures detected before any statement runs.
///
/// Every variant maps onto one fixed reply in [`crate::replies::StaticReplies`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("not JSON")]
    NotJson,

    #[error("no such request")]
    NoSuchRequest,

    #[error("{0} not defined")]
    FieldNotDefined(&'static str),

    #[error("{0} malformed")]
    MalformedField(&'static str),
}

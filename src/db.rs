use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::config::{DEFAULT_BUSY_TIMEOUT, ServerOptions};
use crate::connection::Connection;
use crate::error::FridgeDbError;
use crate::replies::StaticReplies;

/// Handle to the database file. Produces independent connections.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    busy_timeout: Duration,
    replies: Arc<StaticReplies>,
}

impl Database {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            replies: Arc::new(StaticReplies::new()),
        }
    }

    #[must_use]
    pub fn from_options(opts: &ServerOptions) -> Self {
        Self::new(opts.db_path.clone()).with_busy_timeout(opts.busy_timeout)
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open and initialize a new connection, or log why that failed.
    ///
    /// `None` means one fewer worker, not a fatal error.
    #[must_use]
    pub fn open_connection(&self) -> Option<Connection> {
        match self.try_open_connection() {
            Ok(conn) => Some(conn),
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "failed to open database");
                None
            }
        }
    }

    /// Fallible form of [`Database::open_connection`].
    ///
    /// # Errors
    /// Returns `FridgeDbError` if the file cannot be opened or the schema cannot
    /// be initialized.
    pub fn try_open_connection(&self) -> Result<Connection, FridgeDbError> {
        let raw = rusqlite::Connection::open(&self.path)?;
        raw.busy_timeout(self.busy_timeout)?;
        Connection::initialize(raw, Arc::clone(&self.replies))
    }
}

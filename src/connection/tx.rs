use tracing::warn;

use crate::error::FridgeDbError;
use crate::registry::Statement;

use super::step::drive;

/// Explicit transaction on one connection, rolled back on drop unless committed.
///
/// Begins with `BEGIN IMMEDIATE` so the write lock is taken up front; a busy
/// database is retried at that point instead of halfway through a batch.
pub(crate) struct TransactionScope<'c> {
    conn: &'c rusqlite::Connection,
    command: &'static str,
    finished: bool,
}

impl<'c> TransactionScope<'c> {
    pub(crate) fn begin(
        conn: &'c rusqlite::Connection,
        command: &'static str,
    ) -> Result<Self, FridgeDbError> {
        run_control(conn, Statement::Begin, command)?;
        Ok(Self {
            conn,
            command,
            finished: false,
        })
    }

    pub(crate) fn commit(mut self) -> Result<(), FridgeDbError> {
        run_control(self.conn, Statement::Commit, self.command)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = run_control(self.conn, Statement::Rollback, self.command) {
            warn!(command = self.command, error = %err, "rollback failed");
        }
    }
}

fn run_control(
    conn: &rusqlite::Connection,
    statement: Statement,
    command: &'static str,
) -> Result<(), FridgeDbError> {
    let mut stmt = conn
        .prepare_cached(statement.sql())
        .map_err(|source| FridgeDbError::Misuse { command, source })?;
    drive(&mut stmt, &[], command, |_| Ok(()))?;
    Ok(())
}

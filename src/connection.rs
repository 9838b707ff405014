//! Per-connection statement engine.
//!
//! A [`Connection`] owns one native `SQLite` handle. Every statement in the
//! registry is compiled into the handle's statement cache when the connection
//! is built; requests only ever look those statements up again. The cache, and
//! every statement in it, is finalized when the connection drops.

mod step;
mod tx;

use std::fmt;
use std::sync::Arc;

use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{FridgeDbError, RequestError};
use crate::registry::{self, BoundRequest, INITIALIZERS, Operation, Statement};
use crate::replies::{Reply, StaticReplies};
use crate::request::{self, NewItem};

use step::drive;
use tx::TransactionScope;

/// Room for every registry statement so none is ever evicted and recompiled.
const STATEMENT_CACHE_CAPACITY: usize = 32;

pub struct Connection {
    conn: rusqlite::Connection,
    live: Vec<Operation>,
    replies: Arc<StaticReplies>,
}

impl Connection {
    /// Create the schema if needed and compile every operation.
    ///
    /// Operations whose statements fail to compile are logged and left out of
    /// the live set; requests naming them get the no-such-request reply.
    ///
    /// # Errors
    /// Returns `FridgeDbError::InitializationError` if a schema statement fails
    /// to compile, or `FridgeDbError::Misuse` if one fails to run.
    pub fn initialize(
        conn: rusqlite::Connection,
        replies: Arc<StaticReplies>,
    ) -> Result<Self, FridgeDbError> {
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY.max(Statement::ALL.len()));

        for sql in INITIALIZERS {
            let mut stmt = conn.prepare(sql).map_err(|source| {
                error!(sql, error = %source, "failed to compile an initializer statement");
                FridgeDbError::InitializationError { sql, source }
            })?;
            drive(&mut stmt, &[], "initializer", |_| Ok(()))?;
        }

        let live = Operation::ALL
            .into_iter()
            .filter(|op| compile_operation(&conn, *op))
            .collect();

        Ok(Self {
            conn,
            live,
            replies,
        })
    }

    /// Operations this connection can serve.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.live
    }

    #[must_use]
    pub fn replies(&self) -> &StaticReplies {
        &self.replies
    }

    /// Answer one request. Never fails: every outcome is a reply.
    #[must_use]
    pub fn query(&self, text: &str) -> String {
        match self.dispatch(text) {
            Ok(reply) => reply.to_wire(),
            Err(err) => self.replies.for_error(err).into_owned(),
        }
    }

    fn dispatch(&self, text: &str) -> Result<Reply, RequestError> {
        let value = request::parse(text)?;
        let (verb, body) = request::command(&value)?;
        let op = self
            .live
            .iter()
            .copied()
            .find(|op| op.command() == verb)
            .ok_or(RequestError::NoSuchRequest)?;
        let bound = op.bind(body)?;

        match self.execute(&bound) {
            Ok(values) => Ok(Reply {
                success: true,
                values: (op.returns_rows() || !values.is_empty()).then_some(values),
                message: None,
            }),
            Err(err) => {
                error!(command = op.command(), error = %err, "request failed");
                Ok(Reply::failure())
            }
        }
    }

    fn execute(&self, bound: &BoundRequest) -> Result<Vec<Value>, FridgeDbError> {
        let command = bound.operation().command();
        match bound {
            BoundRequest::GetItemsInFridge => self.run(
                command,
                Statement::SelectItemsInFridge,
                &[],
                registry::decode_fridge_row,
            ),
            BoundRequest::AddItemsToFridge(items) => self.add_items(command, items),
        }
    }

    /// Upsert each item's class and append its amount, all in one transaction.
    fn add_items(&self, command: &'static str, items: &[NewItem]) -> Result<Vec<Value>, FridgeDbError> {
        let scope = TransactionScope::begin(&self.conn, command)?;
        for item in items {
            debug!(command, name = %item.name, "adding item");
            self.run(command, Statement::InsertClass, &registry::bind_insert_class(item), |_| Ok(()))?;
            let class_id = self
                .run(
                    command,
                    Statement::UpdateClass,
                    &registry::bind_update_class(item),
                    registry::decode_id,
                )?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    FridgeDbError::ExecutionError(format!("no item class for {}", item.name))
                })?;
            self.run(
                command,
                Statement::InsertAmount,
                &registry::bind_insert_amount(class_id, item),
                |_| Ok(()),
            )?;
        }
        scope.commit()?;
        Ok(Vec::new())
    }

    fn run<T, F>(
        &self,
        command: &'static str,
        statement: Statement,
        params: &[SqlValue],
        decode: F,
    ) -> Result<Vec<T>, FridgeDbError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self
            .conn
            .prepare_cached(statement.sql())
            .map_err(|source| FridgeDbError::Misuse { command, source })?;
        drive(&mut stmt, params, command, decode)
    }
}

fn compile_operation(conn: &rusqlite::Connection, op: Operation) -> bool {
    for statement in op.statements() {
        if let Err(err) = conn.prepare_cached(statement.sql()) {
            error!(
                command = op.command(),
                sql = statement.sql(),
                error = %err,
                "failed to compile statement"
            );
            return false;
        }
    }
    true
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("path", &self.conn.path())
            .field("live", &self.live)
            .finish_non_exhaustive()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!(path = ?self.conn.path(), "closing connection");
    }
}

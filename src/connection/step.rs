use rusqlite::types::Value as SqlValue;
use rusqlite::{Row, Rows, Statement, params_from_iter};
use tracing::debug;

use crate::error::{FridgeDbError, is_busy};

/// Result of advancing a statement by one step.
pub(crate) enum StepOutcome<'r, 's> {
    /// Transient lock conflict; the busy timeout already elapsed once.
    Busy,
    Row(&'r Row<'s>),
    Done,
    Misuse(rusqlite::Error),
}

pub(crate) fn step<'r, 's>(rows: &'r mut Rows<'s>) -> StepOutcome<'r, 's> {
    match rows.next() {
        Ok(Some(row)) => StepOutcome::Row(row),
        Ok(None) => StepOutcome::Done,
        Err(err) if is_busy(&err) => StepOutcome::Busy,
        Err(err) => StepOutcome::Misuse(err),
    }
}

/// Bind `params`, step `stmt` to completion and decode every row.
///
/// `Busy` retries with no backoff and no limit; the connection's busy timeout is
/// the only bound. A failed step resets the statement, so a retry starts over
/// from the first row and rows decoded by the failed attempt are discarded.
/// The statement is reset when the row cursor drops, leaving it ready for the
/// next call.
///
/// # Errors
/// Returns `FridgeDbError::Misuse` for any non-busy failure while binding,
/// stepping or decoding.
pub(crate) fn drive<T, F>(
    stmt: &mut Statement<'_>,
    params: &[SqlValue],
    command: &'static str,
    mut decode: F,
) -> Result<Vec<T>, FridgeDbError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    'attempt: loop {
        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(|source| FridgeDbError::Misuse { command, source })?;
        let mut values = Vec::new();

        loop {
            match step(&mut rows) {
                StepOutcome::Busy => {
                    debug!(command, "database busy, retrying step");
                    continue 'attempt;
                }
                StepOutcome::Row(row) => {
                    let value = decode(row).map_err(|source| FridgeDbError::Misuse { command, source })?;
                    values.push(value);
                }
                StepOutcome::Done => return Ok(values),
                StepOutcome::Misuse(source) => return Err(FridgeDbError::Misuse { command, source }),
            }
        }
    }
}

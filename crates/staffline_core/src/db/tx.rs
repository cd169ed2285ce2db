//! Scoped transaction helper shared by all mutating use-cases.
//!
//! # Invariants
//! - The closure's writes are committed only when it returns `Ok`.
//! - Any other exit (error, early return, unwinding) rolls back, because
//!   `rusqlite::Transaction` rolls back on drop.
//! - Transactions are `IMMEDIATE`, so the write lock is taken up front and
//!   concurrent writers to the same store are serialized by SQLite.

use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Runs `op` inside one IMMEDIATE transaction on `conn`.
///
/// `operation` is a static label used only for logging.
///
/// # Errors
/// - Returns the closure's error unchanged after rolling back.
/// - Returns begin/commit failures converted through `From<rusqlite::Error>`.
pub fn run_in_transaction<T, E, F>(conn: &Connection, operation: &'static str, op: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
{
    let started_at = Instant::now();
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    match op(&tx) {
        Ok(value) => {
            tx.commit()?;
            debug!(
                "event=tx_commit module=db status=ok operation={operation} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=db status=error operation={operation} error={rollback_err}"
                );
            } else {
                debug!(
                    "event=tx_rollback module=db status=ok operation={operation} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
            }
            Err(err)
        }
    }
}

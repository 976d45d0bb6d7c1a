//! Unit-of-work execution inside one database transaction
//!
//! [`TransactionCoordinator::run`] begins a transaction, hands the unit of work
//! the transaction's connection, and commits only if the unit of work succeeds.
//!
//! ```text
//! begin ──► unit_of_work(&mut conn) ──Ok──► commit ──Ok──► value
//!                    │                         └─Err─► CommitFailed (outcome unknown)
//!                    └─Err──► rollback ──► original error
//! ```
//!
//! If the returned future is dropped before commit (caller cancelled, deadline
//! elapsed, task aborted, panic), the open `sqlx::Transaction` is dropped with
//! it and the driver rolls it back, so nothing from that call persists.

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::time::{timeout_at, Instant};

use crate::types::BankError;

/// Runs units of work atomically against the pool
#[derive(Debug, Clone)]
pub struct TransactionCoordinator {
    pool: SqlitePool,
}

impl TransactionCoordinator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute `unit_of_work` in a new transaction
    ///
    /// Every store call of the unit of work must go through the connection it
    /// is given. Errors from the unit of work are returned unchanged after the
    /// rollback. A failed commit is reported as `BankError::CommitFailed` and
    /// is never retried here.
    pub async fn run<T, F>(&self, unit_of_work: F) -> Result<T, BankError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, BankError>> + Send,
    {
        let mut tx = self.pool.begin().await?;
        let outcome = unit_of_work(&mut *tx).await;
        Self::finish(tx, outcome).await
    }

    /// Execute `unit_of_work` in a new transaction that must reach commit
    /// within `deadline`
    ///
    /// The deadline covers acquiring a connection and running the unit of
    /// work. If it elapses first, the transaction is rolled back and
    /// `BankError::DeadlineExceeded` (a transient error) is returned. A commit
    /// that has already started is allowed to finish. A deadline too far in
    /// the future to represent runs without one.
    pub async fn run_with_deadline<T, F>(
        &self,
        deadline: Duration,
        unit_of_work: F,
    ) -> Result<T, BankError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, BankError>> + Send,
    {
        let Some(expires_at) = Instant::now().checked_add(deadline) else {
            return self.run(unit_of_work).await;
        };

        let mut tx = timeout_at(expires_at, self.pool.begin())
            .await
            .map_err(|_| BankError::deadline_exceeded(deadline))??;

        let outcome = match timeout_at(expires_at, unit_of_work(&mut *tx)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let err = BankError::deadline_exceeded(deadline);
                tracing::warn!(error = %err, "Unit of work timed out");
                Err(err)
            }
        };
        Self::finish(tx, outcome).await
    }

    async fn finish<T>(
        tx: Transaction<'static, Sqlite>,
        outcome: Result<T, BankError>,
    ) -> Result<T, BankError> {
        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(|e| {
                    tracing::error!(error = %e, "Commit failed, outcome unknown");
                    BankError::commit_failed(e)
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    // The connection is discarded by the pool; nothing was committed.
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

//! Concurrent application of a batch of transfer requests
//!
//! Each request is an independent transfer with its own transaction. Up to
//! `max_concurrent` transfers are in flight at once; a failed request is
//! recorded and the rest of the batch continues.

use futures::stream::{self, StreamExt};

use crate::io::CsvTransferRecord;
use crate::types::{BankError, TransferResult};

use super::Bank;

/// Configuration for batch application
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Maximum number of transfers executing concurrently
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig, falling back to the default for zero
    pub fn new(max_concurrent: usize) -> Self {
        if max_concurrent == 0 {
            let default = Self::default();
            tracing::warn!(
                requested = max_concurrent,
                fallback = default.max_concurrent,
                "Invalid max_concurrent, using default"
            );
            return default;
        }
        Self { max_concurrent }
    }
}

/// Outcome of a batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Committed transfers, sorted by transfer ID
    pub committed: Vec<TransferResult>,
    /// Rejected requests as (position in the batch, error), in batch order
    pub failed: Vec<(usize, BankError)>,
}

/// Execute every record as its own transfer
pub async fn apply_transfers(
    bank: &Bank,
    records: Vec<CsvTransferRecord>,
    config: &BatchConfig,
) -> BatchReport {
    let total = records.len();
    let outcomes: Vec<(usize, Result<TransferResult, BankError>)> =
        stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| async move {
                let outcome = bank.transfer(record.from, record.to, record.amount).await;
                (index, outcome)
            })
            .buffer_unordered(config.max_concurrent.max(1))
            .collect()
            .await;

    let mut report = BatchReport::default();
    for (index, outcome) in outcomes {
        match outcome {
            Ok(result) => report.committed.push(result),
            Err(err) => {
                tracing::warn!(request = index, error = %err, "Transfer rejected");
                report.failed.push((index, err));
            }
        }
    }
    report.committed.sort_by_key(|result| result.transfer.id);
    report.failed.sort_by_key(|(index, _)| *index);

    tracing::info!(
        total,
        committed = report.committed.len(),
        failed = report.failed.len(),
        "Batch applied"
    );
    report
}

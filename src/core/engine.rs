//! Money-transfer orchestration
//!
//! This module provides the `TransferEngine`, which performs one transfer as a
//! single unit of work on the [`TransactionCoordinator`]:
//!
//! 1. Insert the transfer record
//! 2. Append the debit entry (`-amount`) on the source account
//! 3. Append the credit entry (`+amount`) on the destination account
//! 4. Adjust both balances, lower account ID first
//! 5. Apply the balance policy to the source account
//!
//! Any failure rolls back every step. The engine keeps no state between
//! calls and never retries; a caller receiving a transient error retries the
//! whole call.
//!
//! # Lock Ordering
//!
//! Balance updates take write locks. Updating the account with the lower ID
//! first, whichever side of the transfer it is on, gives every pair of
//! accounts one global lock order, so a transfer A->B running next to B->A
//! cannot deadlock.

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::SqliteConnection;

use crate::types::{
    AccountId, BankError, TransferParams, TransferResult, TransferState,
};

use super::{AccountStore, LedgerStore, TransactionCoordinator, TransferStore};

/// Whether a transfer may take the source account below zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BalancePolicy {
    /// Negative balances are permitted
    #[default]
    AllowOverdraft,
    /// A transfer that would leave the source negative fails with
    /// `BankError::InsufficientFunds` and is rolled back
    RejectOverdraft,
}

/// Engine settings
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub balance_policy: BalancePolicy,
}

/// Stateless transfer orchestrator
///
/// Cheap to clone; each clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    coordinator: TransactionCoordinator,
    config: EngineConfig,
}

impl TransferEngine {
    pub fn new(coordinator: TransactionCoordinator, config: EngineConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Move `amount` from `from_id` to `to_id`
    ///
    /// # Returns
    ///
    /// The transfer, both entries and both post-adjustment accounts.
    ///
    /// # Errors
    ///
    /// * `BankError::SameAccount` / `BankError::InvalidAmount` before any storage access
    /// * `BankError::ReferenceNotFound` if either account is missing
    /// * `BankError::InsufficientFunds` under `BalancePolicy::RejectOverdraft`
    /// * transient or internal storage failures, classified
    pub async fn execute(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: i64,
    ) -> Result<TransferResult, BankError> {
        let params = TransferParams::new(from_id, to_id, amount)?;
        let policy = self.config.balance_policy;

        let result = self
            .coordinator
            .run(move |conn| transfer_unit_of_work(conn, params, policy))
            .await;
        log_outcome(&params, &result);
        result
    }

    /// Like [`execute`](Self::execute), but the transfer must reach commit
    /// within `deadline`; otherwise it is rolled back and
    /// `BankError::DeadlineExceeded` is returned
    pub async fn execute_with_deadline(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: i64,
        deadline: Duration,
    ) -> Result<TransferResult, BankError> {
        let params = TransferParams::new(from_id, to_id, amount)?;
        let policy = self.config.balance_policy;

        let result = self
            .coordinator
            .run_with_deadline(deadline, move |conn| {
                transfer_unit_of_work(conn, params, policy)
            })
            .await;
        log_outcome(&params, &result);
        result
    }
}

fn transfer_unit_of_work(
    conn: &mut SqliteConnection,
    params: TransferParams,
    policy: BalancePolicy,
) -> BoxFuture<'_, Result<TransferResult, BankError>> {
    Box::pin(async move {
        let TransferParams {
            from_account_id,
            to_account_id,
            amount,
        } = params;
        let mut state = TransferState::Started;
        trace_state(&params, state);

        let transfer = TransferStore::create(conn, from_account_id, to_account_id, amount).await?;
        advance(&params, &mut state, TransferState::TransferCreated);

        let from_entry = LedgerStore::create_entry(conn, from_account_id, transfer.id, -amount).await?;
        let to_entry = LedgerStore::create_entry(conn, to_account_id, transfer.id, amount).await?;
        advance(&params, &mut state, TransferState::EntriesCreated);

        let [(first_id, first_delta), (second_id, second_delta)] = params.lock_order();
        let first = AccountStore::adjust_balance(conn, first_id, first_delta).await?;
        let second = AccountStore::adjust_balance(conn, second_id, second_delta).await?;
        let (from_account, to_account) = if first_id == from_account_id {
            (first, second)
        } else {
            (second, first)
        };
        advance(&params, &mut state, TransferState::BalancesAdjusted);

        if policy == BalancePolicy::RejectOverdraft && from_account.balance < 0 {
            return Err(BankError::insufficient_funds(
                from_account_id,
                from_account.balance + amount,
                amount,
            ));
        }

        Ok(TransferResult {
            transfer,
            from_entry,
            to_entry,
            from_account,
            to_account,
        })
    })
}

fn advance(params: &TransferParams, state: &mut TransferState, next: TransferState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal transfer state change {} -> {}",
        state,
        next
    );
    *state = next;
    trace_state(params, next);
}

fn trace_state(params: &TransferParams, state: TransferState) {
    tracing::debug!(
        from = params.from_account_id,
        to = params.to_account_id,
        amount = params.amount,
        %state,
        "Transfer state"
    );
}

fn log_outcome(params: &TransferParams, result: &Result<TransferResult, BankError>) {
    match result {
        Ok(result) => tracing::info!(
            transfer = result.transfer.id,
            from = params.from_account_id,
            to = params.to_account_id,
            amount = params.amount,
            state = %TransferState::Committed,
            "Transfer committed"
        ),
        Err(err) => tracing::warn!(
            from = params.from_account_id,
            to = params.to_account_id,
            amount = params.amount,
            state = %TransferState::Aborted,
            kind = ?err.kind(),
            retryable = err.kind().is_retryable(),
            error = %err,
            "Transfer aborted"
        ),
    }
}

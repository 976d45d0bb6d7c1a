//! Transfer and ledger entry types
//!
//! A [`Transfer`] binds two distinct accounts and a positive amount. Each
//! committed transfer owns exactly two [`Entry`] rows whose amounts sum to zero.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::account::{Account, AccountId};
use super::error::BankError;

/// Transfer identifier
pub type TransferId = i64;

/// Ledger entry identifier
pub type EntryId = i64;

/// A committed movement request between two accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Transfer {
    pub id: TransferId,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    /// Magnitude of the movement, always positive
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// One signed balance movement against one account
///
/// Negative amounts are debits, positive amounts are credits. Entries are
/// append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Entry {
    pub id: EntryId,
    pub account_id: AccountId,
    pub transfer_id: TransferId,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated input of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferParams {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: i64,
}

impl TransferParams {
    /// Validate and build transfer parameters
    ///
    /// # Errors
    ///
    /// * `BankError::SameAccount` if both sides name the same account
    /// * `BankError::InvalidAmount` if `amount <= 0`
    pub fn new(
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: i64,
    ) -> Result<Self, BankError> {
        if from_account_id == to_account_id {
            return Err(BankError::same_account(from_account_id));
        }
        if amount <= 0 {
            return Err(BankError::invalid_amount(amount, "transfer"));
        }
        Ok(Self {
            from_account_id,
            to_account_id,
            amount,
        })
    }

    /// Accounts in lock-acquisition order: lower id first
    ///
    /// The order is the same for A->B and B->A, so two opposite transfers over
    /// one pair never wait on each other in a cycle.
    pub fn lock_order(&self) -> [(AccountId, i64); 2] {
        let debit = (self.from_account_id, -self.amount);
        let credit = (self.to_account_id, self.amount);
        if self.from_account_id < self.to_account_id {
            [debit, credit]
        } else {
            [credit, debit]
        }
    }
}

/// Composite result of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    pub from_account: Account,
    pub to_account: Account,
}

/// Progress of one transfer call
///
/// Not persisted; the engine reports transitions through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Started,
    TransferCreated,
    EntriesCreated,
    BalancesAdjusted,
    Committed,
    Aborted,
}

impl TransferState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: TransferState) -> bool {
        use TransferState::*;
        match (self, next) {
            (Committed | Aborted, _) => false,
            (_, Aborted) => true,
            (Started, TransferCreated)
            | (TransferCreated, EntriesCreated)
            | (EntriesCreated, BalancesAdjusted)
            | (BalancesAdjusted, Committed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferState::Started => "started",
            TransferState::TransferCreated => "transfer_created",
            TransferState::EntriesCreated => "entries_created",
            TransferState::BalancesAdjusted => "balances_adjusted",
            TransferState::Committed => "committed",
            TransferState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

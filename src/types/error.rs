//! Error types for the ledger transfer engine
//!
//! Every failure the engine or its stores can produce is a [`BankError`].
//! Backend-specific storage errors are translated into this enum exactly once,
//! at the store boundary (see the `From<sqlx::Error>` impl below), so callers
//! never inspect driver error codes themselves.
//!
//! # Error Kinds
//!
//! Each variant belongs to one of five [`ErrorKind`]s:
//!
//! - **InvalidArgument**: same source/destination, non-positive amount, business-rule rejection
//! - **NotFound**: referenced account, transfer or entry is absent
//! - **Conflict**: uniqueness violation, or deleting an account that still has history
//! - **Transient**: connection loss, lock wait, pool exhaustion, deadline elapsed (safe to retry)
//! - **Internal**: any unclassified storage failure, including an unconfirmed commit

use thiserror::Error;

use super::account::{AccountId, Currency};
use super::transfer::{EntryId, TransferId};

/// Closed classification of every [`BankError`]
///
/// The request-handling layer picks a user-visible representation from the
/// kind alone; it never needs to match on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    Transient,
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport layer should use for this kind
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidArgument | ErrorKind::Conflict => 400,
            ErrorKind::Transient | ErrorKind::Internal => 500,
        }
    }

    /// Whether the whole call may be retried by the caller
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// Source and destination of a transfer are the same account
    #[error("Cannot transfer from account {account} to itself")]
    SameAccount {
        /// The account used on both sides
        account: AccountId,
    },

    /// Amount must be strictly positive
    #[error("Invalid amount {amount} for {operation}: must be greater than zero")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
        /// Operation that was attempted
        operation: String,
    },

    /// Currency code outside the supported set
    #[error("Unsupported currency '{code}'")]
    UnsupportedCurrency {
        /// The code as supplied by the caller
        code: String,
    },

    /// Account currency differs from the currency of the request
    #[error("Account {account} has currency {actual}, expected {expected}")]
    CurrencyMismatch {
        /// Offending account
        account: AccountId,
        /// Currency named by the request
        expected: Currency,
        /// Currency of the stored account
        actual: Currency,
    },

    /// Pagination parameters out of range
    #[error("Invalid page {page} with size {size}")]
    InvalidPage { page: u32, size: u32 },

    /// Debit would take the account below zero while overdraft is rejected
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Debited account
        account: AccountId,
        /// Balance before the debit
        balance: i64,
        /// Requested debit
        requested: i64,
    },

    /// Applying `delta` would take the balance outside the 64-bit range
    #[error("Balance of account {account} cannot absorb {delta}: out of range")]
    BalanceOverflow { account: AccountId, delta: i64 },

    /// A check constraint in storage rejected the row
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    #[error("Transfer {transfer} not found")]
    TransferNotFound { transfer: TransferId },

    #[error("Entry {entry} not found")]
    EntryNotFound { entry: EntryId },

    /// Insert referenced a row that does not exist (foreign key)
    #[error("Referenced row not found: {message}")]
    ReferenceNotFound { message: String },

    /// Uniqueness constraint violated
    #[error("Duplicate record: {message}")]
    Duplicate { message: String },

    /// Account still referenced by transfers or entries
    #[error("Account {account} is referenced by ledger history and cannot be deleted")]
    AccountInUse { account: AccountId },

    /// Retryable storage condition (busy, locked, pool exhausted, I/O)
    #[error("Transient storage failure: {message}")]
    Transient { message: String },

    /// The caller's deadline elapsed before commit; nothing was persisted
    #[error("Deadline of {deadline_ms}ms elapsed before commit")]
    DeadlineExceeded { deadline_ms: u64 },

    /// Commit was attempted but its outcome could not be confirmed
    #[error("Commit failed, outcome unknown: {message}")]
    CommitFailed { message: String },

    /// Schema migration failed
    #[error("Migration error: {message}")]
    Migration { message: String },

    /// Any other storage failure
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl BankError {
    /// Classify this error into one of the five kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            BankError::SameAccount { .. }
            | BankError::InvalidAmount { .. }
            | BankError::UnsupportedCurrency { .. }
            | BankError::CurrencyMismatch { .. }
            | BankError::InvalidPage { .. }
            | BankError::InsufficientFunds { .. }
            | BankError::BalanceOverflow { .. }
            | BankError::ConstraintViolation { .. } => ErrorKind::InvalidArgument,
            BankError::AccountNotFound { .. }
            | BankError::TransferNotFound { .. }
            | BankError::EntryNotFound { .. }
            | BankError::ReferenceNotFound { .. } => ErrorKind::NotFound,
            BankError::Duplicate { .. } | BankError::AccountInUse { .. } => ErrorKind::Conflict,
            BankError::Transient { .. } | BankError::DeadlineExceeded { .. } => {
                ErrorKind::Transient
            }
            BankError::CommitFailed { .. }
            | BankError::Migration { .. }
            | BankError::Storage { .. } => ErrorKind::Internal,
        }
    }

    /// Create a SameAccount error
    pub fn same_account(account: AccountId) -> Self {
        BankError::SameAccount { account }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: i64, operation: &str) -> Self {
        BankError::InvalidAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    /// Create an UnsupportedCurrency error
    pub fn unsupported_currency(code: &str) -> Self {
        BankError::UnsupportedCurrency {
            code: code.to_string(),
        }
    }

    /// Create a CurrencyMismatch error
    pub fn currency_mismatch(account: AccountId, expected: Currency, actual: Currency) -> Self {
        BankError::CurrencyMismatch {
            account,
            expected,
            actual,
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: i64, requested: i64) -> Self {
        BankError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    pub fn balance_overflow(account: AccountId, delta: i64) -> Self {
        BankError::BalanceOverflow { account, delta }
    }

    pub fn account_not_found(account: AccountId) -> Self {
        BankError::AccountNotFound { account }
    }

    pub fn transfer_not_found(transfer: TransferId) -> Self {
        BankError::TransferNotFound { transfer }
    }

    pub fn entry_not_found(entry: EntryId) -> Self {
        BankError::EntryNotFound { entry }
    }

    pub fn account_in_use(account: AccountId) -> Self {
        BankError::AccountInUse { account }
    }

    /// Create a DeadlineExceeded error from the caller's deadline
    pub fn deadline_exceeded(deadline: std::time::Duration) -> Self {
        BankError::DeadlineExceeded {
            deadline_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Wrap a failed commit; the outcome is indeterminate
    pub fn commit_failed(error: sqlx::Error) -> Self {
        BankError::CommitFailed {
            message: error.to_string(),
        }
    }

    /// Whether the underlying storage error was a foreign-key violation
    pub fn is_reference_violation(&self) -> bool {
        matches!(self, BankError::ReferenceNotFound { .. })
    }
}

// SQLite primary result codes that indicate lock contention
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

fn is_lock_contention(code: &str) -> bool {
    code.parse::<i32>()
        .map(|extended| matches!(extended & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

// Conversion from sqlx::Error to BankError
impl From<sqlx::Error> for BankError {
    fn from(error: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind as DbKind;

        let message = error.to_string();
        match &error {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                DbKind::UniqueViolation => BankError::Duplicate { message },
                DbKind::ForeignKeyViolation => BankError::ReferenceNotFound { message },
                DbKind::CheckViolation | DbKind::NotNullViolation => {
                    BankError::ConstraintViolation { message }
                }
                _ if db_err.code().is_some_and(|code| is_lock_contention(&code)) => {
                    BankError::Transient { message }
                }
                _ => BankError::Storage { message },
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::WorkerCrashed => BankError::Transient { message },
            _ => BankError::Storage { message },
        }
    }
}

impl From<sqlx::migrate::MigrateError> for BankError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        BankError::Migration {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case::same_account(
        BankError::SameAccount { account: 7 },
        "Cannot transfer from account 7 to itself"
    )]
    #[case::invalid_amount(
        BankError::InvalidAmount { amount: -5, operation: "transfer".to_string() },
        "Invalid amount -5 for transfer: must be greater than zero"
    )]
    #[case::unsupported_currency(
        BankError::UnsupportedCurrency { code: "XYZ".to_string() },
        "Unsupported currency 'XYZ'"
    )]
    #[case::currency_mismatch(
        BankError::CurrencyMismatch { account: 3, expected: Currency::Usd, actual: Currency::Eur },
        "Account 3 has currency EUR, expected USD"
    )]
    #[case::insufficient_funds(
        BankError::InsufficientFunds { account: 1, balance: 10, requested: 50 },
        "Insufficient funds in account 1: balance 10, requested 50"
    )]
    #[case::balance_overflow(
        BankError::BalanceOverflow { account: 4, delta: 10 },
        "Balance of account 4 cannot absorb 10: out of range"
    )]
    #[case::account_not_found(
        BankError::AccountNotFound { account: 42 },
        "Account 42 not found"
    )]
    #[case::account_in_use(
        BankError::AccountInUse { account: 9 },
        "Account 9 is referenced by ledger history and cannot be deleted"
    )]
    #[case::deadline(
        BankError::DeadlineExceeded { deadline_ms: 250 },
        "Deadline of 250ms elapsed before commit"
    )]
    fn test_error_display(#[case] error: BankError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::same_account(BankError::same_account(1), ErrorKind::InvalidArgument)]
    #[case::invalid_amount(BankError::invalid_amount(0, "transfer"), ErrorKind::InvalidArgument)]
    #[case::insufficient_funds(BankError::insufficient_funds(1, 0, 1), ErrorKind::InvalidArgument)]
    #[case::balance_overflow(BankError::balance_overflow(1, 1), ErrorKind::InvalidArgument)]
    #[case::account_not_found(BankError::account_not_found(1), ErrorKind::NotFound)]
    #[case::transfer_not_found(BankError::transfer_not_found(1), ErrorKind::NotFound)]
    #[case::entry_not_found(BankError::entry_not_found(1), ErrorKind::NotFound)]
    #[case::duplicate(BankError::Duplicate { message: "x".to_string() }, ErrorKind::Conflict)]
    #[case::in_use(BankError::account_in_use(1), ErrorKind::Conflict)]
    #[case::deadline(BankError::deadline_exceeded(Duration::from_millis(5)), ErrorKind::Transient)]
    #[case::commit(BankError::CommitFailed { message: "x".to_string() }, ErrorKind::Internal)]
    fn test_error_kind(#[case] error: BankError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[rstest]
    #[case(ErrorKind::NotFound, 404)]
    #[case(ErrorKind::InvalidArgument, 400)]
    #[case(ErrorKind::Conflict, 400)]
    #[case(ErrorKind::Transient, 500)]
    #[case(ErrorKind::Internal, 500)]
    fn test_http_status(#[case] kind: ErrorKind, #[case] status: u16) {
        assert_eq!(kind.http_status(), status);
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(ErrorKind::Transient.is_retryable());
        assert!(!ErrorKind::Internal.is_retryable());
        assert!(!ErrorKind::Conflict.is_retryable());
    }

    #[rstest]
    #[case::millis(Duration::from_millis(50), 50)]
    #[case::saturates(Duration::MAX, u64::MAX)]
    fn test_deadline_exceeded_reports_millis(#[case] deadline: Duration, #[case] expected: u64) {
        assert_eq!(
            BankError::deadline_exceeded(deadline),
            BankError::DeadlineExceeded { deadline_ms: expected }
        );
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        let error: BankError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(error.kind(), ErrorKind::Transient);
    }

    #[test]
    fn test_row_not_found_is_internal_without_context() {
        // Stores attach NotFound context themselves; a bare RowNotFound escaping
        // a store is a bug, not a missing row.
        let error: BankError = sqlx::Error::RowNotFound.into();
        assert_eq!(error.kind(), ErrorKind::Internal);
    }

    #[rstest]
    #[case("5", true)]
    #[case("517", true)]
    #[case("6", true)]
    #[case("2067", false)]
    #[case("not-a-code", false)]
    fn test_lock_contention_codes(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(is_lock_contention(code), expected);
    }
}

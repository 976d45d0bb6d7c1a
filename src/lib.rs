//! Ledger Transfer Engine Library
//! # Overview
//!
//! This library moves money between accounts of a double-entry ledger. Every
//! transfer writes one transfer record, a debit and a credit entry, and the
//! two balance changes in a single database transaction: all of it commits or
//! none of it does.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Transfer, Entry, errors)
//! - [`db`] - SQLite pool and embedded migrations
//! - [`core`] - Business logic components:
//!   - [`core::account_store`], [`core::ledger_store`], [`core::transfer_store`] - Row access
//!   - [`core::coordinator`] - Commit-or-rollback unit of work, with optional deadline
//!   - [`core::engine`] - Transfer orchestration and lock ordering
//!   - [`core::bank`] - Facade used by front ends
//!   - [`core::batch`] - Concurrent application of transfer batches
//! - [`io`] - CSV input and output
//! - [`cli`] - CLI arguments parsing and command execution
//! - [`logging`] - tracing subscriber setup
//!
//! # Invariants
//!
//! - Entries are append-only; each committed transfer has exactly one debit
//!   entry (`-amount`) and one credit entry (`+amount`)
//! - Total balance across accounts is unchanged by transfers
//! - Balance updates take locks in ascending account ID order

pub mod cli;
pub mod core;
pub mod db;
pub mod io;
pub mod logging;
pub mod types;

pub use core::{Bank, BalancePolicy, EngineConfig, TransactionCoordinator, TransferEngine};
pub use db::{Database, DatabaseConfig};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, BankError, Currency, Entry, EntryId, ErrorKind, Page, Transfer,
    TransferId, TransferParams, TransferResult,
};

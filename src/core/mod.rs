//! Core business logic module
//!
//! This module contains the transfer engine and the stores it orchestrates:
//! - `account_store` - Account rows and the atomic balance adjustment
//! - `ledger_store` - Append-only ledger entries
//! - `transfer_store` - Transfer records
//! - `coordinator` - Commit-or-rollback execution of a unit of work
//! - `engine` - Transfer orchestration and lock ordering
//! - `bank` - Facade for front ends (deposits, reads, currency checks)
//! - `batch` - Concurrent application of transfer batches

pub mod account_store;
pub mod bank;
pub mod batch;
pub mod coordinator;
pub mod engine;
pub mod ledger_store;
pub mod transfer_store;

pub use account_store::AccountStore;
pub use bank::Bank;
pub use batch::{apply_transfers, BatchConfig, BatchReport};
pub use coordinator::TransactionCoordinator;
pub use engine::{BalancePolicy, EngineConfig, TransferEngine};
pub use ledger_store::LedgerStore;
pub use transfer_store::TransferStore;

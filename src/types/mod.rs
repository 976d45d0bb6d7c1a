//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account row and currency codes
//! - `transfer`: Transfers, ledger entries and the transfer state machine
//! - `page`: Pagination parameters
//! - `error`: Error types and their classification

pub mod account;
pub mod error;
pub mod page;
pub mod transfer;

pub use account::{Account, AccountId, Currency};
pub use error::{BankError, ErrorKind};
pub use page::Page;
pub use transfer::{
    Entry, EntryId, Transfer, TransferId, TransferParams, TransferResult, TransferState,
};

//! I/O module
//!
//! Handles CSV input and output for the command-line front end.
//!
//! # Components
//!
//! - `csv_format` - Transfer request parsing and CSV serialization of accounts,
//!   transfers, entries and transfer results

pub mod csv_format;

pub use csv_format::{
    read_transfer_records, write_accounts_csv, write_entries_csv, write_transfer_results_csv,
    write_transfers_csv, CsvTransferRecord,
};

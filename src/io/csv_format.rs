//! CSV format handling for transfer requests and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvTransferRecord structure for deserialization of batch transfer files
//! - Serialization of accounts, transfers, entries and transfer results
//!
//! Writers take any `Write` so tests can capture output in memory.

use crate::types::{Account, AccountId, Entry, Transfer, TransferResult};
use csv::{ReaderBuilder, Trim, Writer};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One requested transfer in a batch file
///
/// Matches the input CSV format with columns: from, to, amount
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CsvTransferRecord {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: i64,
}

/// Stream transfer requests from CSV input
///
/// Whitespace around fields is trimmed. Malformed rows are yielded as `Err`
/// with the line number so the caller can skip them and continue.
pub fn read_transfer_records<R: Read>(
    input: R,
) -> impl Iterator<Item = Result<CsvTransferRecord, String>> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(input)
        .into_deserialize::<CsvTransferRecord>()
        .map(|result| {
            result.map_err(|e| match e.position() {
                Some(pos) => format!("CSV parse error at line {}: {}", pos.line(), e),
                None => format!("CSV parse error: {}", e),
            })
        })
}

fn write_rows<T: Serialize>(rows: &[T], output: &mut dyn Write, what: &str) -> Result<(), String> {
    let mut writer = Writer::from_writer(output);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| format!("Failed to write {} record: {}", what, e))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}

/// Write accounts with columns: id, name, currency, balance, created_at
///
/// Rows are sorted by account ID for deterministic output.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    let mut sorted = accounts.to_vec();
    sorted.sort_by_key(|account| account.id);
    if sorted.is_empty() {
        return write_header(output, &["id", "name", "currency", "balance", "created_at"]);
    }
    write_rows(&sorted, output, "account")
}

/// Write transfers with columns: id, from_account_id, to_account_id, amount, created_at
pub fn write_transfers_csv(transfers: &[Transfer], output: &mut dyn Write) -> Result<(), String> {
    if transfers.is_empty() {
        return write_header(
            output,
            &["id", "from_account_id", "to_account_id", "amount", "created_at"],
        );
    }
    write_rows(transfers, output, "transfer")
}

/// Write entries with columns: id, account_id, transfer_id, amount, created_at
pub fn write_entries_csv(entries: &[Entry], output: &mut dyn Write) -> Result<(), String> {
    if entries.is_empty() {
        return write_header(
            output,
            &["id", "account_id", "transfer_id", "amount", "created_at"],
        );
    }
    write_rows(entries, output, "entry")
}

const RESULT_HEADER: [&str; 8] = [
    "transfer",
    "from",
    "to",
    "amount",
    "from_entry",
    "to_entry",
    "from_balance",
    "to_balance",
];

/// Write one row per committed transfer, flattening the composite result
pub fn write_transfer_results_csv(
    results: &[TransferResult],
    output: &mut dyn Write,
) -> Result<(), String> {
    let mut writer = Writer::from_writer(output);
    writer
        .write_record(RESULT_HEADER)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for result in results {
        writer
            .write_record(&[
                result.transfer.id.to_string(),
                result.transfer.from_account_id.to_string(),
                result.transfer.to_account_id.to_string(),
                result.transfer.amount.to_string(),
                result.from_entry.id.to_string(),
                result.to_entry.id.to_string(),
                result.from_account.balance.to_string(),
                result.to_account.balance.to_string(),
            ])
            .map_err(|e| format!("Failed to write transfer result: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}

// serde-driven writers only emit a header alongside the first row
fn write_header(output: &mut dyn Write, header: &[&str]) -> Result<(), String> {
    let mut writer = Writer::from_writer(output);
    writer
        .write_record(header)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;
    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}

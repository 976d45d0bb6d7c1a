//! Subcommand execution
//!
//! Every command writes its result to `output` as CSV. Errors are returned as
//! display strings for `main` to print; `apply` logs per-row failures and only
//! fails on errors that stop the whole batch.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::core::{apply_transfers, Bank};
use crate::io::{
    read_transfer_records, write_accounts_csv, write_entries_csv, write_transfer_results_csv,
    write_transfers_csv,
};

use super::args::{to_batch_config, Command};

/// Run one subcommand against `bank`
pub async fn execute(bank: &Bank, command: Command, output: &mut dyn Write) -> Result<(), String> {
    match command {
        Command::CreateAccount {
            name,
            currency,
            balance,
        } => {
            let account = bank
                .create_account(&name, currency, balance)
                .await
                .map_err(|e| e.to_string())?;
            write_accounts_csv(&[account], output)
        }
        Command::GetAccount { id } => {
            let account = bank.get_account(id).await.map_err(|e| e.to_string())?;
            write_accounts_csv(&[account], output)
        }
        Command::ListAccounts { page } => {
            let page = page.to_page().map_err(|e| e.to_string())?;
            let accounts = bank.list_accounts(page).await.map_err(|e| e.to_string())?;
            write_accounts_csv(&accounts, output)
        }
        Command::DeleteAccount { id } => {
            let account = bank.get_account(id).await.map_err(|e| e.to_string())?;
            bank.delete_account(id).await.map_err(|e| e.to_string())?;
            write_accounts_csv(&[account], output)
        }
        Command::Deposit { id, amount } => {
            let account = bank.deposit(id, amount).await.map_err(|e| e.to_string())?;
            write_accounts_csv(&[account], output)
        }
        Command::Transfer {
            from,
            to,
            amount,
            currency,
            timeout_ms,
        } => {
            let deadline = timeout_ms.map(Duration::from_millis);
            let result = match (currency, deadline) {
                (Some(currency), deadline) => {
                    bank.transfer_in_currency(from, to, amount, currency, deadline)
                        .await
                }
                (None, Some(deadline)) => {
                    bank.engine()
                        .execute_with_deadline(from, to, amount, deadline)
                        .await
                }
                (None, None) => bank.transfer(from, to, amount).await,
            }
            .map_err(|e| e.to_string())?;
            write_transfer_results_csv(&[result], output)
        }
        Command::GetTransfer { id } => {
            let transfer = bank.get_transfer(id).await.map_err(|e| e.to_string())?;
            write_transfers_csv(&[transfer], output)
        }
        Command::ListTransfers { account, page } => {
            let page = page.to_page().map_err(|e| e.to_string())?;
            let transfers = bank
                .list_transfers(account, page)
                .await
                .map_err(|e| e.to_string())?;
            write_transfers_csv(&transfers, output)
        }
        Command::ListEntries { account, page } => {
            let page = page.to_page().map_err(|e| e.to_string())?;
            let entries = bank
                .list_entries(account, page)
                .await
                .map_err(|e| e.to_string())?;
            write_entries_csv(&entries, output)
        }
        Command::Apply {
            input_file,
            max_concurrent,
        } => apply_file(bank, &input_file, max_concurrent, output).await,
    }
}

async fn apply_file(
    bank: &Bank,
    input_path: &Path,
    max_concurrent: Option<usize>,
    output: &mut dyn Write,
) -> Result<(), String> {
    let file = File::open(input_path)
        .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

    let mut records = Vec::new();
    for record in read_transfer_records(file) {
        match record {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(error = %e, "Skipping malformed row"),
        }
    }

    let report = apply_transfers(bank, records, &to_batch_config(max_concurrent)).await;
    write_transfer_results_csv(&report.committed, output)
}

//! Append-only ledger of balance movements
//!
//! Entries are written once, inside the transaction of the transfer that
//! caused them. Nothing updates or deletes them.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::types::{AccountId, BankError, Entry, EntryId, TransferId};

const ENTRY_COLUMNS: &str = "id, account_id, transfer_id, amount, created_at";

/// Repository for the entries table
pub struct LedgerStore;

impl LedgerStore {
    /// Append one signed entry for `account_id` caused by `transfer_id`
    ///
    /// # Errors
    ///
    /// * `BankError::ReferenceNotFound` if the account or transfer does not exist
    pub async fn create_entry(
        conn: &mut SqliteConnection,
        account_id: AccountId,
        transfer_id: TransferId,
        amount: i64,
    ) -> Result<Entry, BankError> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            "INSERT INTO entries (account_id, transfer_id, amount, created_at) VALUES (?, ?, ?, ?) \
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(account_id)
        .bind(transfer_id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(entry)
    }

    pub async fn get(conn: &mut SqliteConnection, id: EntryId) -> Result<Entry, BankError> {
        sqlx::query_as::<_, Entry>(&format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| BankError::entry_not_found(id))
    }

    /// Entries of one account, oldest first
    pub async fn list_by_account(
        conn: &mut SqliteConnection,
        account_id: AccountId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Entry>, BankError> {
        let entries = sqlx::query_as::<_, Entry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE account_id = ? ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(account_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&mut *conn)
        .await?;
        Ok(entries)
    }

    /// Both entries written for one transfer
    pub async fn list_by_transfer(
        conn: &mut SqliteConnection,
        transfer_id: TransferId,
    ) -> Result<Vec<Entry>, BankError> {
        let entries = sqlx::query_as::<_, Entry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE transfer_id = ? ORDER BY id"
        ))
        .bind(transfer_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(entries)
    }
}

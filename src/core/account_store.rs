//! Account persistence and the atomic balance adjustment primitive
//!
//! Every function takes an explicit connection handle. Inside a transfer that
//! handle is the coordinator's open transaction; for standalone reads it is a
//! pooled connection.
//!
//! # Balance Updates
//!
//! Balances change only through [`AccountStore::adjust_balance`], a single
//! `UPDATE ... SET balance = balance + ?` evaluated by the database. Two
//! concurrent adjustments to one account therefore serialize on the row (or
//! database) lock and neither is lost.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::types::{Account, AccountId, BankError, Currency};

const ACCOUNT_COLUMNS: &str = "id, name, currency, balance, created_at";

/// Repository for the accounts table
pub struct AccountStore;

impl AccountStore {
    /// Create a new account
    ///
    /// # Errors
    ///
    /// * `BankError::Duplicate` if an account with this name and currency exists
    /// * any other storage failure, classified
    pub async fn create(
        conn: &mut SqliteConnection,
        name: &str,
        currency: Currency,
        initial_balance: i64,
    ) -> Result<Account, BankError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (name, currency, balance, created_at) VALUES (?, ?, ?, ?) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(name)
        .bind(currency.as_str())
        .bind(initial_balance)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        tracing::debug!(account = account.id, name, %currency, "Account created");
        Ok(account)
    }

    /// Get an account by ID
    pub async fn get(conn: &mut SqliteConnection, id: AccountId) -> Result<Account, BankError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| BankError::account_not_found(id))
    }

    /// List at most `limit` accounts ordered by ID, skipping `offset`
    pub async fn list(
        conn: &mut SqliteConnection,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Account>, BankError> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&mut *conn)
        .await?;
        Ok(accounts)
    }

    /// Delete an account
    ///
    /// # Errors
    ///
    /// * `BankError::AccountNotFound` if no such account exists
    /// * `BankError::AccountInUse` if transfers or entries still reference it
    pub async fn delete(conn: &mut SqliteConnection, id: AccountId) -> Result<(), BankError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| match BankError::from(e) {
                err if err.is_reference_violation() => BankError::account_in_use(id),
                err => err,
            })?;

        if result.rows_affected() == 0 {
            return Err(BankError::account_not_found(id));
        }
        tracing::debug!(account = id, "Account deleted");
        Ok(())
    }

    /// Atomically add `delta` to the stored balance and return the updated row
    ///
    /// # Errors
    ///
    /// * `BankError::AccountNotFound` if the account does not exist
    /// * `BankError::BalanceOverflow` if the sum leaves the `i64` range; the
    ///   row is left unchanged
    pub async fn adjust_balance(
        conn: &mut SqliteConnection,
        id: AccountId,
        delta: i64,
    ) -> Result<Account, BankError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET balance = balance + ? WHERE id = ? RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(delta)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| match BankError::from(e) {
            // The only check on accounts rejects a non-integer balance
            BankError::ConstraintViolation { .. } => BankError::balance_overflow(id, delta),
            err => err,
        })?
        .ok_or_else(|| BankError::account_not_found(id))?;

        tracing::trace!(account = id, delta, balance = account.balance, "Balance adjusted");
        Ok(account)
    }
}

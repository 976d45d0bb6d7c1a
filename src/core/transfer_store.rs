//! Transfer records
//!
//! The table carries its own check constraints (`amount > 0`, distinct
//! accounts) in addition to the engine's validation.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::types::{AccountId, BankError, Transfer, TransferId};

const TRANSFER_COLUMNS: &str = "id, from_account_id, to_account_id, amount, created_at";

/// Repository for the transfers table
pub struct TransferStore;

impl TransferStore {
    /// Insert a transfer record
    ///
    /// # Errors
    ///
    /// * `BankError::ReferenceNotFound` if either account does not exist
    /// * `BankError::ConstraintViolation` if the row breaks a check constraint
    pub async fn create(
        conn: &mut SqliteConnection,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: i64,
    ) -> Result<Transfer, BankError> {
        let transfer = sqlx::query_as::<_, Transfer>(&format!(
            "INSERT INTO transfers (from_account_id, to_account_id, amount, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {TRANSFER_COLUMNS}"
        ))
        .bind(from_account_id)
        .bind(to_account_id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(transfer)
    }

    pub async fn get(conn: &mut SqliteConnection, id: TransferId) -> Result<Transfer, BankError> {
        sqlx::query_as::<_, Transfer>(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| BankError::transfer_not_found(id))
    }

    /// Transfers where the account is source or destination, oldest first
    pub async fn list_by_account(
        conn: &mut SqliteConnection,
        account_id: AccountId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Transfer>, BankError> {
        let transfers = sqlx::query_as::<_, Transfer>(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers \
             WHERE from_account_id = ?1 OR to_account_id = ?1 \
             ORDER BY id LIMIT ?2 OFFSET ?3"
        ))
        .bind(account_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&mut *conn)
        .await?;
        Ok(transfers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccountStore;
    use crate::db::testing::temp_database;
    use crate::types::{Account, Currency, ErrorKind};
    use rstest::rstest;

    async fn two_accounts(conn: &mut SqliteConnection) -> (Account, Account) {
        let a = AccountStore::create(conn, "a", Currency::Usd, 0).await.unwrap();
        let b = AccountStore::create(conn, "b", Currency::Usd, 0).await.unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn test_create_and_get_transfer() {
        let (_dir, db) = temp_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let (a, b) = two_accounts(&mut conn).await;

        let transfer = TransferStore::create(&mut conn, a.id, b.id, 30).await.unwrap();
        assert_eq!(transfer.from_account_id, a.id);
        assert_eq!(transfer.to_account_id, b.id);
        assert_eq!(transfer.amount, 30);

        let fetched = TransferStore::get(&mut conn, transfer.id).await.unwrap();
        assert_eq!(fetched, transfer);
    }

    #[tokio::test]
    async fn test_get_missing_transfer() {
        let (_dir, db) = temp_database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = TransferStore::get(&mut conn, 77).await.unwrap_err();
        assert_eq!(err, BankError::transfer_not_found(77));
    }

    #[rstest]
    #[case::zero_amount(0, false)]
    #[case::negative_amount(-5, false)]
    #[case::same_account(10, true)]
    #[tokio::test]
    async fn test_check_constraints_reject_invalid_rows(
        #[case] amount: i64,
        #[case] same_account: bool,
    ) {
        let (_dir, db) = temp_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let (a, b) = two_accounts(&mut conn).await;
        let to = if same_account { a.id } else { b.id };

        let err = TransferStore::create(&mut conn, a.id, to, amount)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_create_with_missing_account_is_not_found() {
        let (_dir, db) = temp_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let (a, _) = two_accounts(&mut conn).await;

        let err = TransferStore::create(&mut conn, a.id, 999, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_by_account_includes_both_directions() {
        let (_dir, db) = temp_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let (a, b) = two_accounts(&mut conn).await;
        let c = AccountStore::create(&mut conn, "c", Currency::Usd, 0).await.unwrap();

        let outgoing = TransferStore::create(&mut conn, a.id, b.id, 1).await.unwrap();
        let incoming = TransferStore::create(&mut conn, b.id, a.id, 2).await.unwrap();
        TransferStore::create(&mut conn, b.id, c.id, 3).await.unwrap();

        let transfers = TransferStore::list_by_account(&mut conn, a.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(transfers, vec![outgoing, incoming.clone()]);

        let second = TransferStore::list_by_account(&mut conn, a.id, 1, 1)
            .await
            .unwrap();
        assert_eq!(second, vec![incoming]);
    }
}

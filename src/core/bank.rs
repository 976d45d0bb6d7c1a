//! Service facade used by front ends
//!
//! `Bank` bundles the pool and the [`TransferEngine`] and exposes the
//! operations a request-handling layer needs: account lifecycle, deposits,
//! transfers and read-only listings. Reads use a pooled connection and take no
//! locks beyond what SQLite needs for a consistent read.

use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::db::Database;
use crate::types::{
    Account, AccountId, BankError, Currency, Entry, EntryId, Page, Transfer, TransferId,
    TransferResult,
};

use super::{
    AccountStore, EngineConfig, LedgerStore, TransactionCoordinator, TransferEngine,
    TransferStore,
};

#[derive(Debug, Clone)]
pub struct Bank {
    db: Database,
    engine: TransferEngine,
}

impl Bank {
    pub fn new(db: Database, config: EngineConfig) -> Self {
        let engine = TransferEngine::new(TransactionCoordinator::new(db.pool().clone()), config);
        Self { db, engine }
    }

    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn create_account(
        &self,
        name: &str,
        currency: Currency,
        initial_balance: i64,
    ) -> Result<Account, BankError> {
        let mut conn = self.db.pool().acquire().await?;
        AccountStore::create(&mut conn, name, currency, initial_balance).await
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Account, BankError> {
        let mut conn = self.db.pool().acquire().await?;
        AccountStore::get(&mut conn, id).await
    }

    pub async fn list_accounts(&self, page: Page) -> Result<Vec<Account>, BankError> {
        let mut conn = self.db.pool().acquire().await?;
        AccountStore::list(&mut conn, page.limit(), page.offset()).await
    }

    /// Delete an account that has no ledger history
    pub async fn delete_account(&self, id: AccountId) -> Result<(), BankError> {
        let mut conn = self.db.pool().acquire().await?;
        AccountStore::delete(&mut conn, id).await
    }

    /// Credit `amount` to one account using the atomic adjustment primitive
    ///
    /// # Errors
    ///
    /// * `BankError::InvalidAmount` if `amount <= 0`
    /// * `BankError::AccountNotFound` if the account does not exist
    pub async fn deposit(&self, id: AccountId, amount: i64) -> Result<Account, BankError> {
        if amount <= 0 {
            return Err(BankError::invalid_amount(amount, "deposit"));
        }
        let mut conn = self.db.pool().acquire().await?;
        let account = AccountStore::adjust_balance(&mut conn, id, amount).await?;
        tracing::info!(account = id, amount, balance = account.balance, "Deposit applied");
        Ok(account)
    }

    pub async fn transfer(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: i64,
    ) -> Result<TransferResult, BankError> {
        self.engine.execute(from_id, to_id, amount).await
    }

    /// Transfer after checking both accounts hold `currency`
    ///
    /// The engine does no currency conversion, so a request naming one
    /// currency is refused unless both accounts use it. With a `deadline`,
    /// the currency reads and the transfer together must finish in time;
    /// otherwise the transfer is rolled back and `DeadlineExceeded` is
    /// returned.
    pub async fn transfer_in_currency(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: i64,
        currency: Currency,
        deadline: Option<Duration>,
    ) -> Result<TransferResult, BankError> {
        let bounded = deadline.and_then(|d| Some((d, Instant::now().checked_add(d)?)));
        let Some((deadline, expires_at)) = bounded else {
            self.check_currency(from_id, to_id, currency).await?;
            return self.engine.execute(from_id, to_id, amount).await;
        };

        timeout_at(expires_at, self.check_currency(from_id, to_id, currency))
            .await
            .map_err(|_| BankError::deadline_exceeded(deadline))??;

        let remaining = expires_at.saturating_duration_since(Instant::now());
        self.engine
            .execute_with_deadline(from_id, to_id, amount, remaining)
            .await
            .map_err(|err| match err {
                BankError::DeadlineExceeded { .. } => BankError::deadline_exceeded(deadline),
                err => err,
            })
    }

    async fn check_currency(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        currency: Currency,
    ) -> Result<(), BankError> {
        for id in [from_id, to_id] {
            let account = self.get_account(id).await?;
            if account.currency != currency {
                return Err(BankError::currency_mismatch(id, currency, account.currency));
            }
        }
        Ok(())
    }

    pub async fn get_transfer(&self, id: TransferId) -> Result<Transfer, BankError> {
        let mut conn = self.db.pool().acquire().await?;
        TransferStore::get(&mut conn, id).await
    }

    pub async fn list_transfers(
        &self,
        account_id: AccountId,
        page: Page,
    ) -> Result<Vec<Transfer>, BankError> {
        let mut conn = self.db.pool().acquire().await?;
        TransferStore::list_by_account(&mut conn, account_id, page.limit(), page.offset()).await
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<Entry, BankError> {
        let mut conn = self.db.pool().acquire().await?;
        LedgerStore::get(&mut conn, id).await
    }

    pub async fn list_entries(
        &self,
        account_id: AccountId,
        page: Page,
    ) -> Result<Vec<Entry>, BankError> {
        let mut conn = self.db.pool().acquire().await?;
        LedgerStore::list_by_account(&mut conn, account_id, page.limit(), page.offset()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_database;
    use crate::types::ErrorKind;
    use rstest::rstest;

    #[tokio::test]
    async fn test_deposit_credits_account() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let account = bank.create_account("alice", Currency::Usd, 0).await.unwrap();

        let account = bank.deposit(account.id, 250).await.unwrap();
        assert_eq!(account.balance, 250);
        assert_eq!(bank.get_account(account.id).await.unwrap().balance, 250);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[tokio::test]
    async fn test_deposit_rejects_non_positive(#[case] amount: i64) {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let account = bank.create_account("alice", Currency::Usd, 0).await.unwrap();

        let err = bank.deposit(account.id, amount).await.unwrap_err();
        assert_eq!(err, BankError::invalid_amount(amount, "deposit"));
    }

    #[tokio::test]
    async fn test_deposit_past_max_balance_is_refused() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let account = bank
            .create_account("alice", Currency::Usd, i64::MAX - 1)
            .await
            .unwrap();

        let err = bank.deposit(account.id, 10).await.unwrap_err();
        assert_eq!(err, BankError::balance_overflow(account.id, 10));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(bank.get_account(account.id).await.unwrap().balance, i64::MAX - 1);
        let account = bank.deposit(account.id, 1).await.unwrap();
        assert_eq!(account.balance, i64::MAX);
    }

    #[tokio::test]
    async fn test_deposit_missing_account() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());

        let err = bank.deposit(12, 5).await.unwrap_err();
        assert_eq!(err, BankError::account_not_found(12));
    }

    #[tokio::test]
    async fn test_transfer_in_currency_rejects_mismatch() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let usd = bank.create_account("alice", Currency::Usd, 100).await.unwrap();
        let eur = bank.create_account("bob", Currency::Eur, 100).await.unwrap();

        let err = bank
            .transfer_in_currency(usd.id, eur.id, 10, Currency::Usd, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BankError::currency_mismatch(eur.id, Currency::Usd, Currency::Eur)
        );
        assert_eq!(bank.get_account(usd.id).await.unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_transfer_in_currency_deadline_covers_checks() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let a = bank.create_account("alice", Currency::Usd, 100).await.unwrap();
        let b = bank.create_account("bob", Currency::Usd, 0).await.unwrap();

        let err = bank
            .transfer_in_currency(a.id, b.id, 10, Currency::Usd, Some(Duration::ZERO))
            .await
            .unwrap_err();

        assert_eq!(err, BankError::DeadlineExceeded { deadline_ms: 0 });
        assert_eq!(bank.get_account(a.id).await.unwrap().balance, 100);
        assert_eq!(bank.get_account(b.id).await.unwrap().balance, 0);
        let page = Page::new(1, 10).unwrap();
        assert!(bank.list_transfers(a.id, page).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_in_currency_missing_account() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let usd = bank.create_account("alice", Currency::Usd, 100).await.unwrap();

        let err = bank
            .transfer_in_currency(usd.id, 55, 10, Currency::Usd, None)
            .await
            .unwrap_err();
        assert_eq!(err, BankError::account_not_found(55));
    }

    #[tokio::test]
    async fn test_delete_account_with_history_is_refused() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let a = bank.create_account("a", Currency::Cad, 100).await.unwrap();
        let b = bank.create_account("b", Currency::Cad, 0).await.unwrap();
        bank.transfer(a.id, b.id, 10).await.unwrap();

        let err = bank.delete_account(b.id).await.unwrap_err();
        assert_eq!(err, BankError::account_in_use(b.id));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(bank.get_account(b.id).await.unwrap().balance, 10);
    }

    #[tokio::test]
    async fn test_listings_use_page() {
        let (_dir, db) = temp_database().await;
        let bank = Bank::new(db, EngineConfig::default());
        let a = bank.create_account("a", Currency::Usd, 100).await.unwrap();
        let b = bank.create_account("b", Currency::Usd, 0).await.unwrap();
        for _ in 0..3 {
            bank.transfer(a.id, b.id, 1).await.unwrap();
        }

        let page = Page::new(2, 2).unwrap();
        assert_eq!(bank.list_transfers(a.id, page).await.unwrap().len(), 1);
        assert_eq!(bank.list_entries(b.id, page).await.unwrap().len(), 1);
        assert_eq!(bank.list_accounts(Page::new(1, 5).unwrap()).await.unwrap().len(), 2);

        let entries = bank.list_entries(a.id, Page::new(1, 5).unwrap()).await.unwrap();
        let first = bank.get_entry(entries[0].id).await.unwrap();
        assert_eq!(first, entries[0]);
        let transfer = bank.get_transfer(first.transfer_id).await.unwrap();
        assert_eq!(transfer.from_account_id, a.id);
    }
}

//! Database connection management
//!
//! SQLite pool setup and embedded schema migrations. Every connection runs in
//! WAL mode with foreign keys enforced and a busy timeout, so concurrent
//! writers queue on the database lock instead of failing immediately.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::types::BankError;

/// Connection pool settings
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite:ledger.db` or `sqlite:///var/lib/ledger.db`
    pub url: String,
    /// Upper bound on concurrent transactions
    pub max_connections: u32,
    /// How long a caller waits for a free connection before a transient failure
    pub acquire_timeout: Duration,
    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:ledger.db".to_string(),
            max_connections: num_cpus::get() as u32,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseConfig {
    /// Default settings for a database file at `path`
    pub fn for_path(path: &Path) -> Self {
        Self {
            url: format!("sqlite://{}", path.display()),
            ..Self::default()
        }
    }
}

/// SQLite connection pool
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database and apply pending migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, BankError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(
            url = %config.url,
            max_connections = config.max_connections,
            "SQLite connection pool established"
        );
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), BankError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

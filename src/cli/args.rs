use crate::core::{BalancePolicy, BatchConfig, EngineConfig};
use crate::db::DatabaseConfig;
use crate::types::{BankError, Currency, Page};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Move money between accounts of a double-entry ledger
#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Atomic money transfers over a double-entry ledger", long_about = None)]
pub struct CliArgs {
    /// SQLite database URL
    #[arg(
        long = "database-url",
        env = "DATABASE_URL",
        global = true,
        value_name = "URL",
        default_value = "sqlite:ledger.db",
        help = "SQLite database URL (created and migrated if missing)"
    )]
    pub database_url: String,

    /// Connection pool size
    #[arg(
        long = "max-connections",
        global = true,
        value_name = "COUNT",
        help = "Maximum pooled connections (default: CPU cores)"
    )]
    pub max_connections: Option<u32>,

    /// Pool acquire timeout in milliseconds
    #[arg(
        long = "acquire-timeout-ms",
        global = true,
        value_name = "MS",
        help = "How long to wait for a free connection (default: 5000)"
    )]
    pub acquire_timeout_ms: Option<u64>,

    /// Default log filter, overridden by RUST_LOG
    #[arg(
        long = "log-level",
        global = true,
        value_name = "LEVEL",
        default_value = "warn"
    )]
    pub log_level: String,

    /// Refuse transfers that would leave the source account negative
    #[arg(long = "reject-overdraft", global = true)]
    pub reject_overdraft: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Page selection shared by the listing commands
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    #[arg(long = "page", value_name = "N", default_value_t = 1)]
    pub page: u32,

    #[arg(long = "page-size", value_name = "SIZE", default_value_t = 10)]
    pub page_size: u32,
}

impl PageArgs {
    pub fn to_page(self) -> Result<Page, BankError> {
        Page::new(self.page, self.page_size)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open an account
    CreateAccount {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(long = "currency", value_name = "CODE", value_parser = parse_currency)]
        currency: Currency,
        #[arg(
            long = "balance",
            value_name = "AMOUNT",
            default_value_t = 0,
            allow_negative_numbers = true
        )]
        balance: i64,
    },
    /// Show one account
    GetAccount {
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// List accounts ordered by ID
    ListAccounts {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Delete an account that has no ledger history
    DeleteAccount {
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Credit an account
    Deposit {
        #[arg(value_name = "ID")]
        id: i64,
        #[arg(value_name = "AMOUNT", allow_negative_numbers = true)]
        amount: i64,
    },
    /// Move money between two accounts
    Transfer {
        #[arg(value_name = "FROM")]
        from: i64,
        #[arg(value_name = "TO")]
        to: i64,
        #[arg(value_name = "AMOUNT", allow_negative_numbers = true)]
        amount: i64,
        /// Require both accounts to hold this currency
        #[arg(long = "currency", value_name = "CODE", value_parser = parse_currency)]
        currency: Option<Currency>,
        /// Roll back unless the transfer commits within this many milliseconds
        #[arg(long = "timeout-ms", value_name = "MS")]
        timeout_ms: Option<u64>,
    },
    /// Show one transfer
    GetTransfer {
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// List transfers into or out of an account
    ListTransfers {
        #[arg(value_name = "ACCOUNT")]
        account: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List ledger entries of an account
    ListEntries {
        #[arg(value_name = "ACCOUNT")]
        account: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Apply a CSV file of transfers (columns: from, to, amount)
    Apply {
        #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
        input_file: PathBuf,
        #[arg(
            long = "max-concurrent",
            value_name = "COUNT",
            help = "Maximum transfers in flight (default: CPU cores)"
        )]
        max_concurrent: Option<usize>,
    },
}

fn parse_currency(value: &str) -> Result<Currency, String> {
    value.parse::<Currency>().map_err(|e| e.to_string())
}

impl CliArgs {
    /// Pool settings from the global options, defaults where unset
    pub fn to_database_config(&self) -> DatabaseConfig {
        let default = DatabaseConfig::default();
        DatabaseConfig {
            url: self.database_url.clone(),
            max_connections: self
                .max_connections
                .filter(|&count| count > 0)
                .unwrap_or(default.max_connections),
            acquire_timeout: self
                .acquire_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(default.acquire_timeout),
            ..default
        }
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        let balance_policy = if self.reject_overdraft {
            BalancePolicy::RejectOverdraft
        } else {
            BalancePolicy::AllowOverdraft
        };
        EngineConfig { balance_policy }
    }
}

/// Batch settings for `apply`
pub fn to_batch_config(max_concurrent: Option<usize>) -> BatchConfig {
    match max_concurrent {
        Some(count) => BatchConfig::new(count),
        None => BatchConfig::default(),
    }
}

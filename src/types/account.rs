//! Account-related types for the ledger
//!
//! This module defines the Account row and the supported currency codes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::error::BankError;

/// Account identifier (storage-assigned, monotonically increasing)
pub type AccountId = i64;

/// Supported ISO-4217 currency codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Currency {
    Usd,
    Eur,
    Cad,
}

impl Currency {
    /// All supported currencies
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Cad];

    /// The three-letter code as stored
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cad => "CAD",
        }
    }
}

impl From<Currency> for &'static str {
    fn from(currency: Currency) -> Self {
        currency.as_str()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = BankError;

    /// Parse a currency code, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BankError::unsupported_currency(s))
    }
}

/// Account state
///
/// `balance` is the authoritative materialized value in minor currency units.
/// It is never modified in memory and written back; the only way to change it
/// is the storage-side adjustment in
/// [`AccountStore::adjust_balance`](crate::core::AccountStore::adjust_balance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,

    /// Display name, unique together with `currency`
    pub name: String,

    pub currency: Currency,

    /// Signed balance in minor units (cents for USD)
    pub balance: i64,

    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Account {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let currency: String = row.try_get("currency")?;
        let currency = currency
            .parse::<Currency>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "currency".to_string(),
                source: Box::new(e),
            })?;

        Ok(Account {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            currency,
            balance: row.try_get("balance")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

//! Connection setup, schema, and shared row-mapping helpers.

mod write_actor;

pub use write_actor::{spawn_store, StoreHandle};

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::Connection;
use rust_decimal::Decimal;

use moneta_core::utils::datetime;

use crate::errors::StorageError;

/// Monetary amounts and timestamps are stored as TEXT: decimals keep their
/// exact digits, timestamps stay lexicographically sortable.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    balance TEXT NOT NULL,
    currency TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    emoji TEXT NOT NULL,
    is_income INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    amount TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    comment TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    pending_deletion INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions (account_id, transaction_date);

CREATE TABLE IF NOT EXISTS pending_operations (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    http_method TEXT NOT NULL,
    endpoint_path TEXT NOT NULL,
    payload TEXT
);
CREATE INDEX IF NOT EXISTS idx_pending_operations_timestamp ON pending_operations (timestamp);
";

/// Opens (creating if needed) the database file and applies the schema.
pub fn open(path: &Path) -> Result<Connection, StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(SCHEMA)?;
    debug!("database ready at {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

pub(crate) fn parse_decimal(raw: &str, what: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw)
        .map_err(|err| StorageError::Corrupted(format!("{what} '{raw}': {err}")))
}

pub(crate) fn parse_datetime(raw: &str, what: &str) -> Result<DateTime<Utc>, StorageError> {
    datetime::parse_iso8601(raw)
        .map_err(|err| StorageError::Corrupted(format!("{what} '{raw}': {err}")))
}

pub(crate) fn format_datetime(value: &DateTime<Utc>) -> String {
    // Microsecond precision: queue ordering must not collapse entries
    // enqueued within the same millisecond.
    value.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

//! Transaction domain: models, local store contract, and service.

mod transactions_model;
mod transactions_service;

pub use transactions_model::*;
pub use transactions_service::*;

use async_trait::async_trait;

use crate::errors::Result;

/// Local mirror of server-confirmed transactions, plus provisional rows
/// created offline (negative ids) and soft-delete markers.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Rows visible to the UI: everything except those marked for deletion.
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<Transaction>>;

    /// Every row, including ones marked for deletion. Reconstruction needs
    /// the hidden rows to compute the delta of a pending delete.
    async fn list_all_for_account(&self, account_id: i64) -> Result<Vec<Transaction>>;

    async fn get(&self, id: i64) -> Result<Option<Transaction>>;
    async fn upsert(&self, transaction: Transaction) -> Result<()>;
    async fn delete(&self, id: i64) -> Result<()>;

    /// Hides a row from listings while its delete request is in flight.
    async fn mark_pending_deletion(&self, id: i64) -> Result<()>;

    /// Overwrites the account's server-confirmed rows with a fresh fetch.
    /// Two kinds of local-only state survive the overwrite: provisional
    /// rows (their create is still queued, the server cannot return them
    /// yet) and deletion marks on rows the server still returns (the delete
    /// is still in flight and the item must not resurface).
    async fn replace_for_account(&self, account_id: i64, rows: Vec<Transaction>) -> Result<()>;
}

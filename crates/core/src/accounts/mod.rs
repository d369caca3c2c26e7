//! Account domain: models, local store contract, and service.

mod accounts_model;
mod accounts_service;

pub use accounts_model::*;
pub use accounts_service::*;

use async_trait::async_trait;

use crate::errors::Result;

/// Local mirror of server-confirmed accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Account>>;
    async fn get(&self, id: i64) -> Result<Option<Account>>;
    async fn upsert(&self, account: Account) -> Result<()>;
}

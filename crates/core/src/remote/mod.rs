//! Remote API boundary.
//!
//! The trait is the only thing services and the synchronizer see; the HTTP
//! implementation lives in its own crate.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::accounts::{Account, AccountUpdateRequest};
use crate::categories::Category;
use crate::errors::ApiError;
use crate::sync::HttpMethod;
use crate::transactions::{TransactionRequest, TransactionResponse};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn fetch_accounts(&self) -> ApiResult<Vec<Account>>;

    async fn update_account(
        &self,
        id: i64,
        request: &AccountUpdateRequest,
    ) -> ApiResult<Account>;

    async fn fetch_categories(&self) -> ApiResult<Vec<Category>>;

    async fn fetch_transactions(
        &self,
        account_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ApiResult<Vec<TransactionResponse>>;

    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> ApiResult<TransactionResponse>;

    async fn update_transaction(
        &self,
        id: i64,
        request: &TransactionRequest,
    ) -> ApiResult<TransactionResponse>;

    async fn delete_transaction(&self, id: i64) -> ApiResult<()>;

    /// Re-issues a queued request verbatim and reports the HTTP status the
    /// server answered with. The response body is intentionally discarded;
    /// replay only needs to know whether the operation landed.
    async fn replay(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&str>,
    ) -> ApiResult<u16>;
}

/// Relative endpoint paths. Queued operations store these verbatim, so the
/// same builders serve both live calls and replay bookkeeping.
pub mod endpoints {
    pub const ACCOUNTS: &str = "/accounts";
    pub const CATEGORIES: &str = "/categories";
    pub const TRANSACTIONS: &str = "/transactions";

    pub fn accounts() -> String {
        ACCOUNTS.to_string()
    }

    pub fn account(id: i64) -> String {
        format!("{ACCOUNTS}/{id}")
    }

    pub fn categories() -> String {
        CATEGORIES.to_string()
    }

    pub fn transactions() -> String {
        TRANSACTIONS.to_string()
    }

    pub fn transaction(id: i64) -> String {
        format!("{TRANSACTIONS}/{id}")
    }

    pub fn transactions_for_account(account_id: i64) -> String {
        format!("{TRANSACTIONS}/account/{account_id}/period")
    }
}

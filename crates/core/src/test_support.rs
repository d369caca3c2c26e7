//! Shared doubles for unit tests: in-memory stores, a scriptable remote,
//! and a fixed reachability source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::watch;

use crate::accounts::{Account, AccountBrief, AccountStore, AccountUpdateRequest};
use crate::categories::{Category, CategoryStore};
use crate::errors::{ApiError, Result};
use crate::reachability::{NetworkStatus, Reachability};
use crate::remote::{ApiResult, RemoteApi};
use crate::sync::{HttpMethod, OutboxStore, PendingOperation};
use crate::transactions::{Transaction, TransactionRequest, TransactionResponse, TransactionStore};

pub mod fixtures {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::utils::datetime;

    pub const SALARY: i64 = 1;
    pub const GROCERIES: i64 = 2;

    pub fn moment() -> DateTime<Utc> {
        datetime::parse_iso8601("2025-06-01T10:00:00.000Z").unwrap()
    }

    pub fn categories() -> Vec<Category> {
        vec![
            Category {
                id: SALARY,
                name: "Salary".to_string(),
                emoji: '💰',
                is_income: true,
            },
            Category {
                id: GROCERIES,
                name: "Groceries".to_string(),
                emoji: '🛒',
                is_income: false,
            },
        ]
    }

    pub fn account(balance: Decimal) -> Account {
        Account {
            id: 1,
            user_id: 7,
            name: "Main".to_string(),
            balance,
            currency: "RUB".to_string(),
            created_at: moment(),
            updated_at: moment(),
        }
    }

    pub fn transaction(id: i64, category_id: i64, amount: Decimal) -> Transaction {
        Transaction {
            id,
            account_id: 1,
            category_id,
            amount,
            transaction_date: moment(),
            comment: None,
            created_at: moment(),
            updated_at: moment(),
        }
    }

    pub fn transaction_request(category_id: i64, amount: Decimal) -> TransactionRequest {
        TransactionRequest {
            account_id: 1,
            category_id,
            amount,
            transaction_date: moment(),
            comment: None,
        }
    }
}

#[derive(Default)]
pub struct MemoryAccountStore {
    rows: Mutex<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn with(account: Account) -> Self {
        Self {
            rows: Mutex::new(vec![account]),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn list(&self) -> Result<Vec<Account>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Account>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn upsert(&self, account: Account) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|a| a.id == account.id) {
            *existing = account;
        } else {
            rows.push(account);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCategoryStore {
    rows: Mutex<Vec<Category>>,
}

impl MemoryCategoryStore {
    pub fn with(categories: Vec<Category>) -> Self {
        Self {
            rows: Mutex::new(categories),
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn list(&self) -> Result<Vec<Category>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Category>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn replace_all(&self, categories: Vec<Category>) -> Result<()> {
        *self.rows.lock().unwrap() = categories;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    rows: Mutex<Vec<(Transaction, bool)>>,
}

impl MemoryTransactionStore {
    pub fn insert(&self, transaction: Transaction) {
        self.rows.lock().unwrap().push((transaction, false));
    }

    pub fn is_marked(&self, id: i64) -> bool {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|(row, marked)| row.id == id && *marked)
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<Transaction>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(row, marked)| row.account_id == account_id && !marked)
            .map(|(row, _)| row.clone())
            .collect())
    }

    async fn list_all_for_account(&self, account_id: i64) -> Result<Vec<Transaction>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(row, _)| row.account_id == account_id)
            .map(|(row, _)| row.clone())
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(row, _)| row.id == id)
            .map(|(row, _)| row.clone()))
    }

    async fn upsert(&self, transaction: Transaction) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some((existing, _)) = rows.iter_mut().find(|(row, _)| row.id == transaction.id) {
            *existing = transaction;
        } else {
            rows.push((transaction, false));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.rows.lock().unwrap().retain(|(row, _)| row.id != id);
        Ok(())
    }

    async fn mark_pending_deletion(&self, id: i64) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some((_, marked)) = rows.iter_mut().find(|(row, _)| row.id == id) {
            *marked = true;
        }
        Ok(())
    }

    async fn replace_for_account(&self, account_id: i64, fresh: Vec<Transaction>) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let marked_ids: Vec<i64> = rows
            .iter()
            .filter(|(row, marked)| row.account_id == account_id && *marked)
            .map(|(row, _)| row.id)
            .collect();
        rows.retain(|(row, _)| row.account_id != account_id || row.is_provisional());
        for row in fresh {
            let marked = marked_ids.contains(&row.id);
            rows.push((row, marked));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOutbox {
    rows: Mutex<Vec<PendingOperation>>,
}

impl MemoryOutbox {
    pub fn push(&self, operation: PendingOperation) {
        self.rows.lock().unwrap().push(operation);
    }
}

#[async_trait]
impl OutboxStore for MemoryOutbox {
    async fn add(&self, operation: PendingOperation) -> Result<()> {
        self.rows.lock().unwrap().push(operation);
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<PendingOperation>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .retain(|op| !ids.contains(&op.id));
        Ok(())
    }
}

pub struct StaticReachability {
    sender: watch::Sender<NetworkStatus>,
}

impl StaticReachability {
    pub fn new(status: NetworkStatus) -> Self {
        let (sender, _) = watch::channel(status);
        Self { sender }
    }

    pub fn set(&self, status: NetworkStatus) {
        self.sender.send_replace(status);
    }
}

impl Reachability for StaticReachability {
    fn current_status(&self) -> NetworkStatus {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.sender.subscribe()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ReplayOutcome {
    Status(u16),
    Transport,
}

/// Scriptable [`RemoteApi`] double. Fetches serve whatever was seeded,
/// writes are recorded, and replay outcomes are consumed in order.
#[derive(Default)]
pub struct MockRemote {
    accounts: Mutex<Vec<Account>>,
    categories: Mutex<Vec<Category>>,
    transactions: Mutex<Vec<TransactionResponse>>,
    fail_requests: AtomicBool,
    next_id: AtomicI64,
    replay_outcomes: Mutex<VecDeque<ReplayOutcome>>,
    replay_delay: Mutex<Option<Duration>>,
    replayed: Mutex<Vec<(HttpMethod, String, Option<String>)>>,
    pub created: Mutex<Vec<TransactionRequest>>,
    pub updated: Mutex<Vec<(i64, TransactionRequest)>>,
    pub deleted: Mutex<Vec<i64>>,
    pub account_updates: Mutex<Vec<(i64, AccountUpdateRequest)>>,
}

impl MockRemote {
    pub fn set_accounts(&self, accounts: Vec<Account>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn set_categories(&self, categories: Vec<Category>) {
        *self.categories.lock().unwrap() = categories;
    }

    pub fn set_transactions(&self, transactions: Vec<TransactionResponse>) {
        *self.transactions.lock().unwrap() = transactions;
    }

    /// Makes every call fail with a transport error, as if the network
    /// dropped mid-request.
    pub fn fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    pub fn script_replays(&self, outcomes: impl IntoIterator<Item = ReplayOutcome>) {
        self.replay_outcomes.lock().unwrap().extend(outcomes);
    }

    pub fn set_replay_delay(&self, delay: Duration) {
        *self.replay_delay.lock().unwrap() = Some(delay);
    }

    pub fn replayed_paths(&self) -> Vec<String> {
        self.replayed
            .lock()
            .unwrap()
            .iter()
            .map(|(_, path, _)| path.clone())
            .collect()
    }

    fn check_transport(&self) -> ApiResult<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("scripted transport failure".into()));
        }
        Ok(())
    }

    fn respond(&self, id: i64, request: &TransactionRequest) -> ApiResult<TransactionResponse> {
        let category = self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == request.category_id)
            .cloned()
            .ok_or(ApiError::Server {
                status: 400,
                body: Some("unknown category".to_string()),
            })?;
        let account = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == request.account_id)
            .map(|a| AccountBrief {
                id: a.id,
                name: a.name.clone(),
                balance: a.balance,
                currency: a.currency.clone(),
            })
            .unwrap_or(AccountBrief {
                id: request.account_id,
                name: "Main".to_string(),
                balance: rust_decimal::Decimal::ZERO,
                currency: "RUB".to_string(),
            });
        let now = chrono::Utc::now();
        Ok(TransactionResponse {
            id,
            account,
            category,
            amount: request.amount,
            transaction_date: request.transaction_date,
            comment: request.comment.clone(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn fetch_accounts(&self) -> ApiResult<Vec<Account>> {
        self.check_transport()?;
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn update_account(
        &self,
        id: i64,
        request: &AccountUpdateRequest,
    ) -> ApiResult<Account> {
        self.check_transport()?;
        self.account_updates
            .lock()
            .unwrap()
            .push((id, request.clone()));
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ApiError::Server {
                status: 404,
                body: None,
            })?;
        account.name = request.name.clone();
        account.balance = request.balance;
        account.currency = request.currency.clone();
        account.updated_at = chrono::Utc::now();
        Ok(account.clone())
    }

    async fn fetch_categories(&self) -> ApiResult<Vec<Category>> {
        self.check_transport()?;
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn fetch_transactions(
        &self,
        account_id: i64,
        _start: Option<NaiveDate>,
        _end: Option<NaiveDate>,
    ) -> ApiResult<Vec<TransactionResponse>> {
        self.check_transport()?;
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.account.id == account_id)
            .cloned()
            .collect())
    }

    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> ApiResult<TransactionResponse> {
        self.check_transport()?;
        self.created.lock().unwrap().push(request.clone());
        let id = 1000 + self.next_id.fetch_add(1, Ordering::SeqCst);
        let response = self.respond(id, request)?;
        self.transactions.lock().unwrap().push(response.clone());
        Ok(response)
    }

    async fn update_transaction(
        &self,
        id: i64,
        request: &TransactionRequest,
    ) -> ApiResult<TransactionResponse> {
        self.check_transport()?;
        self.updated.lock().unwrap().push((id, request.clone()));
        self.respond(id, request)
    }

    async fn delete_transaction(&self, id: i64) -> ApiResult<()> {
        self.check_transport()?;
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn replay(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&str>,
    ) -> ApiResult<u16> {
        let delay = *self.replay_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_transport()?;
        self.replayed
            .lock()
            .unwrap()
            .push((method, path.to_string(), payload.map(str::to_string)));
        let outcome = self
            .replay_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ReplayOutcome::Status(200));
        match outcome {
            ReplayOutcome::Status(status) if (200..300).contains(&status) => Ok(status),
            ReplayOutcome::Status(status) => Err(ApiError::Server { status, body: None }),
            ReplayOutcome::Transport => {
                Err(ApiError::Transport("scripted transport failure".into()))
            }
        }
    }
}

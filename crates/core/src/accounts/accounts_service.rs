use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::accounts::{Account, AccountStore, Currency};
use crate::categories::CategoryStore;
use crate::errors::{Error, Result};
use crate::reachability::Reachability;
use crate::remote::{endpoints, RemoteApi};
use crate::sync::{encode_payload, reconstruction, HttpMethod, OutboxStore, PendingOperation};
use crate::sync::Synchronizer;
use crate::transactions::TransactionStore;

#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// The user's primary account, reconstructed from queued operations
    /// when the server is unreachable.
    async fn primary_account(&self) -> Result<Account>;

    async fn rename(&self, name: String) -> Result<()>;
    async fn update_balance(&self, balance: Decimal) -> Result<()>;
    async fn update_currency(&self, currency: Currency) -> Result<()>;
}

/// Account reads and edits with offline fallback.
///
/// Every entry point drains the outbox first, then prefers fresh server
/// state; when that is not possible it answers from the local mirror plus
/// the queued operations. Calls are serialized through a gate so a read
/// never interleaves with an edit's queue-then-mirror write pair.
pub struct AccountService {
    remote: Arc<dyn RemoteApi>,
    accounts: Arc<dyn AccountStore>,
    categories: Arc<dyn CategoryStore>,
    transactions: Arc<dyn TransactionStore>,
    outbox: Arc<dyn OutboxStore>,
    synchronizer: Arc<Synchronizer>,
    reachability: Arc<dyn Reachability>,
    gate: Mutex<()>,
}

impl AccountService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        accounts: Arc<dyn AccountStore>,
        categories: Arc<dyn CategoryStore>,
        transactions: Arc<dyn TransactionStore>,
        outbox: Arc<dyn OutboxStore>,
        synchronizer: Arc<Synchronizer>,
        reachability: Arc<dyn Reachability>,
    ) -> Self {
        Self {
            remote,
            accounts,
            categories,
            transactions,
            outbox,
            synchronizer,
            reachability,
            gate: Mutex::new(()),
        }
    }

    fn is_online(&self) -> bool {
        self.reachability.current_status().is_online()
    }

    async fn confirmed_primary(&self) -> Result<Account> {
        self.accounts
            .list()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::AccountNotFound("no account in the local mirror".to_string()))
    }

    async fn local_primary(&self) -> Result<Account> {
        let account = self.confirmed_primary().await?;
        let operations = self.outbox.fetch_all().await?;
        if operations.is_empty() {
            return Ok(account);
        }
        let categories: HashMap<_, _> = self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let mirror: HashMap<_, _> = self
            .transactions
            .list_all_for_account(account.id)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        reconstruction::reconstruct_account(account, &operations, &categories, &mirror)
    }

    async fn apply_update(&self, mut account: Account) -> Result<()> {
        account.updated_at = Utc::now();
        let request = account.update_request();

        if self.is_online() {
            match self.remote.update_account(account.id, &request).await {
                Ok(confirmed) => {
                    self.accounts.upsert(confirmed).await?;
                    return Ok(());
                }
                Err(err) => {
                    warn!("account update failed, queueing it for replay: {err}");
                }
            }
        }

        let payload = encode_payload(&request)?;
        self.outbox
            .add(PendingOperation::new(
                HttpMethod::Put,
                endpoints::account(account.id),
                Some(payload),
            ))
            .await?;
        // Safe to patch the mirror optimistically: replaying the queued PUT
        // overwrites the account wholesale, it does not apply a delta.
        self.accounts.upsert(account).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountServiceTrait for AccountService {
    async fn primary_account(&self) -> Result<Account> {
        let _gate = self.gate.lock().await;
        self.synchronizer.synchronize().await;

        if self.is_online() {
            match self.remote.fetch_accounts().await {
                Ok(accounts) => match accounts.into_iter().next() {
                    Some(primary) => {
                        self.accounts.upsert(primary.clone()).await?;
                        return Ok(primary);
                    }
                    None => {
                        return Err(Error::AccountNotFound(
                            "server returned no accounts".to_string(),
                        ))
                    }
                },
                Err(err) => {
                    warn!("account fetch failed, answering from local data: {err}");
                }
            }
        }

        self.local_primary().await
    }

    async fn rename(&self, name: String) -> Result<()> {
        let _gate = self.gate.lock().await;
        let mut account = self.confirmed_primary().await?;
        account.name = name;
        self.apply_update(account).await
    }

    async fn update_balance(&self, balance: Decimal) -> Result<()> {
        let _gate = self.gate.lock().await;
        let mut account = self.confirmed_primary().await?;
        account.balance = balance;
        self.apply_update(account).await
    }

    async fn update_currency(&self, currency: Currency) -> Result<()> {
        let _gate = self.gate.lock().await;
        let mut account = self.confirmed_primary().await?;
        account.currency = currency.code().to_string();
        self.apply_update(account).await
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::errors::{Error, Result};
use crate::reachability::Reachability;
use crate::remote::{endpoints, RemoteApi};
use crate::sync::{encode_payload, reconstruction, HttpMethod, OutboxStore, PendingOperation};
use crate::sync::Synchronizer;
use crate::transactions::{Transaction, TransactionRequest, TransactionStore};

#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Transactions of one account within `[start, end]`, newest first.
    async fn list(
        &self,
        account_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;

    async fn create(&self, request: TransactionRequest) -> Result<()>;
    async fn update(&self, id: i64, request: TransactionRequest) -> Result<()>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Transaction reads and edits with offline fallback.
///
/// Edits that cannot reach the server are queued verbatim; the local
/// mirror itself is not patched for updates, so a queued edit's effect is
/// computed at read time by overlaying the queue onto the mirror. Creates
/// are the exception: they insert a provisional row under a negative id
/// because a brand-new entity has nothing in the mirror to overlay onto.
pub struct TransactionService {
    remote: Arc<dyn RemoteApi>,
    transactions: Arc<dyn TransactionStore>,
    outbox: Arc<dyn OutboxStore>,
    synchronizer: Arc<Synchronizer>,
    reachability: Arc<dyn Reachability>,
    gate: Mutex<()>,
}

impl TransactionService {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        transactions: Arc<dyn TransactionStore>,
        outbox: Arc<dyn OutboxStore>,
        synchronizer: Arc<Synchronizer>,
        reachability: Arc<dyn Reachability>,
    ) -> Self {
        Self {
            remote,
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

    /// A provisional row is a stand-in for a create the server has not
    /// confirmed yet. Once no create is queued anymore the confirmed copy
    /// arrived with the fresh fetch, and keeping the stand-in would show
    /// the transaction twice.
    async fn reconcile_provisional_rows(&self, account_id: i64) -> Result<()> {
        let operations = self.outbox.fetch_all().await?;
        let creates_pending = operations
            .iter()
            .any(|op| op.method == HttpMethod::Post && op.concerns(endpoints::TRANSACTIONS));
        if creates_pending {
            return Ok(());
        }
        for row in self.transactions.list_all_for_account(account_id).await? {
            if row.is_provisional() {
                self.transactions.delete(row.id).await?;
            }
        }
        Ok(())
    }

    async fn local_listing(
        &self,
        account_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let rows = self.transactions.list_for_account(account_id).await?;
        let operations = self.outbox.fetch_all().await?;
        let mut rows = reconstruction::overlay_transactions(rows, &operations)?;
        rows.retain(|row| row.transaction_date >= start && row.transaction_date <= end);
        rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        Ok(rows)
    }
}

fn validate(request: &TransactionRequest) -> Result<()> {
    if request.transaction_date > Utc::now() {
        return Err(Error::Validation(
            "transaction date cannot be in the future".to_string(),
        ));
    }
    if request.amount <= Decimal::ZERO {
        return Err(Error::Validation(
            "transaction amount must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Provisional ids are negative so they can never collide with ids the
/// server hands out. Millisecond resolution is enough: creates go through
/// a serializing gate.
fn provisional_id(now: DateTime<Utc>) -> i64 {
    -now.timestamp_millis()
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn list(
        &self,
        account_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let _gate = self.gate.lock().await;
        self.synchronizer.synchronize().await;

        if self.is_online() {
            match self
                .remote
                .fetch_transactions(account_id, Some(start.date_naive()), Some(end.date_naive()))
                .await
            {
                Ok(responses) => {
                    let fresh = responses
                        .into_iter()
                        .map(|response| response.into_transaction())
                        .collect();
                    self.transactions
                        .replace_for_account(account_id, fresh)
                        .await?;
                    self.reconcile_provisional_rows(account_id).await?;
                }
                Err(err) => {
                    warn!("transaction fetch failed, answering from local data: {err}");
                }
            }
        }

        // Both paths answer from the mirror. After a fresh fetch the queue
        // is usually empty and the overlay is a no-op; after a failure it
        // carries the edits the server has not seen yet.
        self.local_listing(account_id, start, end).await
    }

    async fn create(&self, request: TransactionRequest) -> Result<()> {
        let _gate = self.gate.lock().await;
        validate(&request)?;

        if self.is_online() {
            match self.remote.create_transaction(&request).await {
                Ok(response) => {
                    self.transactions.upsert(response.into_transaction()).await?;
                    return Ok(());
                }
                Err(err) => {
                    warn!("transaction create failed, queueing it for replay: {err}");
                }
            }
        }

        let now = Utc::now();
        let provisional = Transaction {
            id: provisional_id(now),
            account_id: request.account_id,
            category_id: request.category_id,
            amount: request.amount,
            transaction_date: request.transaction_date,
            comment: request.comment.clone(),
            created_at: now,
            updated_at: now,
        };
        self.transactions.upsert(provisional).await?;

        let payload = encode_payload(&request)?;
        self.outbox
            .add(PendingOperation::new(
                HttpMethod::Post,
                endpoints::transactions(),
                Some(payload),
            ))
            .await?;
        Ok(())
    }

    async fn update(&self, id: i64, request: TransactionRequest) -> Result<()> {
        let _gate = self.gate.lock().await;
        validate(&request)?;

        if self.is_online() {
            match self.remote.update_transaction(id, &request).await {
                Ok(response) => {
                    self.transactions.upsert(response.into_transaction()).await?;
                    return Ok(());
                }
                Err(err) => {
                    warn!("transaction update failed, queueing it for replay: {err}");
                }
            }
        }

        let payload = encode_payload(&request)?;
        self.outbox
            .add(PendingOperation::new(
                HttpMethod::Put,
                endpoints::transaction(id),
                Some(payload),
            ))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let _gate = self.gate.lock().await;

        if self.is_online() {
            match self.remote.delete_transaction(id).await {
                Ok(()) => {
                    self.transactions.delete(id).await?;
                    return Ok(());
                }
                Err(err) => {
                    warn!("transaction delete failed, queueing it for replay: {err}");
                }
            }
        }

        self.transactions.mark_pending_deletion(id).await?;
        self.outbox
            .add(PendingOperation::new(
                HttpMethod::Delete,
                endpoints::transaction(id),
                None,
            ))
            .await?;
        Ok(())
    }
}

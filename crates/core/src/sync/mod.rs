//! Offline queue, replay, and local state reconstruction.

mod outbox_model;
pub mod reconstruction;
mod synchronizer;

pub use outbox_model::*;
pub use synchronizer::*;

use async_trait::async_trait;

use crate::errors::Result;

/// Durable log of requests that could not be delivered.
///
/// Entries must come back from `fetch_all` in the order they were enqueued;
/// replay and reconstruction both depend on it.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    async fn add(&self, operation: PendingOperation) -> Result<()>;
    async fn fetch_all(&self) -> Result<Vec<PendingOperation>>;
    async fn delete(&self, ids: &[String]) -> Result<()>;
}

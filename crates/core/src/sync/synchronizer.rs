use std::sync::Arc;

use log::{debug, error, warn};
use tokio::sync::Mutex;

use crate::errors::FailureClass;
use crate::reachability::{NetworkStatus, Reachability};
use crate::remote::RemoteApi;
use crate::sync::OutboxStore;

/// What one replay pass did. A pass that found nothing to do reports all
/// zeroes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Queued operations considered this pass.
    pub attempted: usize,
    /// Accepted by the server and removed from the queue.
    pub succeeded: usize,
    /// Rejected permanently (4xx) and removed from the queue.
    pub discarded: usize,
    /// Failed transiently; left queued for a later pass.
    pub deferred: usize,
}

/// Drains the outbox against the server.
///
/// Replay is sequential and in enqueue order, so dependent operations
/// (create, then edit, then delete) land in the order the user made them.
/// Delivery is at-least-once: entries are only removed after the server
/// answers, so a crash between answer and removal means a duplicate replay,
/// never a lost one.
pub struct Synchronizer {
    outbox: Arc<dyn OutboxStore>,
    remote: Arc<dyn RemoteApi>,
    reachability: Arc<dyn Reachability>,
    in_flight: Mutex<()>,
}

impl Synchronizer {
    pub fn new(
        outbox: Arc<dyn OutboxStore>,
        remote: Arc<dyn RemoteApi>,
        reachability: Arc<dyn Reachability>,
    ) -> Self {
        Self {
            outbox,
            remote,
            reachability,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs one replay pass. A no-op when offline, when the queue is empty,
    /// or when another pass is already running; overlapping passes would
    /// replay the same entries twice.
    ///
    /// Store failures are logged and swallowed: synchronization runs ahead
    /// of reads and must never block them.
    pub async fn synchronize(&self) -> SyncReport {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("synchronization already in progress, skipping");
            return SyncReport::default();
        };

        if self.reachability.current_status() != NetworkStatus::Online {
            return SyncReport::default();
        }

        let pending = match self.outbox.fetch_all().await {
            Ok(pending) => pending,
            Err(err) => {
                error!("failed to read pending operations: {err}");
                return SyncReport::default();
            }
        };
        if pending.is_empty() {
            return SyncReport::default();
        }

        debug!("replaying {} pending operations", pending.len());
        let mut report = SyncReport {
            attempted: pending.len(),
            ..SyncReport::default()
        };
        let mut resolved = Vec::new();

        for operation in &pending {
            match self
                .remote
                .replay(
                    operation.method,
                    &operation.path,
                    operation.payload.as_deref(),
                )
                .await
            {
                Ok(status) => {
                    debug!(
                        "replayed {} {} ({status})",
                        operation.method, operation.path
                    );
                    resolved.push(operation.id.clone());
                    report.succeeded += 1;
                }
                Err(err) if err.failure_class() == FailureClass::Fatal => {
                    warn!(
                        "server rejected {} {} permanently, dropping it: {err}",
                        operation.method, operation.path
                    );
                    resolved.push(operation.id.clone());
                    report.discarded += 1;
                }
                Err(err) => {
                    warn!(
                        "deferring {} {} until a later pass: {err}",
                        operation.method, operation.path
                    );
                    report.deferred += 1;
                }
            }
        }

        if !resolved.is_empty() {
            if let Err(err) = self.outbox.delete(&resolved).await {
                error!("failed to remove resolved operations from the queue: {err}");
            }
        }

        report
    }
}

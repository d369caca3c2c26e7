//! Network reachability signal.
//!
//! The monitor publishes the current status through a [`tokio::sync::watch`]
//! channel, so late subscribers immediately observe the latest value and
//! every subscriber sees transitions in order.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, NetworkStatus::Online)
    }
}

/// Read side of the reachability signal.
pub trait Reachability: Send + Sync {
    fn current_status(&self) -> NetworkStatus;

    /// Subscribes to status transitions. The receiver yields the current
    /// value first, then each change.
    fn subscribe(&self) -> watch::Receiver<NetworkStatus>;
}

/// Reachability source backed by an optional TCP probe loop.
///
/// Status can also be fed externally via [`NetworkMonitor::set_status`],
/// which is how platform connectivity callbacks and tests drive it.
pub struct NetworkMonitor {
    sender: watch::Sender<NetworkStatus>,
    probe_task: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkMonitor {
    pub fn new(initial: NetworkStatus) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender,
            probe_task: Mutex::new(None),
        }
    }

    /// Publishes a new status. Repeated identical values are still sent so
    /// subscribers can use the channel as a liveness tick, but transitions
    /// are the only thing logged.
    pub fn set_status(&self, status: NetworkStatus) {
        let previous = *self.sender.borrow();
        if previous != status {
            debug!("network status changed: {previous:?} -> {status:?}");
        }
        self.sender.send_replace(status);
    }

    /// Starts a background loop that derives status from a TCP connect to
    /// `addr` every `interval`. Replaces any previously running probe.
    pub fn start_probing(self: &Arc<Self>, addr: SocketAddr, interval: Duration) {
        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                let status = probe(addr).await;
                monitor.set_status(status);
                tokio::time::sleep(interval).await;
            }
        });
        let mut slot = match self.probe_task.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    pub fn stop_probing(&self) {
        let mut slot = match self.probe_task.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        self.stop_probing();
    }
}

impl Reachability for NetworkMonitor {
    fn current_status(&self) -> NetworkStatus {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.sender.subscribe()
    }
}

async fn probe(addr: SocketAddr) -> NetworkStatus {
    match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => NetworkStatus::Online,
        _ => NetworkStatus::Offline,
    }
}

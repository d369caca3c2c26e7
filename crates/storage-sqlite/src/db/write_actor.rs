//! Single-writer actor owning the SQLite connection.
//!
//! SQLite allows one writer at a time; instead of wrapping the connection
//! in a lock shared across async tasks, a dedicated thread owns it and
//! executes jobs sent over a channel. Each job runs inside a transaction:
//! commit on `Ok`, rollback on `Err`.

use rusqlite::Connection;
use tokio::sync::{mpsc, oneshot};

use crate::errors::StorageError;

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

const JOB_QUEUE_DEPTH: usize = 64;

/// Cheap to clone; every store holds one.
#[derive(Clone)]
pub struct StoreHandle {
    jobs: mpsc::Sender<Job>,
}

/// Moves the connection onto a dedicated thread and returns the handle
/// used to run jobs against it. The thread exits when the last handle is
/// dropped.
pub fn spawn_store(mut conn: Connection) -> Result<StoreHandle, StorageError> {
    let (jobs, mut inbox) = mpsc::channel::<Job>(JOB_QUEUE_DEPTH);
    std::thread::Builder::new()
        .name("moneta-store".to_string())
        .spawn(move || {
            while let Some(job) = inbox.blocking_recv() {
                job(&mut conn);
            }
        })?;
    Ok(StoreHandle { jobs })
}

impl StoreHandle {
    /// Runs `job` on the store thread inside a transaction and awaits its
    /// result.
    pub async fn exec<T, F>(&self, job: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError> + Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let wrapped: Job = Box::new(move |conn| {
            let result = run_in_transaction(conn, job);
            let _ = reply.send(result);
        });
        self.jobs
            .send(wrapped)
            .await
            .map_err(|_| StorageError::WorkerGone)?;
        receiver.await.map_err(|_| StorageError::WorkerGone)?
    }
}

fn run_in_transaction<T, F>(conn: &mut Connection, job: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    let tx = conn.transaction()?;
    let value = job(&tx)?;
    tx.commit()?;
    Ok(value)
}

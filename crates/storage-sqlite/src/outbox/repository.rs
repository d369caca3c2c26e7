use async_trait::async_trait;
use rusqlite::{params, Row};

use moneta_core::errors::Result;
use moneta_core::sync::{HttpMethod, OutboxStore, PendingOperation};

use crate::db::{format_datetime, parse_datetime, StoreHandle};
use crate::errors::StorageError;

pub struct SqliteOutboxStore {
    store: StoreHandle,
}

impl SqliteOutboxStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

fn operation_from_row(row: &Row<'_>) -> std::result::Result<PendingOperation, StorageError> {
    let id: String = row.get(0)?;
    let timestamp: String = row.get(1)?;
    let method: String = row.get(2)?;
    let method = HttpMethod::parse(&method).ok_or_else(|| {
        StorageError::Corrupted(format!("queued operation {id} has unknown method '{method}'"))
    })?;
    Ok(PendingOperation {
        timestamp: parse_datetime(&timestamp, "queued operation timestamp")?,
        id,
        method,
        path: row.get(3)?,
        payload: row.get(4)?,
    })
}

#[async_trait]
impl OutboxStore for SqliteOutboxStore {
    async fn add(&self, operation: PendingOperation) -> Result<()> {
        Ok(self
            .store
            .exec(move |tx| {
                tx.execute(
                    "INSERT INTO pending_operations
                        (id, timestamp, http_method, endpoint_path, payload)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        operation.id,
                        format_datetime(&operation.timestamp),
                        operation.method.as_str(),
                        operation.path,
                        operation.payload,
                    ],
                )?;
                Ok(())
            })
            .await?)
    }

    async fn fetch_all(&self) -> Result<Vec<PendingOperation>> {
        Ok(self
            .store
            .exec(|tx| {
                // Timestamps are fixed-width UTC strings, so lexicographic
                // order is chronological; ids (UUIDv7) break ties.
                let mut stmt = tx.prepare(
                    "SELECT id, timestamp, http_method, endpoint_path, payload
                     FROM pending_operations ORDER BY timestamp ASC, id ASC",
                )?;
                let mut rows = stmt.query([])?;
                let mut operations = Vec::new();
                while let Some(row) = rows.next()? {
                    operations.push(operation_from_row(row)?);
                }
                Ok(operations)
            })
            .await?)
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let ids = ids.to_vec();
        Ok(self
            .store
            .exec(move |tx| {
                let mut stmt = tx.prepare("DELETE FROM pending_operations WHERE id = ?1")?;
                for id in &ids {
                    stmt.execute(params![id])?;
                }
                Ok(())
            })
            .await?)
    }
}

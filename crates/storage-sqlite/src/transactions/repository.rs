use async_trait::async_trait;
use rusqlite::{params, Row, Transaction as SqlTransaction};

use moneta_core::errors::Result;
use moneta_core::transactions::{Transaction, TransactionStore};

use crate::db::{format_datetime, parse_datetime, parse_decimal, StoreHandle};
use crate::errors::StorageError;

pub struct SqliteTransactionStore {
    store: StoreHandle,
}

impl SqliteTransactionStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

fn transaction_from_row(row: &Row<'_>) -> std::result::Result<Transaction, StorageError> {
    let amount: String = row.get(3)?;
    let transaction_date: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        category_id: row.get(2)?,
        amount: parse_decimal(&amount, "transaction amount")?,
        transaction_date: parse_datetime(&transaction_date, "transaction date")?,
        comment: row.get(5)?,
        created_at: parse_datetime(&created_at, "transaction created_at")?,
        updated_at: parse_datetime(&updated_at, "transaction updated_at")?,
    })
}

const SELECT: &str = "SELECT id, account_id, category_id, amount, transaction_date, comment, \
                      created_at, updated_at FROM transactions";

fn query_rows(
    tx: &SqlTransaction<'_>,
    suffix: &str,
    account_id: i64,
) -> std::result::Result<Vec<Transaction>, StorageError> {
    let mut stmt = tx.prepare(&format!("{SELECT} {suffix}"))?;
    let mut rows = stmt.query(params![account_id])?;
    let mut transactions = Vec::new();
    while let Some(row) = rows.next()? {
        transactions.push(transaction_from_row(row)?);
    }
    Ok(transactions)
}

fn insert_row(
    tx: &SqlTransaction<'_>,
    transaction: &Transaction,
    pending_deletion: bool,
) -> std::result::Result<(), StorageError> {
    tx.execute(
        "INSERT INTO transactions
            (id, account_id, category_id, amount, transaction_date, comment,
             created_at, updated_at, pending_deletion)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            account_id = excluded.account_id,
            category_id = excluded.category_id,
            amount = excluded.amount,
            transaction_date = excluded.transaction_date,
            comment = excluded.comment,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at",
        params![
            transaction.id,
            transaction.account_id,
            transaction.category_id,
            transaction.amount.to_string(),
            format_datetime(&transaction.transaction_date),
            transaction.comment,
            format_datetime(&transaction.created_at),
            format_datetime(&transaction.updated_at),
            pending_deletion,
        ],
    )?;
    Ok(())
}

#[async_trait]
impl TransactionStore for SqliteTransactionStore {
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<Transaction>> {
        Ok(self
            .store
            .exec(move |tx| {
                query_rows(
                    tx,
                    "WHERE account_id = ?1 AND pending_deletion = 0 \
                     ORDER BY transaction_date DESC",
                    account_id,
                )
            })
            .await?)
    }

    async fn list_all_for_account(&self, account_id: i64) -> Result<Vec<Transaction>> {
        Ok(self
            .store
            .exec(move |tx| {
                query_rows(
                    tx,
                    "WHERE account_id = ?1 ORDER BY transaction_date DESC",
                    account_id,
                )
            })
            .await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self
            .store
            .exec(move |tx| {
                let mut stmt = tx.prepare(&format!("{SELECT} WHERE id = ?1"))?;
                let mut rows = stmt.query(params![id])?;
                match rows.next()? {
                    Some(row) => Ok(Some(transaction_from_row(row)?)),
                    None => Ok(None),
                }
            })
            .await?)
    }

    async fn upsert(&self, transaction: Transaction) -> Result<()> {
        Ok(self
            .store
            .exec(move |tx| insert_row(tx, &transaction, false))
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        Ok(self
            .store
            .exec(move |tx| {
                tx.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?)
    }

    async fn mark_pending_deletion(&self, id: i64) -> Result<()> {
        Ok(self
            .store
            .exec(move |tx| {
                tx.execute(
                    "UPDATE transactions SET pending_deletion = 1 WHERE id = ?1",
                    params![id],
                )?;
                Ok(())
            })
            .await?)
    }

    async fn replace_for_account(&self, account_id: i64, rows: Vec<Transaction>) -> Result<()> {
        Ok(self
            .store
            .exec(move |tx| {
                let marked: Vec<i64> = {
                    let mut stmt = tx.prepare(
                        "SELECT id FROM transactions \
                         WHERE account_id = ?1 AND pending_deletion = 1",
                    )?;
                    let ids = stmt.query_map(params![account_id], |row| row.get(0))?;
                    ids.collect::<rusqlite::Result<_>>()?
                };
                // Provisional rows stay: their create is still queued and a
                // server fetch cannot contain them yet.
                tx.execute(
                    "DELETE FROM transactions WHERE account_id = ?1 AND id > 0",
                    params![account_id],
                )?;
                for row in rows {
                    let pending_deletion = marked.contains(&row.id);
                    insert_row(tx, &row, pending_deletion)?;
                }
                Ok(())
            })
            .await?)
    }
}

use async_trait::async_trait;
use rusqlite::{params, Row};

use moneta_core::accounts::{Account, AccountStore};
use moneta_core::errors::Result;

use crate::db::{format_datetime, parse_datetime, parse_decimal, StoreHandle};
use crate::errors::StorageError;

pub struct SqliteAccountStore {
    store: StoreHandle,
}

impl SqliteAccountStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

fn account_from_row(row: &Row<'_>) -> std::result::Result<Account, StorageError> {
    let balance: String = row.get(3)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        balance: parse_decimal(&balance, "account balance")?,
        currency: row.get(4)?,
        created_at: parse_datetime(&created_at, "account created_at")?,
        updated_at: parse_datetime(&updated_at, "account updated_at")?,
    })
}

const SELECT: &str =
    "SELECT id, user_id, name, balance, currency, created_at, updated_at FROM accounts";

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn list(&self) -> Result<Vec<Account>> {
        Ok(self
            .store
            .exec(|tx| {
                let mut stmt = tx.prepare(&format!("{SELECT} ORDER BY id ASC"))?;
                let mut rows = stmt.query([])?;
                let mut accounts = Vec::new();
                while let Some(row) = rows.next()? {
                    accounts.push(account_from_row(row)?);
                }
                Ok(accounts)
            })
            .await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Account>> {
        Ok(self
            .store
            .exec(move |tx| {
                let mut stmt = tx.prepare(&format!("{SELECT} WHERE id = ?1"))?;
                let mut rows = stmt.query(params![id])?;
                match rows.next()? {
                    Some(row) => Ok(Some(account_from_row(row)?)),
                    None => Ok(None),
                }
            })
            .await?)
    }

    async fn upsert(&self, account: Account) -> Result<()> {
        Ok(self
            .store
            .exec(move |tx| {
                tx.execute(
                    "INSERT INTO accounts (id, user_id, name, balance, currency, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                        user_id = excluded.user_id,
                        name = excluded.name,
                        balance = excluded.balance,
                        currency = excluded.currency,
                        created_at = excluded.created_at,
                        updated_at = excluded.updated_at",
                    params![
                        account.id,
                        account.user_id,
                        account.name,
                        account.balance.to_string(),
                        account.currency,
                        format_datetime(&account.created_at),
                        format_datetime(&account.updated_at),
                    ],
                )?;
                Ok(())
            })
            .await?)
    }
}

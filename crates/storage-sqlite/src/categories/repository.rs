use async_trait::async_trait;
use rusqlite::{params, Row};

use moneta_core::categories::{Category, CategoryStore};
use moneta_core::errors::Result;

use crate::db::StoreHandle;
use crate::errors::StorageError;

pub struct SqliteCategoryStore {
    store: StoreHandle,
}

impl SqliteCategoryStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

fn category_from_row(row: &Row<'_>) -> std::result::Result<Category, StorageError> {
    let id: i64 = row.get(0)?;
    let emoji: String = row.get(2)?;
    let emoji = emoji
        .chars()
        .next()
        .ok_or_else(|| StorageError::Corrupted(format!("category {id} has an empty emoji")))?;
    Ok(Category {
        id,
        name: row.get(1)?,
        emoji,
        is_income: row.get(3)?,
    })
}

const SELECT: &str = "SELECT id, name, emoji, is_income FROM categories";

#[async_trait]
impl CategoryStore for SqliteCategoryStore {
    async fn list(&self) -> Result<Vec<Category>> {
        Ok(self
            .store
            .exec(|tx| {
                let mut stmt = tx.prepare(&format!("{SELECT} ORDER BY id ASC"))?;
                let mut rows = stmt.query([])?;
                let mut categories = Vec::new();
                while let Some(row) = rows.next()? {
                    categories.push(category_from_row(row)?);
                }
                Ok(categories)
            })
            .await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Category>> {
        Ok(self
            .store
            .exec(move |tx| {
                let mut stmt = tx.prepare(&format!("{SELECT} WHERE id = ?1"))?;
                let mut rows = stmt.query(params![id])?;
                match rows.next()? {
                    Some(row) => Ok(Some(category_from_row(row)?)),
                    None => Ok(None),
                }
            })
            .await?)
    }

    async fn replace_all(&self, categories: Vec<Category>) -> Result<()> {
        Ok(self
            .store
            .exec(move |tx| {
                tx.execute("DELETE FROM categories", [])?;
                let mut stmt = tx.prepare(
                    "INSERT INTO categories (id, name, emoji, is_income) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for category in categories {
                    stmt.execute(params![
                        category.id,
                        category.name,
                        category.emoji.to_string(),
                        category.is_income,
                    ])?;
                }
                Ok(())
            })
            .await?)
    }
}

//! Category domain: models, local store contract, and service.

mod categories_model;
mod categories_service;

pub use categories_model::*;
pub use categories_service::*;

use async_trait::async_trait;

use crate::errors::Result;

/// Local mirror of the server's category list. Categories are reference
/// data; the client never mutates them individually.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>>;
    async fn get(&self, id: i64) -> Result<Option<Category>>;
    async fn replace_all(&self, categories: Vec<Category>) -> Result<()>;
}

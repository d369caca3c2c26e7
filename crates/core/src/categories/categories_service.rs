use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use tokio::sync::Mutex;

use crate::categories::{Category, CategoryStore, Direction};
use crate::errors::Result;
use crate::reachability::Reachability;
use crate::remote::RemoteApi;

#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Category>>;
    async fn get_by_direction(&self, direction: Direction) -> Result<Vec<Category>>;
}

/// Category reads with offline fallback. Categories are read-only reference
/// data, so there is no outbox involvement: fresh fetches replace the local
/// mirror wholesale, and offline reads serve the mirror.
pub struct CategoryService {
    remote: Arc<dyn RemoteApi>,
    categories: Arc<dyn CategoryStore>,
    reachability: Arc<dyn Reachability>,
    gate: Mutex<()>,
}

impl CategoryService {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        categories: Arc<dyn CategoryStore>,
        reachability: Arc<dyn Reachability>,
    ) -> Self {
        Self {
            remote,
            categories,
            reachability,
            gate: Mutex::new(()),
        }
    }

    async fn all_categories(&self) -> Result<Vec<Category>> {
        if self.reachability.current_status().is_online() {
            match self.remote.fetch_categories().await {
                Ok(fresh) => {
                    self.categories.replace_all(fresh.clone()).await?;
                    return Ok(fresh);
                }
                Err(err) => {
                    warn!("category fetch failed, answering from local data: {err}");
                }
            }
        }
        self.categories.list().await
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    async fn get_all(&self) -> Result<Vec<Category>> {
        let _gate = self.gate.lock().await;
        self.all_categories().await
    }

    async fn get_by_direction(&self, direction: Direction) -> Result<Vec<Category>> {
        let _gate = self.gate.lock().await;
        let mut categories = self.all_categories().await?;
        categories.retain(|c| c.matches(direction));
        Ok(categories)
    }
}

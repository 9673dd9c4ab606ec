use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{ProductId, Result, UserId, WishlistEntry, WishlistStore};

#[derive(Default)]
struct WishlistState {
    entries: Vec<WishlistEntry>,
    next_id: i64,
}

/// In-memory wishlist store.
#[derive(Clone, Default)]
pub struct InMemoryWishlistStore {
    state: Arc<RwLock<WishlistState>>,
}

impl InMemoryWishlistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishlistStore for InMemoryWishlistStore {
    async fn add(&self, user_id: &UserId, product_id: ProductId) -> Result<WishlistEntry> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .entries
            .iter()
            .find(|e| &e.user_id == user_id && e.product_id == product_id)
        {
            return Ok(existing.clone());
        }

        state.next_id += 1;
        let entry = WishlistEntry {
            id: state.next_id,
            user_id: user_id.clone(),
            product_id,
            created_at: Utc::now(),
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn remove(&self, user_id: &UserId, product_id: ProductId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state
            .entries
            .retain(|e| !(&e.user_id == user_id && e.product_id == product_id));
        Ok(state.entries.len() < before)
    }

    async fn entries(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>> {
        Ok(self
            .state
            .read()
            .await
            .entries
            .iter()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect())
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{CatalogStore, Product, ProductDraft, ProductFilter, ProductId, Result};

#[derive(Default)]
struct CatalogState {
    products: BTreeMap<ProductId, Product>,
    next_id: i64,
}

/// In-memory product catalog.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog pre-populated with `drafts`, assigning ids 1..=n.
    pub async fn seeded(drafts: impl IntoIterator<Item = ProductDraft>) -> Result<Self> {
        let catalog = Self::new();
        for draft in drafts {
            catalog.create(draft).await?;
        }
        Ok(catalog)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Product>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).map(|p| (*id, p.clone())))
            .collect())
    }

    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        Ok(self
            .state
            .read()
            .await
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let product = Product::from_draft(ProductId::new(state.next_id), draft, Utc::now());
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>> {
        let mut state = self.state.write().await;
        Ok(state.products.get_mut(&id).map(|product| {
            *product = Product::from_draft(id, draft, product.created_at);
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        Ok(self.state.write().await.products.remove(&id).is_some())
    }
}

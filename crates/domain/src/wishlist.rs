//! Wishlist rules.

use std::sync::Arc;

use common::{ProductId, UserId};
use serde::Serialize;
use store::{CatalogStore, Product, WishlistEntry, WishlistStore};

use crate::error::DomainError;
use crate::sync::{Committed, Mutation};

/// A wishlist entry joined with the current product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: i64,
    pub product_id: ProductId,
    pub product: Product,
}

#[derive(Clone)]
pub struct WishlistService {
    wishlist: Arc<dyn WishlistStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl WishlistService {
    pub fn new(wishlist: Arc<dyn WishlistStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { wishlist, catalog }
    }

    /// Adds a product; adding it again returns the existing entry.
    #[tracing::instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Committed<WishlistEntry>, DomainError> {
        if self.catalog.get(product_id).await?.is_none() {
            return Err(DomainError::not_found("product", product_id));
        }

        let entry = self.wishlist.add(user_id, product_id).await?;
        metrics::counter!("wishlist_mutations_total", "op" => "add").increment(1);
        Ok(Committed::new(entry, Mutation::AddToWishlist))
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Committed<()>, DomainError> {
        if !self.wishlist.remove(user_id, product_id).await? {
            return Err(DomainError::not_found("wishlist entry", product_id));
        }

        metrics::counter!("wishlist_mutations_total", "op" => "remove").increment(1);
        Ok(Committed::new((), Mutation::RemoveFromWishlist))
    }

    /// Entries in insertion order; entries for deleted products are skipped.
    #[tracing::instrument(skip(self))]
    pub async fn list_with_products(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<WishlistItem>, DomainError> {
        let entries = self.wishlist.entries(user_id).await?;
        let ids: Vec<ProductId> = entries.iter().map(|e| e.product_id).collect();
        let products = self.catalog.get_many(&ids).await?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                products.get(&entry.product_id).map(|product| WishlistItem {
                    id: entry.id,
                    product_id: entry.product_id,
                    product: product.clone(),
                })
            })
            .collect())
    }
}

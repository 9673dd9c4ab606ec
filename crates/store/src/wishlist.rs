//! Wishlist entries keyed by (user, product).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProductId, Result, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Idempotent insert; returns the existing entry when already present.
    async fn add(&self, user_id: &UserId, product_id: ProductId) -> Result<WishlistEntry>;

    /// False when the user had no entry for the product.
    async fn remove(&self, user_id: &UserId, product_id: ProductId) -> Result<bool>;

    /// The user's entries in insertion order.
    async fn entries(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>>;
}

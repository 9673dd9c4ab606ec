//! Cart lines keyed by (user, product).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CartLineId, ProductId, Result, UserId};

/// A stored cart line. Carries no price: the current catalog price applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRecord {
    pub id: CartLineId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

/// Cart persistence.
///
/// Quantities reaching the store are already validated by the caller; the
/// store only guarantees one line per (user, product) and the upsert clamp.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Inserts a line or increments the existing one in a single atomic step,
    /// clamping the resulting quantity to `max`.
    async fn add_or_increment(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        quantity: u32,
        max: u32,
    ) -> Result<CartLineRecord>;

    /// Replaces the quantity of a line owned by `user_id`.
    ///
    /// `None` when the line does not exist or belongs to someone else.
    async fn set_quantity(
        &self,
        user_id: &UserId,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLineRecord>>;

    /// Deletes a line owned by `user_id`; false when absent or not owned.
    async fn remove(&self, user_id: &UserId, line_id: CartLineId) -> Result<bool>;

    /// Deletes every line of the user, returning how many were removed.
    async fn clear(&self, user_id: &UserId) -> Result<u64>;

    /// Takes checked-out lines out of the cart in one atomic step.
    ///
    /// Each snapshot line gives back its quantity: a line still at or below
    /// it is deleted, a line incremented since keeps the difference. Lines
    /// added after the snapshot are left alone. Returns how many lines
    /// were deleted.
    async fn consume(&self, user_id: &UserId, taken: &[CartLineRecord]) -> Result<u64>;

    /// The user's lines in insertion order.
    async fn lines(&self, user_id: &UserId) -> Result<Vec<CartLineRecord>>;
}

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{CartLineId, CartLineRecord, CartStore, ProductId, Result, UserId};

/// Lines in an arena keyed by id, plus a unique (user, product) index.
#[derive(Default)]
struct CartArena {
    lines: BTreeMap<CartLineId, CartLineRecord>,
    by_owner: HashMap<(UserId, ProductId), CartLineId>,
    next_id: i64,
}

impl CartArena {
    fn owned_mut(&mut self, user_id: &UserId, line_id: CartLineId) -> Option<&mut CartLineRecord> {
        self.lines
            .get_mut(&line_id)
            .filter(|line| &line.user_id == user_id)
    }
}

/// In-memory cart store.
///
/// Every operation takes the arena write lock once, so the upsert is atomic.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    arena: Arc<RwLock<CartArena>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn add_or_increment(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        quantity: u32,
        max: u32,
    ) -> Result<CartLineRecord> {
        let mut arena = self.arena.write().await;
        let key = (user_id.clone(), product_id);

        if let Some(line_id) = arena.by_owner.get(&key).copied()
            && let Some(line) = arena.lines.get_mut(&line_id)
        {
            line.quantity = line.quantity.saturating_add(quantity).min(max);
            return Ok(line.clone());
        }

        arena.next_id += 1;
        let line = CartLineRecord {
            id: CartLineId::new(arena.next_id),
            user_id: user_id.clone(),
            product_id,
            quantity: quantity.min(max),
            created_at: Utc::now(),
        };
        arena.by_owner.insert(key, line.id);
        arena.lines.insert(line.id, line.clone());
        Ok(line)
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLineRecord>> {
        let mut arena = self.arena.write().await;
        Ok(arena.owned_mut(user_id, line_id).map(|line| {
            line.quantity = quantity;
            line.clone()
        }))
    }

    async fn remove(&self, user_id: &UserId, line_id: CartLineId) -> Result<bool> {
        let mut arena = self.arena.write().await;
        let Some(product_id) = arena.owned_mut(user_id, line_id).map(|line| line.product_id) else {
            return Ok(false);
        };
        arena.lines.remove(&line_id);
        arena.by_owner.remove(&(user_id.clone(), product_id));
        Ok(true)
    }

    async fn clear(&self, user_id: &UserId) -> Result<u64> {
        let mut arena = self.arena.write().await;
        let before = arena.lines.len();
        arena.lines.retain(|_, line| &line.user_id != user_id);
        arena.by_owner.retain(|(owner, _), _| owner != user_id);
        Ok((before - arena.lines.len()) as u64)
    }

    async fn consume(&self, user_id: &UserId, taken: &[CartLineRecord]) -> Result<u64> {
        let mut arena = self.arena.write().await;
        let mut deleted = 0;
        for snapshot in taken {
            let Some(line) = arena.owned_mut(user_id, snapshot.id) else {
                continue;
            };
            if line.quantity > snapshot.quantity {
                line.quantity -= snapshot.quantity;
                continue;
            }
            let product_id = line.product_id;
            arena.lines.remove(&snapshot.id);
            arena.by_owner.remove(&(user_id.clone(), product_id));
            deleted += 1;
        }
        Ok(deleted)
    }

    async fn lines(&self, user_id: &UserId) -> Result<Vec<CartLineRecord>> {
        let arena = self.arena.read().await;
        Ok(arena
            .lines
            .values()
            .filter(|line| &line.user_id == user_id)
            .cloned()
            .collect())
    }
}

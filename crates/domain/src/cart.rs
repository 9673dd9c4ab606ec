//! Cart rules: quantity bounds, ownership and derived totals.

use std::sync::Arc;

use common::{CartLineId, Money, ProductId, UserId};
use serde::Serialize;
use store::{CartLineRecord, CartStore, CatalogStore, Product};

use crate::error::{DomainError, ValidationError};
use crate::sync::{Committed, Mutation};

/// A cart line quantity, always within `1..=99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 99;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        u32::try_from(value)
            .ok()
            .filter(|q| (Self::MIN..=Self::MAX).contains(q))
            .map(Self)
            .ok_or(ValidationError::QuantityOutOfRange { quantity: value })
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A cart line joined with the current product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub product: Product,
}

impl CartItem {
    /// Current unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}

/// A user's cart with its derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartItem>,
}

impl CartSummary {
    /// Joins stored lines with products, dropping lines whose product is gone.
    pub fn join(
        lines: Vec<CartLineRecord>,
        products: &std::collections::HashMap<ProductId, Product>,
    ) -> Self {
        let items = lines
            .into_iter()
            .filter_map(|line| {
                products.get(&line.product_id).map(|product| CartItem {
                    id: line.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    product: product.clone(),
                })
            })
            .collect();
        Self { items }
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart operations for authenticated users.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { carts, catalog }
    }

    /// Adds a product or increments its existing line, clamped to 99.
    #[tracing::instrument(skip(self))]
    pub async fn add_or_increment(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Committed<CartLineRecord>, DomainError> {
        let quantity = Quantity::new(quantity)?;

        let product = self
            .catalog
            .get(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", product_id))?;
        if !product.is_active {
            return Err(ValidationError::ProductInactive { product_id }.into());
        }

        let line = self
            .carts
            .add_or_increment(user_id, product_id, quantity.get(), Quantity::MAX)
            .await?;

        metrics::counter!("cart_mutations_total", "op" => "add").increment(1);
        tracing::debug!(line_id = %line.id, quantity = line.quantity, "cart line upserted");

        Ok(Committed::new(line, Mutation::AddToCart))
    }

    /// Replaces the quantity of one of the user's lines.
    #[tracing::instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: &UserId,
        line_id: CartLineId,
        quantity: i64,
    ) -> Result<Committed<CartLineRecord>, DomainError> {
        let quantity = Quantity::new(quantity)?;

        let line = self
            .carts
            .set_quantity(user_id, line_id, quantity.get())
            .await?
            .ok_or_else(|| DomainError::not_found("cart line", line_id))?;

        metrics::counter!("cart_mutations_total", "op" => "update").increment(1);
        Ok(Committed::new(line, Mutation::UpdateCartLine))
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(
        &self,
        user_id: &UserId,
        line_id: CartLineId,
    ) -> Result<Committed<()>, DomainError> {
        if !self.carts.remove(user_id, line_id).await? {
            return Err(DomainError::not_found("cart line", line_id));
        }

        metrics::counter!("cart_mutations_total", "op" => "remove").increment(1);
        Ok(Committed::new((), Mutation::RemoveCartLine))
    }

    /// Empties the cart. Clearing an empty cart succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: &UserId) -> Result<Committed<u64>, DomainError> {
        let removed = self.carts.clear(user_id).await?;

        metrics::counter!("cart_mutations_total", "op" => "clear").increment(1);
        Ok(Committed::new(removed, Mutation::ClearCart))
    }

    /// The cart joined with current product snapshots, in insertion order.
    #[tracing::instrument(skip(self))]
    pub async fn list_with_products(&self, user_id: &UserId) -> Result<CartSummary, DomainError> {
        let lines = self.carts.lines(user_id).await?;
        let ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
        let products = self.catalog.get_many(&ids).await?;
        Ok(CartSummary::join(lines, &products))
    }
}

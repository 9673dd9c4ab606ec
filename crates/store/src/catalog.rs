//! Product catalog: the snapshot provider the storefront core reads from.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{Money, ProductId, Result};

/// A catalog product as seen at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub original_price: Option<Money>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    /// `None` means unknown or unlimited. Advisory only.
    pub stock: Option<u32>,
    pub is_active: bool,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Badge shown on product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductBadge {
    Featured,
    Sale,
    New,
}

impl Product {
    /// True when the original price exceeds the current price.
    pub fn is_on_sale(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }

    pub fn badge(&self) -> ProductBadge {
        if self.is_featured {
            ProductBadge::Featured
        } else if self.is_on_sale() {
            ProductBadge::Sale
        } else {
            ProductBadge::New
        }
    }

    /// Whole-percent discount from the original price, if on sale.
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if !self.is_on_sale() || original.is_zero() {
            return None;
        }
        let ratio = (original.amount() - self.price.amount()) / original.amount();
        (ratio * Decimal::ONE_HUNDRED).round().to_u32()
    }

    /// Advisory stock indicator; stock is never enforced.
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|stock| stock > 0)
    }

    pub(crate) fn from_draft(
        id: ProductId,
        draft: ProductDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            original_price: draft.original_price,
            image_url: draft.image_url,
            category_id: draft.category_id,
            stock: draft.stock,
            is_active: draft.is_active,
            is_featured: draft.is_featured,
            tags: draft.tags,
            created_at,
        }
    }
}

/// Writable product fields, used by admin create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl ProductDraft {
    /// Minimal active product with the given name and price.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            original_price: None,
            image_url: None,
            category_id: None,
            stock: None,
            is_active: true,
            is_featured: false,
            tags: Vec::new(),
        }
    }
}

/// Listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub active_only: bool,
    pub featured: Option<bool>,
    pub category_id: Option<i64>,
}

impl ProductFilter {
    /// Active products of any category.
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    pub(crate) fn matches(&self, product: &Product) -> bool {
        (!self.active_only || product.is_active)
            && self.featured.is_none_or(|featured| product.is_featured == featured)
            && self
                .category_id
                .is_none_or(|category| product.category_id == Some(category))
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, id: ProductId) -> Result<Option<Product>>;

    /// Looks up several products at once; ids with no product are absent from the map.
    async fn get_many(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Product>>;

    /// Products matching `filter`, ordered by id.
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>>;

    async fn create(&self, draft: ProductDraft) -> Result<Product>;

    /// Replaces all writable fields; `None` when the product does not exist.
    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>>;

    /// Returns false when the product did not exist.
    async fn delete(&self, id: ProductId) -> Result<bool>;
}

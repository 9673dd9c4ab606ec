//! Admin product management over the catalog snapshot provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{Identity, Money, ProductId};
use serde::Serialize;
use store::{CatalogStore, Product, ProductDraft, ProductFilter};

use crate::error::{DomainError, ValidationError};
use crate::sync::{Committed, Mutation};

/// Checks the fields an admin may write.
pub fn validate_draft(draft: &ProductDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::InvalidProduct("name is required".to_string()));
    }
    if !draft.price.is_valid_price() {
        return Err(ValidationError::InvalidProduct(format!(
            "price must be between 0 and {} with at most two decimals",
            Money::max_price()
        )));
    }
    if draft.original_price.is_some_and(|p| !p.is_valid_price()) {
        return Err(ValidationError::InvalidProduct(format!(
            "original price must be between 0 and {} with at most two decimals",
            Money::max_price()
        )));
    }
    Ok(())
}

/// A category id and how many active products carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: i64,
    pub product_count: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, DomainError> {
        Ok(self.catalog.list(filter).await?)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, DomainError> {
        self.catalog
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))
    }

    pub async fn active_count(&self) -> Result<usize, DomainError> {
        Ok(self.catalog.list(ProductFilter::active()).await?.len())
    }

    /// Categories in use by active products, ordered by id.
    pub async fn categories(&self) -> Result<Vec<CategorySummary>, DomainError> {
        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for product in self.catalog.list(ProductFilter::active()).await? {
            if let Some(category) = product.category_id {
                *counts.entry(category).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(id, product_count)| CategorySummary { id, product_count })
            .collect())
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(
        &self,
        identity: &Identity,
        mut draft: ProductDraft,
    ) -> Result<Committed<Product>, DomainError> {
        identity.require_admin()?;
        validate_draft(&draft)?;
        draft.name = draft.name.trim().to_string();

        let product = self.catalog.create(draft).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(Committed::new(product, Mutation::CreateProduct))
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update(
        &self,
        identity: &Identity,
        id: ProductId,
        mut draft: ProductDraft,
    ) -> Result<Committed<Product>, DomainError> {
        identity.require_admin()?;
        validate_draft(&draft)?;
        draft.name = draft.name.trim().to_string();

        let product = self
            .catalog
            .update(id, draft)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        Ok(Committed::new(product, Mutation::UpdateProduct))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        identity: &Identity,
        id: ProductId,
    ) -> Result<Committed<()>, DomainError> {
        identity.require_admin()?;
        if !self.catalog.delete(id).await? {
            return Err(DomainError::not_found("product", id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(Committed::new((), Mutation::DeleteProduct))
    }
}

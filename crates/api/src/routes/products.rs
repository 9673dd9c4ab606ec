//! Catalog endpoints. Reads are public; writes are admin only.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use common::ProductId;
use domain::CategorySummary;
use serde::{Deserialize, Serialize};
use store::{EventStore, Product, ProductBadge, ProductDraft, ProductFilter};

use super::{committed, committed_empty};
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::identity::Caller;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub featured: Option<bool>,
    /// Category id.
    pub category: Option<i64>,
}

/// A product with its storefront presentation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub badge: ProductBadge,
    pub discount_percent: Option<u32>,
    pub in_stock: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            badge: product.badge(),
            discount_percent: product.discount_percent(),
            in_stock: product.in_stock(),
            product,
        }
    }
}

/// GET /api/products: active products, optionally narrowed to featured
/// products or one category.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    QueryParams(query): QueryParams<ProductQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let filter = ProductFilter {
        featured: query.featured,
        category_id: query.category,
        ..ProductFilter::active()
    };
    let products = state.catalog.list(filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /api/categories: categories of active products with their counts.
#[tracing::instrument(skip(state))]
pub async fn categories<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CategorySummary>>, ApiError> {
    Ok(Json(state.catalog.categories().await?))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get(ProductId::new(id)).await?;
    Ok(Json(product.into()))
}

/// POST /api/products
#[tracing::instrument(skip(state, draft))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    JsonBody(draft): JsonBody<ProductDraft>,
) -> Result<Response, ApiError> {
    let product = state.catalog.create(&identity, draft).await?;
    Ok(committed(StatusCode::CREATED, product.map(ProductResponse::from)))
}

/// PUT /api/products/{id}
#[tracing::instrument(skip(state, draft))]
pub async fn update<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    PathParam(id): PathParam<i64>,
    JsonBody(draft): JsonBody<ProductDraft>,
) -> Result<Response, ApiError> {
    let product = state
        .catalog
        .update(&identity, ProductId::new(id), draft)
        .await?;
    Ok(committed(StatusCode::OK, product.map(ProductResponse::from)))
}

/// DELETE /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    PathParam(id): PathParam<i64>,
) -> Result<Response, ApiError> {
    let deleted = state.catalog.delete(&identity, ProductId::new(id)).await?;
    Ok(committed_empty(deleted))
}

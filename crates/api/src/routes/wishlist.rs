//! Wishlist endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use common::ProductId;
use domain::WishlistItem;
use serde::Deserialize;
use store::EventStore;

use super::{committed, committed_empty};
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::identity::Caller;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

/// GET /api/wishlist
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
) -> Result<Json<Vec<WishlistItem>>, ApiError> {
    let items = state.wishlist.list_with_products(&identity.user_id).await?;
    Ok(Json(items))
}

/// POST /api/wishlist
#[tracing::instrument(skip(state, req))]
pub async fn add<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    JsonBody(req): JsonBody<AddToWishlistRequest>,
) -> Result<Response, ApiError> {
    let entry = state.wishlist.add(&identity.user_id, req.product_id).await?;
    Ok(committed(StatusCode::CREATED, entry))
}

/// DELETE /api/wishlist/{product_id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    PathParam(product_id): PathParam<i64>,
) -> Result<Response, ApiError> {
    let removed = state
        .wishlist
        .remove(&identity.user_id, ProductId::new(product_id))
        .await?;
    Ok(committed_empty(removed))
}

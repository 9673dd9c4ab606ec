//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use common::{CartLineId, Money, ProductId};
use domain::{CartItem, CartSummary};
use serde::{Deserialize, Serialize};
use store::EventStore;

use super::{committed, committed_empty};
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::identity::Caller;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub subtotal: Money,
    pub item_count: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Money,
}

impl From<CartSummary> for CartResponse {
    fn from(cart: CartSummary) -> Self {
        let subtotal = cart.subtotal();
        let item_count = cart.item_count();
        Self {
            items: cart
                .items
                .into_iter()
                .map(|item| CartItemResponse {
                    line_total: item.line_total(),
                    item,
                })
                .collect(),
            subtotal,
            item_count,
        }
    }
}

/// GET /api/cart: the caller's cart joined with current products.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.list_with_products(&identity.user_id).await?;
    Ok(Json(cart.into()))
}

/// POST /api/cart: add a product or increment its line.
#[tracing::instrument(skip(state, req))]
pub async fn add<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    JsonBody(req): JsonBody<AddToCartRequest>,
) -> Result<Response, ApiError> {
    let line = state
        .carts
        .add_or_increment(&identity.user_id, req.product_id, req.quantity)
        .await?;
    Ok(committed(StatusCode::CREATED, line))
}

/// PUT /api/cart/{id}: replace a line's quantity.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateQuantityRequest>,
) -> Result<Response, ApiError> {
    let line = state
        .carts
        .set_quantity(&identity.user_id, CartLineId::new(id), req.quantity)
        .await?;
    Ok(committed(StatusCode::OK, line))
}

/// DELETE /api/cart/{id}: remove one of the caller's lines.
#[tracing::instrument(skip(state))]
pub async fn remove<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    PathParam(id): PathParam<i64>,
) -> Result<Response, ApiError> {
    let removed = state
        .carts
        .remove(&identity.user_id, CartLineId::new(id))
        .await?;
    Ok(committed_empty(removed))
}

/// DELETE /api/cart: empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
) -> Result<Response, ApiError> {
    let cleared = state.carts.clear(&identity.user_id).await?;
    Ok(committed_empty(cleared))
}

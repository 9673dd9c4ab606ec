//! Checkout, order tracking and admin status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Utc};
use common::{AggregateId, Money, UserId};
use domain::{
    Aggregate, CheckoutRequest, DomainError, Order, OrderLine, OrderStatus, PaymentMethod,
    ShippingDetails, TrackingStep,
};
use projections::OrderSummary;
use serde::{Deserialize, Serialize};
use store::EventStore;

use super::committed;
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::identity::Caller;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
}

/// Full order detail.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub item_count: u32,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total_amount: Money,
    pub shipping: Option<ShippingDetails>,
    pub payment_method: PaymentMethod,
    pub created_at: Option<DateTime<Utc>>,
    pub tracking_steps: [TrackingStep; 4],
    pub history: Vec<StatusChangeResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id().map(|id| id.to_string()).unwrap_or_default(),
            user_id: order.user_id().map(|u| u.to_string()).unwrap_or_default(),
            status: order.status(),
            lines: order.lines().to_vec(),
            item_count: order.item_count(),
            subtotal: order.subtotal(),
            shipping_fee: order.shipping_fee(),
            total_amount: order.total_amount(),
            shipping: order.shipping().cloned(),
            payment_method: order.payment_method(),
            created_at: order.created_at(),
            tracking_steps: order.progress_steps(),
            history: order
                .history()
                .iter()
                .map(|change| StatusChangeResponse {
                    from: change.from,
                    to: change.to,
                    changed_by: change.changed_by.clone(),
                    changed_at: change.changed_at,
                })
                .collect(),
        }
    }
}

/// Order list entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListItem {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub tracking_steps: [TrackingStep; 4],
}

impl From<OrderSummary> for OrderListItem {
    fn from(summary: OrderSummary) -> Self {
        Self {
            tracking_steps: summary.progress_steps(),
            summary,
        }
    }
}

/// POST /api/orders: check out the caller's cart.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    JsonBody(req): JsonBody<CheckoutRequest>,
) -> Result<Response, ApiError> {
    let order = state.orders.create_order(&identity.user_id, req).await?;
    Ok(committed(StatusCode::CREATED, order.map(OrderResponse::from)))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<String>,
}

/// GET /api/orders: own orders for customers, every order for admins, newest
/// first. `?status=` narrows the list to one status.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    QueryParams(query): QueryParams<OrderQuery>,
) -> Result<Json<Vec<OrderListItem>>, ApiError> {
    // Run catch-up to ensure the read model includes latest events
    state.refresh_views().await?;

    let orders = match query.status {
        Some(status) => {
            let status: OrderStatus = status.parse().map_err(DomainError::from)?;
            state
                .order_summaries
                .by_status(status)
                .await
                .into_iter()
                .filter(|summary| identity.can_read(&summary.user_id))
                .collect()
        }
        None => state.order_summaries.list_for(&identity).await,
    };
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    PathParam(id): PathParam<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.get_order(&identity, order_id).await?;
    Ok(Json(order.into()))
}

/// PUT /api/orders/{id}/status: admin status change.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
    PathParam(id): PathParam<String>,
    JsonBody(req): JsonBody<UpdateStatusRequest>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .update_status(&identity, order_id, &req.status)
        .await?;
    Ok(committed(StatusCode::OK, order.map(OrderResponse::from)))
}

fn parse_order_id(id: &str) -> Result<AggregateId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))
}
